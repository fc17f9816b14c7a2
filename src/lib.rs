pub mod config;
pub mod credential;
pub mod error;
pub mod notify;
pub mod pacing;
pub mod renewal;
pub mod retry;
pub mod session;
pub mod sign;
pub mod transport;
pub mod types;

pub use config::Config;
pub use credential::{Credential, CredentialStore};
pub use error::{CredentialRenewalError, RenewalError, TransportError};
pub use notify::{Notifier, notifier_for};
pub use pacing::{PacingWindow, Sleeper, TokioSleeper};
pub use renewal::SessionRenewer;
pub use retry::RetryPolicy;
pub use session::ReadSession;
pub use transport::{Transport, WreqTransport};
pub use types::{AttemptOutcome, BaseParams, RequestParams, RunReport};
