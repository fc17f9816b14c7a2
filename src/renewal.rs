//! Session key renewal.
//!
//! When a read request fails outright the session key is assumed stale. The
//! renewal endpoint answers with a fresh `wr_skey` in `Set-Cookie`; only its
//! first 8 characters are kept, which is what the service expects back.

use crate::credential::{Credential, SESSION_COOKIE};
use crate::error::{CredentialRenewalError, RenewalError};
use crate::pacing::Sleeper;
use crate::retry::RetryPolicy;
use crate::transport::{RENEWAL_URL, Transport};
use crate::types::RenewalRequest;

/// Number of leading characters of the cookie value used as the key.
pub const SESSION_KEY_LEN: usize = 8;

/// Pull the session key out of a response's `Set-Cookie` values.
///
/// The values are joined and split on `;`; the first segment mentioning
/// `wr_skey` wins and its text after the last `=` is cut to 8 characters.
pub fn extract_session_key<S: AsRef<str>>(set_cookies: &[S]) -> Option<String> {
    let joined = set_cookies
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(", ");

    let segment = joined.split(';').find(|s| s.contains(SESSION_COOKIE))?;
    let value = segment.rsplit('=').next()?;
    let key: String = value.chars().take(SESSION_KEY_LEN).collect();

    if key.is_empty() { None } else { Some(key) }
}

#[derive(Debug, Clone, Default)]
pub struct SessionRenewer {
    policy: RetryPolicy,
}

impl SessionRenewer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Exchange `credential` for a fresh session key, retrying per policy.
    pub async fn renew(
        &self,
        transport: &dyn Transport,
        sleeper: &dyn Sleeper,
        credential: &Credential,
    ) -> Result<String, CredentialRenewalError> {
        self.policy
            .run(sleeper, move |attempt| {
                tracing::debug!(attempt, "requesting session renewal");
                Self::try_renew(transport, credential)
            })
            .await
            .map_err(|(attempts, source)| CredentialRenewalError { attempts, source })
    }

    async fn try_renew(
        transport: &dyn Transport,
        credential: &Credential,
    ) -> Result<String, RenewalError> {
        let body = serde_json::to_value(RenewalRequest::default()).unwrap_or_default();
        let response = transport
            .post(RENEWAL_URL, credential, &body)
            .await?
            .error_for_status()?;

        extract_session_key(response.set_cookies.as_slice()).ok_or(
            RenewalError::MissingSessionCookie {
                marker: SESSION_COOKIE,
            },
        )
    }
}
