//! Error types for the read session.

use thiserror::Error;

/// A failed call on either endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Why a single renewal attempt did not produce a key.
#[derive(Debug, Error)]
pub enum RenewalError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("renewal response carried no {marker} cookie")]
    MissingSessionCookie { marker: &'static str },
}

/// Session renewal gave up. Fatal to the run.
#[derive(Debug, Error)]
#[error("credential renewal failed after {attempts} attempt(s): {source}")]
pub struct CredentialRenewalError {
    pub attempts: u32,
    #[source]
    pub source: RenewalError,
}
