//! HTTP transport for the two reading-service endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use wreq::{Client, header};
use wreq_util::Emulation;

use crate::credential::Credential;
use crate::error::TransportError;

pub const READ_URL: &str = "https://weread.qq.com/web/book/read";
pub const RENEWAL_URL: &str = "https://weread.qq.com/web/login/renewal";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What the core needs back from a POST.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub url: String,
    pub status: u16,
    /// Every `Set-Cookie` header value, in order.
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl TransportResponse {
    /// Turn a non-2xx status into [`TransportError::Status`].
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(TransportError::Status {
                url: self.url,
                status: self.status,
                body: self.body,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::Decode {
            url: self.url.clone(),
            message: e.to_string(),
        })
    }
}

/// POSTs a JSON body with the credential's headers and cookies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a browser-emulating wreq client.
///
/// Cookies are not stored by the client; the [`Credential`] passed to each
/// call is the only cookie jar.
pub struct WreqTransport {
    http_client: Client,
}

impl WreqTransport {
    pub fn new() -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .emulation(Emulation::Chrome143)
            .gzip(true)
            .brotli(true)
            .zstd(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for WreqTransport {
    async fn post(
        &self,
        url: &str,
        credential: &Credential,
        body: &serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        let request_error = |e: wreq::Error| TransportError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self.http_client.post(url);
        for (name, value) in &credential.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .header(header::COOKIE, credential.cookie_header())
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response.text().await.map_err(request_error)?;

        tracing::debug!(url, status, "response received");

        Ok(TransportResponse {
            url: url.to_string(),
            status,
            set_cookies,
            body,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    pub(crate) type Scripted = Result<TransportResponse, TransportError>;

    /// A request the scripted transport saw.
    #[derive(Debug, Clone)]
    pub(crate) struct Call {
        pub url: String,
        pub credential: Credential,
        pub body: serde_json::Value,
    }

    /// Replays queued responses per endpoint. An empty queue answers with a
    /// successful read (`{"succ": true}`) or a 500 for renewal.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        reads: Mutex<VecDeque<Scripted>>,
        renewals: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedTransport {
        pub(crate) fn push_read(&self, response: Scripted) -> &Self {
            self.reads.lock().unwrap().push_back(response);
            self
        }

        pub(crate) fn push_renewal(&self, response: Scripted) -> &Self {
            self.renewals.lock().unwrap().push_back(response);
            self
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn calls_to(&self, url: &str) -> Vec<Call> {
            self.calls().into_iter().filter(|c| c.url == url).collect()
        }
    }

    pub(crate) fn ok_json(url: &str, body: serde_json::Value) -> Scripted {
        Ok(TransportResponse {
            url: url.to_string(),
            status: 200,
            set_cookies: Vec::new(),
            body: body.to_string(),
        })
    }

    pub(crate) fn with_cookies(url: &str, set_cookies: &[&str]) -> Scripted {
        Ok(TransportResponse {
            url: url.to_string(),
            status: 200,
            set_cookies: set_cookies.iter().map(|s| s.to_string()).collect(),
            body: "{}".to_string(),
        })
    }

    pub(crate) fn network_error(url: &str, message: &str) -> Scripted {
        Err(TransportError::Request {
            url: url.to_string(),
            message: message.to_string(),
        })
    }

    pub(crate) fn status(url: &str, status: u16) -> Scripted {
        Ok(TransportResponse {
            url: url.to_string(),
            status,
            set_cookies: Vec::new(),
            body: String::new(),
        })
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn post(
            &self,
            url: &str,
            credential: &Credential,
            body: &serde_json::Value,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(Call {
                url: url.to_string(),
                credential: credential.clone(),
                body: body.clone(),
            });

            let queue = if url == RENEWAL_URL {
                &self.renewals
            } else {
                &self.reads
            };
            let next = queue.lock().unwrap().pop_front();
            match next {
                Some(response) => response,
                None if url == RENEWAL_URL => status(url, 500),
                None => ok_json(url, serde_json::json!({"succ": true})),
            }
        }
    }
}
