//! The read loop.
//!
//! A run makes `read_num` signed read requests. After each accepted read it
//! pauses for a randomised reading interval. A request that fails outright
//! (network error, non-2xx, unreadable body) is taken as an expired session:
//! the key is renewed and the loop carries on with the next iteration. A read
//! the server answers with `succ != true` is only logged. When renewal itself
//! gives up, the run stops there.

use crate::credential::{Credential, CredentialStore};
use crate::error::{CredentialRenewalError, TransportError};
use crate::notify::Notifier;
use crate::pacing::{PacingWindow, Sleeper};
use crate::renewal::SessionRenewer;
use crate::transport::{READ_URL, Transport};
use crate::types::{AttemptOutcome, BaseParams, ReadResponse, RequestParams, RunReport, epoch_millis};

/// Reading time credited per iteration, in minutes.
const MINUTES_PER_READ: f64 = 0.5;

pub fn completion_message(read_num: u32) -> String {
    format!(
        "Reading complete! Total time: {:.1} minutes",
        read_num as f64 * MINUTES_PER_READ
    )
}

pub fn failure_message(err: &CredentialRenewalError) -> String {
    format!("Read task failed: {}", err)
}

pub struct ReadSession<'a> {
    transport: &'a dyn Transport,
    sleeper: &'a dyn Sleeper,
    notifier: &'a dyn Notifier,
    store: CredentialStore,
    renewer: SessionRenewer,
    pacing: PacingWindow,
    base: BaseParams,
    read_num: u32,
}

impl<'a> ReadSession<'a> {
    /// Fixes `ct`, `rn` and `key` for the whole run.
    pub fn new(
        store: CredentialStore,
        key: impl Into<String>,
        read_num: u32,
        transport: &'a dyn Transport,
        sleeper: &'a dyn Sleeper,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            transport,
            sleeper,
            notifier,
            store,
            renewer: SessionRenewer::default(),
            pacing: PacingWindow::default(),
            base: BaseParams::new(key),
            read_num,
        }
    }

    pub fn with_renewer(mut self, renewer: SessionRenewer) -> Self {
        self.renewer = renewer;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingWindow) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn credential(&self) -> &Credential {
        self.store.get()
    }

    pub fn base_params(&self) -> &BaseParams {
        &self.base
    }

    /// Run every iteration, then send the completion notification.
    ///
    /// Returns early, after sending a failure notification, only when session
    /// renewal is exhausted.
    pub async fn run(&mut self) -> Result<RunReport, CredentialRenewalError> {
        let mut report = RunReport::default();

        for index in 1..=self.read_num {
            report.attempted += 1;

            match self.attempt().await {
                Ok(outcome) if outcome.succ => {
                    report.succeeded += 1;
                    tracing::info!("read succeeded ({}/{})", index, self.read_num);

                    if index < self.read_num {
                        let pause = self.pacing.pick();
                        tracing::debug!(?pause, "pausing before next read");
                        self.sleeper.sleep(pause).await;
                        report.pauses += 1;
                    }
                }
                Ok(outcome) => {
                    report.soft_failures += 1;
                    tracing::warn!(
                        index,
                        response = %outcome.raw,
                        "read was not accepted, moving on"
                    );
                }
                Err(err) => {
                    report.hard_failures += 1;
                    tracing::error!(index, error = %err, "read request failed");

                    match self
                        .renewer
                        .renew(self.transport, self.sleeper, self.store.get())
                        .await
                    {
                        Ok(key) => {
                            tracing::info!(key = %key, "session key refreshed");
                            self.store.replace_session_key(key);
                            report.renewals += 1;
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "cannot recover session, aborting");
                            self.notify(&failure_message(&err)).await;
                            return Err(err);
                        }
                    }
                }
            }
        }

        self.notify(&completion_message(self.read_num)).await;
        Ok(report)
    }

    async fn attempt(&self) -> Result<AttemptOutcome, TransportError> {
        let params = RequestParams::sign(&self.base, epoch_millis());
        tracing::debug!(ts = params.ts, sg = %params.sg, s = %params.s, "signed read request");

        let body = serde_json::to_value(&params).map_err(|e| TransportError::Decode {
            url: READ_URL.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .transport
            .post(READ_URL, self.store.get(), &body)
            .await?
            .error_for_status()?;

        let raw: serde_json::Value = response.json()?;
        let parsed: ReadResponse = response.json()?;

        Ok(AttemptOutcome {
            succ: parsed.succ,
            raw,
        })
    }

    async fn notify(&self, message: &str) {
        if let Err(err) = self.notifier.notify(message).await {
            tracing::warn!(error = %err, "failed to send notification");
        }
    }
}
