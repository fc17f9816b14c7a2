//! End-of-run notification.

use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> anyhow::Result<()>;
}

/// Used when no push method is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _message: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Emits the message as a structured log event tagged with the channel name.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    channel: String,
}

impl LogNotifier {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> anyhow::Result<()> {
        tracing::info!(channel = %self.channel, message, "notification");
        Ok(())
    }
}

/// Pick a notifier for the configured push method. Blank means none.
pub fn notifier_for(push_method: Option<&str>) -> Box<dyn Notifier> {
    match push_method.map(str::trim).filter(|m| !m.is_empty()) {
        Some(channel) => Box::new(LogNotifier::new(channel)),
        None => Box::new(NoopNotifier),
    }
}
