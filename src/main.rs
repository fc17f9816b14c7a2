use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wxread_rs::{Config, ReadSession, TokioSleeper, WreqTransport, notifier_for};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wxread_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let store = config.credential_store()?;

    let transport = WreqTransport::new().context("Failed to build HTTP client")?;
    let notifier = notifier_for(config.push_method.as_deref());

    tracing::info!(read_num = config.read_num, "starting read session");

    let mut session = ReadSession::new(
        store,
        config.key.clone(),
        config.read_num,
        &transport,
        &TokioSleeper,
        &*notifier,
    );
    let report = session.run().await?;

    tracing::info!(
        succeeded = report.succeeded,
        soft_failures = report.soft_failures,
        renewals = report.renewals,
        "read session finished"
    );
    Ok(())
}
