use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::cli::WatchArgs;
use crate::error::CliError;

use super::Services;

/// Ingest every configured bank on a fixed interval until ctrl-c.
///
/// The first run starts immediately. A run that stores nothing is logged and
/// the loop carries on.
pub async fn run(args: &WatchArgs, services: &Services) -> Result<(), CliError> {
    let period = Duration::from_secs(args.interval_secs.max(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = period.as_secs(), "watching bank rates");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(error) = signal {
                    warn!(%error, "ctrl-c listener failed");
                }
                info!("watch stopped");
                return Ok(());
            }
            _ = ticker.tick() => run_once(services).await,
        }
    }
}

async fn run_once(services: &Services) {
    let report = match services.coordinator.run(None).await {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "ingestion run rejected");
            return;
        }
    };

    if report.is_total_failure() {
        error!(
            failures = ?report.failure_messages(),
            "no bank produced a stored rate"
        );
        return;
    }
    for failure in &report.failures {
        warn!(bank = %failure.bank, code = failure.code, reason = %failure.reason, "bank skipped");
    }
    info!(stored = report.stored.len(), "ingestion run finished");
}
