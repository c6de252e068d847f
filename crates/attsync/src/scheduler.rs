//! Continuous sync loop
//!
//! Runs cycles at a fixed interval until a shutdown signal arrives. There is
//! no backoff: a broken database or endpoint is retried at the same cadence.
//! A signal arriving while a cycle is running takes effect at the next sleep
//! point; cycles are never cancelled mid-flight.

use crate::api::Transport;
use crate::engine::SyncEngine;
use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// Run sync cycles forever, stopping on Ctrl+C or SIGTERM.
pub async fn run<T: Transport>(engine: &SyncEngine<T>, interval: Duration) {
    run_until(engine, interval, shutdown_signal()).await;
}

/// The scheduler loop with an injectable shutdown future.
///
/// At least one cycle runs before the shutdown future is consulted.
pub async fn run_until<T, F>(engine: &SyncEngine<T>, interval: Duration, shutdown: F)
where
    T: Transport,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        info!("Starting sync cycle");
        match engine.run_cycle().await {
            Ok(report) => {
                info!(
                    fetched = report.fetched,
                    synced = report.synced,
                    skipped = report.skipped,
                    "Sync cycle finished"
                );
            }
            Err(e) => {
                error!(error = %e, "Sync cycle failed, will retry in next cycle");
            }
        }

        info!("Sleeping for {} seconds", interval.as_secs());
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down gracefully");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Resolves when Ctrl+C or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::config::Config;

    fn unreachable_db_config() -> Config {
        let mut config = Config::default();
        // Nothing listens on port 1, so every cycle fails its connect fast
        config.database.port = 1;
        config
    }

    #[tokio::test]
    async fn test_loop_runs_one_cycle_with_immediate_shutdown() {
        let engine = SyncEngine::new(unreachable_db_config(), MockTransport::new());

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            run_until(&engine, Duration::from_secs(60), std::future::ready(())),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_loop_survives_dead_database_until_shutdown() {
        let engine = SyncEngine::new(unreachable_db_config(), MockTransport::new());

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            run_until(
                &engine,
                Duration::from_millis(10),
                tokio::time::sleep(Duration::from_millis(100)),
            ),
        )
        .await;

        assert!(result.is_ok());
    }
}
