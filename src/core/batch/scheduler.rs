//! Background reconciliation task

use super::accumulator::BatchAccumulator;
use super::reconciler::StatusReconciler;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Run a reconciliation tick every `interval`: retry a closed batch still
/// waiting for submission, then poll submitted jobs. Errors are logged and the
/// loop keeps going.
pub fn spawn_reconciliation_task(
    reconciler: Arc<StatusReconciler>,
    accumulator: Arc<BatchAccumulator>,
    interval: Duration,
) -> JoinHandle<()> {
    info!("Starting reconciliation task every {:?}", interval);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match accumulator.submit_pending().await {
                Err(e) if e.is_transient() => {
                    warn!("Pending batch submission failed, retrying next tick: {}", e)
                }
                Err(e) => error!("Pending batch submission failed: {}", e),
                Ok(_) => {}
            }

            if let Err(e) = reconciler.run_once().await {
                error!("Reconciliation tick failed: {}", e);
            }
        }
    })
}
