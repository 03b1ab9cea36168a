//! Sweep Task
//!
//! Background task that periodically drops expired predictions and state for
//! idle keys, bounding memory when read volume is too low for lazy expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::service::PredictionService;

/// Spawns a background task that sweeps the service every `interval_secs`.
///
/// # Arguments
/// * `service` - Shared prediction service
/// * `interval_secs` - Interval in seconds between sweeps (minimum 1)
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let service = Arc::new(PredictionService::from_config(&config));
/// let sweep_handle = spawn_sweep_task(service.clone(), 5);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(service: Arc<PredictionService>, interval_secs: u64) -> JoinHandle<()> {
    let interval_secs = interval_secs.max(1);
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!("Starting sweep task with interval of {} seconds", interval_secs);

        loop {
            tokio::time::sleep(interval).await;

            let report = service.sweep();

            if report.total() > 0 {
                info!(
                    "Sweep: removed {} expired predictions, {} idle histories, {} idle smoothing states",
                    report.expired_predictions, report.idle_histories, report.idle_smoothing_states
                );
            } else {
                debug!("Sweep: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::key::CacheKey;

    fn service() -> (Arc<PredictionService>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let service = PredictionService::with_clock(&Config::default(), clock.clone());
        (Arc::new(service), clock)
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_predictions() {
        let (service, clock) = service();
        service.predict(&CacheKey::new("expire_soon").unwrap());
        assert_eq!(service.cached_predictions(), 1);

        // Close the coalescing window before the first sweep runs
        clock.advance(Duration::from_secs(3));
        let handle = spawn_sweep_task(service.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(service.cached_predictions(), 0);
        // History is not idle yet
        assert_eq!(service.tracked_keys(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_fresh_predictions() {
        let (service, _clock) = service();
        service.predict(&CacheKey::new("fresh").unwrap());

        let handle = spawn_sweep_task(service.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(service.cached_predictions(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (service, _clock) = service();

        let handle = spawn_sweep_task(service, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
