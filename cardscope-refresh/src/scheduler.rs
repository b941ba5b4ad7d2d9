use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::orchestrator::RefreshOrchestrator;

/// Shortest tick period; a zero interval is raised to this
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Drives the orchestrator on a fixed interval, one run at a time
pub struct RefreshScheduler {
    orchestrator: Arc<RefreshOrchestrator>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

/// Clears the in-flight flag when a run ends, including by panic
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RefreshScheduler {
    pub fn new(
        orchestrator: Arc<RefreshOrchestrator>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                interval_ms = interval.as_millis() as u64,
                "Refresh interval too short, using {}s",
                MIN_INTERVAL.as_secs()
            );
        }
        Self {
            orchestrator,
            interval: interval.max(MIN_INTERVAL),
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Tick until shutdown. The first tick fires immediately.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Refresh scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Refresh scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.trigger();
                }
            }
        }
    }

    /// Start a run in the background. Returns `None` if one is still in flight.
    pub fn trigger(&self) -> Option<JoinHandle<()>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous refresh run still in flight, skipping tick");
            return None;
        }

        let guard = RunGuard(self.running.clone());
        let orchestrator = self.orchestrator.clone();

        Some(tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = orchestrator.run_once().await {
                error!(error = %e, "Refresh run failed");
            }
        }))
    }
}
