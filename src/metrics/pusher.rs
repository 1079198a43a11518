//! Periodic push of the metric registry to a Prometheus push-gateway.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use prometheus::Registry;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::metrics::MAX_PUSH_INTERVAL_SECS;
use crate::utils::log_throttle::LogThrottle;

const PUSH_FAILED_LOG_KEY: &str = "metrics.push.failed";
const PUSH_FAILED_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Where and as what the metrics are pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub url: String,
    pub job: String,
    pub grouping: HashMap<String, String>,
}

impl PushTarget {
    /// A target grouped by the local hostname under the `instance` label.
    pub fn new(url: impl Into<String>, job: impl Into<String>) -> Self {
        PushTarget {
            url: url.into(),
            job: job.into(),
            grouping: prometheus::hostname_grouping_key(),
        }
    }
}

/// Handle on a running push loop.
#[derive(Debug)]
pub struct PushScheduler {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl PushScheduler {
    /// Spawns the push loop on the current tokio runtime.
    ///
    /// The first push happens one `interval` after the call. Intervals
    /// longer than [`MAX_PUSH_INTERVAL_SECS`] are clamped.
    pub fn spawn(target: PushTarget, registry: Registry, interval: Duration) -> Self {
        let max = Duration::from_secs(MAX_PUSH_INTERVAL_SECS.unsigned_abs());
        let interval = interval.min(max);
        let (stop, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run(Arc::new(target), registry, interval, stop_rx));
        PushScheduler { stop, handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signals the loop to stop and waits until it has exited.
    pub async fn stop(self) -> Result<()> {
        // The loop may already be gone, in which case nobody is listening.
        let _ = self.stop.send(());
        self.handle.await?;
        Ok(())
    }
}

async fn run(
    target: Arc<PushTarget>,
    registry: Registry,
    interval: Duration,
    mut stop: oneshot::Receiver<()>,
) {
    info!(
        "Pushing metrics to {} as job '{}' every {:?}",
        target.url, target.job, interval
    );

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut throttle = LogThrottle::new(PUSH_FAILED_LOG_INTERVAL);
    let mut failing = false;

    loop {
        tokio::select! {
            // Fires on an explicit stop and when the sender is dropped.
            _ = &mut stop => break,
            _ = ticker.tick() => {
                match push_once(&target, &registry).await {
                    Ok(()) => {
                        debug!("Pushed metrics to {}", target.url);
                        if failing {
                            info!("Metrics push to {} recovered", target.url);
                            throttle.reset(PUSH_FAILED_LOG_KEY);
                            failing = false;
                        }
                    }
                    Err(e) => {
                        failing = true;
                        if let Some(suppressed) = throttle.should_emit(PUSH_FAILED_LOG_KEY) {
                            warn!(
                                suppressed,
                                "Failed to push metrics to {}: {}", target.url, e
                            );
                        }
                    }
                }
            }
        }
    }

    debug!("Metrics push loop for job '{}' stopped", target.job);
}

/// Gathers the registry and pushes it with add semantics (HTTP POST).
pub async fn push_once(target: &Arc<PushTarget>, registry: &Registry) -> Result<()> {
    let families = registry.gather();
    let target = Arc::clone(target);

    // The push client is blocking.
    tokio::task::spawn_blocking(move || {
        prometheus::push_add_metrics(
            &target.job,
            target.grouping.clone(),
            &target.url,
            families,
            None,
        )
    })
    .await??;

    Ok(())
}
