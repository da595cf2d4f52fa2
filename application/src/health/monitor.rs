//! Periodic health monitor.
//!
//! Probes every target concurrently on a fixed interval, folds the results
//! into the shared [`HealthTable`] and notifies observers about status
//! transitions. Runs until its cancellation token fires; an in-flight probe
//! sweep always completes before the loop exits.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use conclave_domain::{HealthStatus, HealthThresholds};

use crate::health::table::HealthTable;
use crate::ports::health_probe::{HealthProbe, ProbeError};

/// One endpoint the monitor watches.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub name: String,
    pub url: String,
}

impl ProbeTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Monitor tunables.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    /// Pause between probe sweeps.
    pub interval: Duration,
    /// Budget for a single probe.
    pub probe_timeout: Duration,
    pub thresholds: HealthThresholds,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(5),
            thresholds: HealthThresholds::default(),
        }
    }
}

/// Callback invoked synchronously on every health status transition.
///
/// A failing observer never disturbs the monitor: errors are logged and
/// swallowed.
pub trait HealthObserver: Send + Sync {
    fn on_transition(
        &self,
        name: &str,
        from: HealthStatus,
        to: HealthStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct HealthMonitor {
    probe: Arc<dyn HealthProbe>,
    table: Arc<HealthTable>,
    targets: Vec<ProbeTarget>,
    settings: MonitorSettings,
    observers: Vec<Arc<dyn HealthObserver>>,
}

impl HealthMonitor {
    pub fn new(
        probe: Arc<dyn HealthProbe>,
        table: Arc<HealthTable>,
        targets: Vec<ProbeTarget>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            probe,
            table,
            targets,
            settings,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn HealthObserver>) {
        self.observers.push(observer);
    }

    /// Probe loop. Sleeps first, so callers seed initial statuses with an
    /// explicit [`probe_all`](Self::probe_all) if they want them up front.
    pub async fn run(self, token: CancellationToken) {
        info!(
            "health monitor started: {} targets, every {:?}",
            self.targets.len(),
            self.settings.interval
        );
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("health monitor stopping");
                    break;
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
            self.probe_all().await;
        }
    }

    /// Probe every target concurrently and fold the results into the table.
    pub async fn probe_all(&self) {
        let mut join_set = JoinSet::new();
        for target in &self.targets {
            let probe = Arc::clone(&self.probe);
            let target = target.clone();
            let timeout = self.settings.probe_timeout;
            join_set.spawn(async move {
                let result = probe.probe(&target.url, timeout).await;
                (target.name, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, result)) => self.apply_result(&name, result).await,
                Err(e) => warn!("probe task failed to join: {}", e),
            }
        }
    }

    async fn apply_result(&self, name: &str, result: Result<Duration, ProbeError>) {
        let now = Utc::now();
        let thresholds = self.settings.thresholds;
        let transition = match result {
            Ok(latency) => {
                debug!("probe ok for {} in {:?}", name, latency);
                self.table
                    .apply(name, move |record| {
                        record.record_success(latency, &thresholds, now)
                    })
                    .await
            }
            Err(e) => {
                warn!("probe failed for {}: {}", name, e);
                let message = e.to_string();
                self.table
                    .apply(name, move |record| {
                        record.record_failure(message, &thresholds, now)
                    })
                    .await
            }
        };

        if let Some((previous, current)) = transition
            && previous != current
        {
            info!("responder {} health: {} -> {}", name, previous, current);
            for observer in &self.observers {
                if let Err(e) = observer.on_transition(name, previous, current) {
                    warn!("health observer failed: {}", e);
                }
            }
        }
    }
}

// ==================== Tests ====================
