//! Shared health table read by the gateway and written by the monitor.

use std::collections::HashMap;

use tokio::sync::RwLock;

use conclave_domain::{HealthStatus, ResponderHealth};

/// One health record per registered responder.
///
/// The set of names is fixed at construction; only the records mutate. Each
/// record sits behind its own lock so probes for different responders never
/// contend.
pub struct HealthTable {
    entries: HashMap<String, RwLock<ResponderHealth>>,
}

impl HealthTable {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let entries = names
            .into_iter()
            .map(|name| (name, RwLock::new(ResponderHealth::default())))
            .collect();
        Self { entries }
    }

    /// Current record for one responder, if tracked.
    pub async fn snapshot(&self, name: &str) -> Option<ResponderHealth> {
        match self.entries.get(name) {
            Some(lock) => Some(lock.read().await.clone()),
            None => None,
        }
    }

    /// All records, sorted by responder name for stable output.
    pub async fn all(&self) -> Vec<(String, ResponderHealth)> {
        let mut records = Vec::with_capacity(self.entries.len());
        for (name, lock) in &self.entries {
            records.push((name.clone(), lock.read().await.clone()));
        }
        records.sort_by(|(a, _), (b, _)| a.cmp(b));
        records
    }

    /// Whether a responder may be used for routing.
    ///
    /// Untracked names pass: they carry no evidence of being down, same as
    /// a tracked responder that was never probed.
    pub async fn is_usable(&self, name: &str) -> bool {
        match self.entries.get(name) {
            Some(lock) => lock.read().await.is_usable(),
            None => true,
        }
    }

    /// Mutate one record under its write lock.
    ///
    /// `f` returns the record's previous status (the contract of the domain
    /// `record_*` methods); the pair `(previous, current)` comes back so the
    /// caller can detect transitions. `None` for untracked names.
    pub async fn apply<F>(&self, name: &str, f: F) -> Option<(HealthStatus, HealthStatus)>
    where
        F: FnOnce(&mut ResponderHealth) -> HealthStatus,
    {
        let lock = self.entries.get(name)?;
        let mut record = lock.write().await;
        let previous = f(&mut record);
        Some((previous, record.status))
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use conclave_domain::HealthThresholds;
    use std::time::Duration;

    fn table() -> HealthTable {
        HealthTable::new(["alpha".to_string(), "beta".to_string()])
    }

    #[tokio::test]
    async fn test_starts_unknown_and_usable() {
        let table = table();
        let record = table.snapshot("alpha").await;
        assert_eq!(record.map(|r| r.status), Some(HealthStatus::Unknown));
        assert!(table.is_usable("alpha").await);
    }

    #[tokio::test]
    async fn test_untracked_name_is_usable() {
        let table = table();
        assert!(table.snapshot("gamma").await.is_none());
        assert!(table.is_usable("gamma").await);
    }

    #[tokio::test]
    async fn test_apply_reports_transition() {
        let table = table();
        let thresholds = HealthThresholds {
            failure_threshold: 1,
            ..HealthThresholds::default()
        };
        let transition = table
            .apply("alpha", |record| {
                record.record_failure("down", &thresholds, Utc::now())
            })
            .await;
        assert_eq!(
            transition,
            Some((HealthStatus::Unknown, HealthStatus::Unhealthy))
        );
        assert!(!table.is_usable("alpha").await);
        // The neighbour is untouched.
        assert!(table.is_usable("beta").await);
    }

    #[tokio::test]
    async fn test_all_is_sorted_by_name() {
        let table = HealthTable::new(["z".to_string(), "a".to_string(), "m".to_string()]);
        let names: Vec<String> = table.all().await.into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "m", "z"]);
    }

    #[tokio::test]
    async fn test_apply_untracked_is_none() {
        let table = table();
        let thresholds = HealthThresholds::default();
        let result = table
            .apply("gamma", |record| {
                record.record_success(Duration::from_millis(10), &thresholds, Utc::now())
            })
            .await;
        assert!(result.is_none());
    }
}
