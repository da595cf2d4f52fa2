//! Health monitoring: the shared table and the probe loop that feeds it.

pub mod monitor;
pub mod table;

pub use monitor::{HealthMonitor, HealthObserver, MonitorSettings, ProbeTarget};
pub use table::HealthTable;
