pub mod log;
pub mod metrics;

pub use self::log::SyncLog;
pub use metrics::{MetricsSnapshot, SyncMetrics};
