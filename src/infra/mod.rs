//! Infrastructure - configuration and metrics
//!
//! - `config` - Runtime configuration (CLI values plus defaults)
//! - `metrics` - Lock-free session traffic counters

pub mod config;
pub mod metrics;

// Re-export commonly used types
pub use config::{BrokerAddress, Config};
pub use metrics::SessionMetrics;
