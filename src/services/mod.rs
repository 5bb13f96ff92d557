//! Services - process coordination
//!
//! - `lifecycle` - Startup/shutdown ordering and phase tracking
//! - `shutdown` - One-shot shutdown latch

pub mod lifecycle;
pub mod shutdown;

// Re-export commonly used types
pub use lifecycle::{Lifecycle, Phase};
pub use shutdown::{ShutdownLatch, ShutdownReason};
