//! IO modules - external system interfaces
//!
//! - `session` - MQTT subscription session for broker status topics
//! - `terminal` - Raw-mode alternate-screen terminal

pub mod session;
pub mod terminal;

// Re-export commonly used types
pub use session::{Session, SessionHandle};
