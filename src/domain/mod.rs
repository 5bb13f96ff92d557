//! Domain models - broker status topics and the values shown for them
//!
//! - `topics` - monitored `$SYS` topic list
//! - `decoder` - topic-to-field decode table
//! - `display` - latest decoded value per metric

pub mod decoder;
pub mod display;
pub mod topics;

// Re-export commonly used types at module level
pub use decoder::{DecodeOutcome, Decoder};
pub use display::{DisplayState, SharedState};
