//! Display state shared between the MQTT session and the dashboard

use parking_lot::Mutex;
use std::sync::Arc;

/// Latest decoded value per monitored metric
///
/// The session's message dispatcher is the only writer; the render step is
/// the only reader. Text fields keep the payload exactly as the broker sent
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub uptime: String,
    pub current_heap_size: String,
    pub max_heap_size: String,
    pub subscription_count: String,
    pub connection_count: u64,
    pub max_connection_count: u64,
    /// Decoded but not bound to any widget yet
    pub avg_messages_received_5min: f64,
    /// Whether the session currently holds a live broker connection
    pub broker_connected: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            uptime: "0".to_string(),
            current_heap_size: "0".to_string(),
            max_heap_size: "0".to_string(),
            subscription_count: "0".to_string(),
            connection_count: 0,
            max_connection_count: 2,
            avg_messages_received_5min: 0.0,
            broker_connected: false,
        }
    }
}

pub type SharedState = Arc<Mutex<DisplayState>>;

/// Create display state with placeholders, ready to share
pub fn shared() -> SharedState {
    Arc::new(Mutex::new(DisplayState::default()))
}
