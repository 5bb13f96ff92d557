//! Payload decoder for broker status topics
//!
//! Each monitored topic maps to one pure decode function that writes a
//! single `DisplayState` field. Malformed payloads leave the previous value
//! in place; a health monitor must keep running on bad broker data.

use crate::domain::display::DisplayState;
use crate::domain::topics;
use rustc_hash::FxHashMap;
use std::time::Duration;

/// Significant digits kept for the 5-minute load average
const LOAD_SIGNIFICANT_DIGITS: i32 = 3;

/// Result of decoding one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// One field was overwritten
    Updated,
    /// Payload did not parse; state unchanged
    Rejected,
    /// No decoder for this topic; state unchanged
    Ignored,
}

/// Decode function: returns false when the payload is malformed
type DecodeFn = fn(&mut DisplayState, &str) -> bool;

/// Topic-to-decoder lookup table
pub struct Decoder {
    prefix: String,
    table: FxHashMap<&'static str, DecodeFn>,
}

impl Decoder {
    /// Build the decoder table for topics published under `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut table: FxHashMap<&'static str, DecodeFn> = FxHashMap::default();
        table.insert(topics::UPTIME, decode_uptime);
        table.insert(topics::HEAP_CURRENT, |s, p| {
            s.current_heap_size = p.to_string();
            true
        });
        table.insert(topics::HEAP_MAXIMUM, |s, p| {
            s.max_heap_size = p.to_string();
            true
        });
        table.insert(topics::SUBSCRIPTIONS_COUNT, |s, p| {
            s.subscription_count = p.to_string();
            true
        });
        table.insert(topics::CLIENTS_CONNECTED, |s, p| {
            parse_count(p).map(|n| s.connection_count = n).is_some()
        });
        table.insert(topics::CLIENTS_MAXIMUM, |s, p| {
            parse_count(p).map(|n| s.max_connection_count = n).is_some()
        });
        table.insert(topics::LOAD_RECEIVED_5MIN, |s, p| {
            parse_load(p).map(|v| s.avg_messages_received_5min = v).is_some()
        });

        Self { prefix: prefix.into(), table }
    }

    /// Apply one message to `state`
    pub fn decode(&self, state: &mut DisplayState, topic: &str, payload: &[u8]) -> DecodeOutcome {
        let Some(decode) = topic
            .strip_prefix(self.prefix.as_str())
            .and_then(|suffix| self.table.get(suffix))
        else {
            return DecodeOutcome::Ignored;
        };

        let text = String::from_utf8_lossy(payload);
        if decode(state, &text) {
            DecodeOutcome::Updated
        } else {
            DecodeOutcome::Rejected
        }
    }
}

fn decode_uptime(state: &mut DisplayState, payload: &str) -> bool {
    match parse_uptime(payload) {
        Some(uptime) => {
            state.uptime = format_uptime(uptime);
            true
        }
        None => false,
    }
}

/// Parse `"<seconds> <unit>"`; only the leading integer is used
pub fn parse_uptime(payload: &str) -> Option<Duration> {
    payload
        .split_whitespace()
        .next()
        .and_then(|secs| secs.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Format as `1h2m3s`, dropping leading zero units (`2m5s`, `42s`)
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Base-10 unsigned count
pub fn parse_count(payload: &str) -> Option<u64> {
    payload.trim().parse().ok()
}

/// Finite float rounded to three significant digits
pub fn parse_load(payload: &str) -> Option<f64> {
    let value: f64 = payload.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let rounded = round_significant(value, LOAD_SIGNIFICANT_DIGITS);
    rounded.is_finite().then_some(rounded)
}

/// Values too small for the scale factor to be representable come back as-is
fn round_significant(value: f64, digits: i32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits - 1 - magnitude);
    if !scale.is_finite() || scale == 0.0 {
        return value;
    }
    (value * scale).round() / scale
}
