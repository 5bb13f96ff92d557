//! Lock-free counters for inbound session traffic
//!
//! NOTE: All atomics use Relaxed ordering; these are statistics only and
//! never drive control flow.

use crate::domain::decoder::DecodeOutcome;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct SessionMetrics {
    messages_received: AtomicU64,
    fields_updated: AtomicU64,
    payloads_rejected: AtomicU64,
    topics_ignored: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSummary {
    pub messages_received: u64,
    pub fields_updated: u64,
    pub payloads_rejected: u64,
    pub topics_ignored: u64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one inbound publish and its decode outcome
    #[inline]
    pub fn record(&self, outcome: DecodeOutcome) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            DecodeOutcome::Updated => &self.fields_updated,
            DecodeOutcome::Rejected => &self.payloads_rejected,
            DecodeOutcome::Ignored => &self.topics_ignored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSummary {
        MetricsSummary {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            fields_updated: self.fields_updated.load(Ordering::Relaxed),
            payloads_rejected: self.payloads_rejected.load(Ordering::Relaxed),
            topics_ignored: self.topics_ignored.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            received = %self.messages_received,
            updated = %self.fields_updated,
            rejected = %self.payloads_rejected,
            ignored = %self.topics_ignored,
            "session_summary"
        );
    }
}
