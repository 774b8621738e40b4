//! Resolution event log
//!
//! Audit trail of resolution passes for one control.
//! - Event: envelope with id + timestamp + kind
//! - EventKind: pass-level and fetch-level variants
//! - EventLog: thread-safe, append-only log

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single event in the control's log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    /// Time since the log was created (ms)
    pub timestamp_ms: u64,
    /// Event type and data
    pub kind: EventKind,
}

/// All possible event types
///
/// Uses Arc<str> for field names to enable cheap cloning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // PASS LEVEL
    // ═══════════════════════════════════════════
    PassStarted {
        generation: u64,
        fragment_count: usize,
    },
    /// Newest pass finished; output written and host notified
    PassCompleted {
        generation: u64,
        output: String,
        duration_ms: u64,
    },
    /// Pass finished after a newer one started; result dropped
    PassDiscarded {
        generation: u64,
        superseded_by: u64,
    },

    // ═══════════════════════════════════════════
    // FETCH LEVEL
    // ═══════════════════════════════════════════
    FetchIssued {
        generation: u64,
        field: Arc<str>,
        entity_type: String,
        attribute: String,
    },
    FetchFailed {
        generation: u64,
        field: Arc<str>,
        attribute: String,
        error: String,
    },

    // ═══════════════════════════════════════════
    // HOST
    // ═══════════════════════════════════════════
    /// User edited the displayed text directly
    OutputEdited {
        value: String,
    },
}

impl EventKind {
    /// Generation of the pass this event belongs to
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::PassStarted { generation, .. }
            | Self::PassCompleted { generation, .. }
            | Self::PassDiscarded { generation, .. }
            | Self::FetchIssued { generation, .. }
            | Self::FetchFailed { generation, .. } => Some(*generation),
            Self::OutputEdited { .. } => None,
        }
    }

    /// Check if this is a fetch-level event
    pub fn is_fetch_event(&self) -> bool {
        matches!(self, Self::FetchIssued { .. } | Self::FetchFailed { .. })
    }
}

/// Thread-safe, append-only event log
#[derive(Clone)]
pub struct EventLog {
    events: Arc<RwLock<Vec<Event>>>,
    start_time: Instant,
    next_id: Arc<AtomicU64>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event (thread-safe, returns event ID)
    pub fn emit(&self, kind: EventKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            timestamp_ms: self.start_time.elapsed().as_millis() as u64,
            kind,
        };

        self.events.write().push(event);
        id
    }

    /// Get all events (cloned)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Events belonging to one resolution pass
    pub fn filter_generation(&self, generation: u64) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.generation() == Some(generation))
            .collect()
    }

    /// Fetch-level events only
    pub fn fetch_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind.is_fetch_event())
            .collect()
    }

    /// Serialize to JSON for debugging
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.events()).unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}
