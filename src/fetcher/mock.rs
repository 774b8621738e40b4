//! Mock fetcher for testing
//!
//! Serves canned attribute values without a remote store.
//! Records every call so tests can assert on fetch traffic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::RecordFetcher;
use crate::error::FetchError;

type RecordKey = (String, String, String);

/// A recorded `fetch_attribute` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub entity_type: String,
    pub id: String,
    pub attribute: String,
}

impl FetchCall {
    pub fn new(entity_type: &str, id: &str, attribute: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Mock fetcher with canned records, failures and latency
#[derive(Clone, Default)]
pub struct MockFetcher {
    /// (entity_type, id, attribute) → value
    records: Arc<DashMap<RecordKey, String>>,
    /// (entity_type, id, attribute) → forced error
    failures: Arc<DashMap<RecordKey, FetchError>>,
    /// id → artificial latency
    delays: Arc<DashMap<String, Duration>>,
    /// Track all calls made (for assertions)
    calls: Arc<Mutex<Vec<FetchCall>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` for the given record attribute
    pub fn with_record(
        self,
        entity_type: &str,
        id: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> Self {
        self.records.insert(key(entity_type, id, attribute), value.into());
        self
    }

    /// Fail the given record attribute with `error`
    pub fn with_failure(self, entity_type: &str, id: &str, attribute: &str, error: FetchError) -> Self {
        self.failures.insert(key(entity_type, id, attribute), error);
        self
    }

    /// Delay every fetch of record `id` by `delay`
    pub fn with_delay(self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    /// Get all calls made to this fetcher
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear all recorded calls
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

fn key(entity_type: &str, id: &str, attribute: &str) -> RecordKey {
    (entity_type.to_string(), id.to_string(), attribute.to_string())
}

#[async_trait]
impl RecordFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_attribute(
        &self,
        entity_type: &str,
        id: &str,
        attribute: &str,
    ) -> Result<String, FetchError> {
        self.calls.lock().push(FetchCall::new(entity_type, id, attribute));

        let delay = self.delays.get(id).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let key = key(entity_type, id, attribute);
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }

        self.records
            .get(&key)
            .map(|v| v.clone())
            .ok_or_else(|| FetchError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            })
    }
}
