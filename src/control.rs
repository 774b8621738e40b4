//! Host-facing control
//!
//! [`AutoPopulateControl`] owns the single output value of an
//! auto-populated text field and tells the host when it changes. The host
//! calls [`AutoPopulateControl::update_view`] whenever an input field
//! changes and [`AutoPopulateControl::set_config_value`] when the
//! configuration value changes; each call runs one resolution pass.
//!
//! Overlapping passes are resolved with a generation counter: every pass
//! takes the next generation number, and when it finishes it only commits
//! if no newer pass has started in the meantime. Stale results are dropped,
//! so the output always reflects the latest inputs the host supplied.
//! Commits and notifications are serialized, so the host is always notified
//! in commit order and the last notification carries the current value.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::event_log::{EventKind, EventLog};
use crate::fetcher::RecordFetcher;
use crate::resolver::Resolver;
use crate::snapshot::InputSnapshot;
use crate::template;

/// Change notification callback; receives the new output value.
///
/// Called with commits serialized: the callback may read
/// [`AutoPopulateControl::outputs`] but must not start a pass or call
/// [`AutoPopulateControl::on_blur`] itself.
pub type Notifier = Arc<dyn Fn(&str) + Send + Sync>;

/// Result of one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Output written and host notified
    Committed(String),
    /// A newer pass started before this one finished
    Superseded { generation: u64, superseded_by: u64 },
}

impl PassOutcome {
    pub fn committed(&self) -> Option<&str> {
        match self {
            Self::Committed(value) => Some(value),
            Self::Superseded { .. } => None,
        }
    }
}

/// Auto-populated text control
pub struct AutoPopulateControl {
    fetcher: Arc<dyn RecordFetcher>,
    notify: Notifier,
    config_value: RwLock<String>,
    /// Snapshot of the most recent `update_view`
    snapshot: RwLock<InputSnapshot>,
    /// The single output value exposed to the host
    value: RwLock<String>,
    /// Held while a pass commits and notifies
    commit: Mutex<()>,
    generation: AtomicU64,
    events: EventLog,
}

impl AutoPopulateControl {
    pub fn new(config_value: impl Into<String>, fetcher: Arc<dyn RecordFetcher>, notify: Notifier) -> Self {
        Self {
            fetcher,
            notify,
            config_value: RwLock::new(config_value.into()),
            snapshot: RwLock::new(InputSnapshot::new()),
            value: RwLock::new(String::new()),
            commit: Mutex::new(()),
            generation: AtomicU64::new(0),
            events: EventLog::new(),
        }
    }

    /// Start from the value the host already has stored
    pub fn with_value(self, value: impl Into<String>) -> Self {
        *self.value.write() = value.into();
        self
    }

    pub fn config_value(&self) -> String {
        self.config_value.read().clone()
    }

    /// Current output value (what the host persists)
    pub fn outputs(&self) -> String {
        self.value.read().clone()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Generation of the most recently started pass
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Input fields changed: keep the snapshot and run a pass
    pub async fn update_view(&self, snapshot: &InputSnapshot) -> PassOutcome {
        *self.snapshot.write() = snapshot.clone();
        self.run_pass(snapshot).await
    }

    /// Configuration value changed: store it and run a pass over the last snapshot
    pub async fn set_config_value(&self, config_value: &str) -> PassOutcome {
        {
            let mut current = self.config_value.write();
            if *current != config_value {
                tracing::debug!(config_value, "configuration value changed");
                *current = config_value.to_string();
            }
        }
        let snapshot = self.snapshot.read().clone();
        self.run_pass(&snapshot).await
    }

    async fn run_pass(&self, snapshot: &InputSnapshot) -> PassOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        let fragments = template::parse(&self.config_value());

        self.events.emit(EventKind::PassStarted {
            generation,
            fragment_count: fragments.len(),
        });

        let output = Resolver::new(self.fetcher.as_ref())
            .with_trace(&self.events, generation)
            .resolve(&fragments, snapshot)
            .await;

        let _commit = self.commit.lock();
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            tracing::debug!(generation, latest, "discarding stale resolution pass");
            self.events.emit(EventKind::PassDiscarded {
                generation,
                superseded_by: latest,
            });
            return PassOutcome::Superseded {
                generation,
                superseded_by: latest,
            };
        }
        *self.value.write() = output.clone();

        self.events.emit(EventKind::PassCompleted {
            generation,
            output: output.clone(),
            duration_ms: started.elapsed().as_millis() as u64,
        });
        tracing::info!(generation, output = %output, "output updated");
        (self.notify)(&output);

        PassOutcome::Committed(output)
    }

    /// The user edited the displayed text and left the field
    pub fn on_blur(&self, text: impl Into<String>) {
        let text = text.into();
        let _commit = self.commit.lock();
        *self.value.write() = text.clone();
        self.events.emit(EventKind::OutputEdited {
            value: text.clone(),
        });
        (self.notify)(&text);
    }
}

impl std::fmt::Debug for AutoPopulateControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoPopulateControl")
            .field("fetcher", &self.fetcher.name())
            .field("config_value", &*self.config_value.read())
            .field("value", &*self.value.read())
            .field("generation", &self.generation())
            .finish()
    }
}
