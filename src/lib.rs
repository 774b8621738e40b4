//! Autotext - auto-populated text built from field values and record lookups

pub mod config;
pub mod control;
pub mod error;
pub mod event_log;
pub mod fetcher;
pub mod resolver;
pub mod snapshot;
pub mod template;
pub mod validator;

pub use config::{ControlConfig, WebApiConfig};
pub use control::{AutoPopulateControl, Notifier, PassOutcome};
pub use error::{AutotextError, FetchError, FixSuggestion};
pub use event_log::{Event, EventKind, EventLog};
pub use fetcher::{create_fetcher, MockFetcher, RecordFetcher, WebApiFetcher};
pub use resolver::{render, resolve, Resolver};
pub use snapshot::{EntityReference, FieldValue, InputSnapshot};
pub use template::{parse, Fragment};
pub use validator::{validate, Diagnostic, Severity};
