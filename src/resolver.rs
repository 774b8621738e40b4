//! Fragment resolution
//!
//! Turns parsed fragments into display text. Fragments resolve strictly in
//! declaration order, one fetch at a time, and each one appends `" " + text`
//! to the output; the final string is trimmed.
//!
//! Resolution never fails. Every problem becomes an inline placeholder:
//!
//! | Case | Output |
//! |------|--------|
//! | `columnValue` field has no value | `[columnValue for <field>not available]` |
//! | `lookup` field has no value | nothing |
//! | `lookup` field is an empty list | `[lookupValue array <field>is empty]` |
//! | `lookup` field is a plain value | `[<attribute> for <field> not available]` |
//! | `lookup` has no attribute part | `[lookup for <field> is missing an attribute]` |
//! | fetch failed | `[Error retrieving <attribute> for <field>]` |
//!
//! The missing spaces in the first and third placeholders are part of the
//! output format and must stay as they are.

use crate::event_log::{EventKind, EventLog};
use crate::fetcher::RecordFetcher;
use crate::snapshot::{FieldValue, InputSnapshot};
use crate::template::{self, Fragment};

pub fn column_value_unavailable(field: &str) -> String {
    format!("[columnValue for {}not available]", field)
}

pub fn lookup_array_empty(field: &str) -> String {
    format!("[lookupValue array {}is empty]", field)
}

pub fn lookup_not_a_reference(field: &str, attribute: &str) -> String {
    format!("[{} for {} not available]", attribute, field)
}

pub fn lookup_missing_attribute(field: &str) -> String {
    format!("[lookup for {} is missing an attribute]", field)
}

pub fn fetch_failed(field: &str, attribute: &str) -> String {
    format!("[Error retrieving {} for {}]", attribute, field)
}

/// Resolves fragments against a snapshot using a record fetcher
pub struct Resolver<'a> {
    fetcher: &'a dyn RecordFetcher,
    /// Event log and pass generation, when the pass is traced
    trace: Option<(&'a EventLog, u64)>,
}

impl<'a> Resolver<'a> {
    pub fn new(fetcher: &'a dyn RecordFetcher) -> Self {
        Self {
            fetcher,
            trace: None,
        }
    }

    /// Record fetch events for pass `generation` into `log`
    pub fn with_trace(mut self, log: &'a EventLog, generation: u64) -> Self {
        self.trace = Some((log, generation));
        self
    }

    /// Resolve all fragments in order and assemble the trimmed output
    pub async fn resolve(&self, fragments: &[Fragment], snapshot: &InputSnapshot) -> String {
        let mut output = String::new();

        for fragment in fragments {
            if let Some(text) = self.resolve_fragment(fragment, snapshot).await {
                output.push(' ');
                output.push_str(&text);
            }
        }

        output.trim().to_string()
    }

    /// Text contributed by one fragment; `None` contributes nothing
    pub async fn resolve_fragment(&self, fragment: &Fragment, snapshot: &InputSnapshot) -> Option<String> {
        match fragment {
            Fragment::Literal { text } => Some(text.clone()),
            Fragment::ColumnValue { field } => Some(
                snapshot
                    .get(field)
                    .and_then(FieldValue::as_text)
                    .map(str::to_string)
                    .unwrap_or_else(|| column_value_unavailable(field)),
            ),
            Fragment::Lookup { field, attribute } => {
                self.resolve_lookup(field, attribute.as_deref(), snapshot).await
            }
            Fragment::Unknown { keyword } => {
                tracing::debug!(keyword = %keyword, "skipping unknown directive");
                None
            }
        }
    }

    async fn resolve_lookup(
        &self,
        field: &str,
        attribute: Option<&str>,
        snapshot: &InputSnapshot,
    ) -> Option<String> {
        let value = snapshot.get(field)?;

        let Some(attribute) = attribute else {
            return Some(lookup_missing_attribute(field));
        };

        let reference = match value {
            FieldValue::Lookup(references) => match references.first() {
                Some(reference) => reference,
                None => return Some(lookup_array_empty(field)),
            },
            FieldValue::Scalar(s) if s.is_empty() => return Some(lookup_array_empty(field)),
            FieldValue::Scalar(_) => return Some(lookup_not_a_reference(field, attribute)),
        };

        if let Some(carried) = reference.attribute(attribute) {
            return Some(carried.to_string());
        }

        tracing::debug!(
            field,
            entity_type = %reference.entity_type,
            id = %reference.id,
            attribute,
            fetcher = self.fetcher.name(),
            "fetching lookup attribute"
        );
        self.emit(|generation| EventKind::FetchIssued {
            generation,
            field: field.into(),
            entity_type: reference.entity_type.clone(),
            attribute: attribute.to_string(),
        });

        match self
            .fetcher
            .fetch_attribute(&reference.entity_type, &reference.id, attribute)
            .await
        {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(field, attribute, %error, "lookup fetch failed");
                self.emit(|generation| EventKind::FetchFailed {
                    generation,
                    field: field.into(),
                    attribute: attribute.to_string(),
                    error: error.to_string(),
                });
                Some(fetch_failed(field, attribute))
            }
        }
    }

    fn emit(&self, kind: impl FnOnce(u64) -> EventKind) {
        if let Some((log, generation)) = self.trace {
            log.emit(kind(generation));
        }
    }
}

/// Resolve fragments into the trimmed display string
pub async fn resolve(
    fragments: &[Fragment],
    snapshot: &InputSnapshot,
    fetcher: &dyn RecordFetcher,
) -> String {
    Resolver::new(fetcher).resolve(fragments, snapshot).await
}

/// Parse a configuration value and resolve it
pub async fn render(config: &str, snapshot: &InputSnapshot, fetcher: &dyn RecordFetcher) -> String {
    resolve(&template::parse(config), snapshot, fetcher).await
}
