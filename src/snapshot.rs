//! Input field snapshot
//!
//! The host hands over a snapshot of its declared input fields before each
//! resolution pass. Each field is either absent (null), a scalar, or a lookup
//! holding references to other records. The scalar/lookup decision is made
//! once, when the snapshot is built from JSON, so the resolver never has to
//! probe value shapes.
//!
//! Uses FxHashMap for faster hashing on small string keys.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AutotextError;

/// Reference to a record in the external store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReferenceFields")]
pub struct EntityReference {
    pub id: String,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    /// Cached display name, when the host provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Wire shape of a reference; hosts send `name`, `displayName`, or both
#[derive(Deserialize)]
struct ReferenceFields {
    id: String,
    #[serde(rename = "entityType")]
    entity_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
}

impl From<ReferenceFields> for EntityReference {
    fn from(fields: ReferenceFields) -> Self {
        Self {
            id: fields.id,
            entity_type: fields.entity_type,
            name: fields.name.or(fields.display_name),
        }
    }
}

impl EntityReference {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attribute carried directly by the reference, without a fetch.
    ///
    /// `name` is only answered when the host supplied a display name.
    pub fn attribute(&self, attribute: &str) -> Option<&str> {
        match attribute {
            "id" => Some(&self.id),
            "entityType" => Some(&self.entity_type),
            "name" | "displayName" => self.name.as_deref(),
            _ => None,
        }
    }

    /// Text shown when the reference itself is rendered as a column value
    pub fn display(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Value of one input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    /// Lookup field; only the first reference is used during resolution
    Lookup(Vec<EntityReference>),
}

impl FieldValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn reference(reference: EntityReference) -> Self {
        Self::Lookup(vec![reference])
    }

    /// Classify a JSON value. `null` means the field has no value.
    pub fn from_json(field: &str, value: &Value) -> Result<Option<Self>, AutotextError> {
        let classified = match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Scalar(s.clone())),
            Value::Bool(_) | Value::Number(_) => Some(Self::Scalar(value.to_string())),
            Value::Object(_) if is_reference_shaped(value) => {
                Some(Self::Lookup(vec![parse_reference(field, value)?]))
            }
            Value::Array(items) if items.iter().all(is_reference_shaped) => {
                let references = items
                    .iter()
                    .map(|item| parse_reference(field, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Some(Self::Lookup(references))
            }
            other => Some(Self::Scalar(other.to_string())),
        };
        Ok(classified)
    }

    /// Text rendered by a `columnValue` directive; `None` for an empty lookup
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Lookup(references) => references.first().map(EntityReference::display),
        }
    }
}

fn is_reference_shaped(value: &Value) -> bool {
    value.get("id").is_some() && value.get("entityType").is_some()
}

fn parse_reference(field: &str, value: &Value) -> Result<EntityReference, AutotextError> {
    serde_json::from_value(value.clone()).map_err(|e| AutotextError::InvalidFieldValue {
        field: field.to_string(),
        details: e.to_string(),
    })
}

/// Snapshot of the host's input fields for one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    /// Declared field names, in declaration order
    declared: Vec<String>,
    /// Fields holding a value (null fields are declared but absent here)
    values: FxHashMap<String, FieldValue>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(field, json)` pairs; every pair is declared, nulls stay absent
    pub fn from_json_fields<'a, I>(fields: I) -> Result<Self, AutotextError>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut snapshot = Self::new();
        for (field, value) in fields {
            snapshot.declare(field.as_str());
            if let Some(classified) = FieldValue::from_json(field, value)? {
                snapshot.values.insert(field.clone(), classified);
            }
        }
        Ok(snapshot)
    }

    /// Declare a field without a value
    pub fn declare(&mut self, field: impl Into<String>) {
        let field = field.into();
        if !self.declared.contains(&field) {
            self.declared.push(field);
        }
    }

    /// Declare a field and set its value
    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        let field = field.into();
        self.declare(field.clone());
        self.values.insert(field, value);
    }

    /// Builder form of [`InputSnapshot::set`]
    pub fn with(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn declared_fields(&self) -> &[String] {
        &self.declared
    }

    pub fn is_declared(&self, field: &str) -> bool {
        self.declared.iter().any(|f| f == field)
    }
}
