//! Control file
//!
//! A control file describes one auto-populated text control: its
//! configuration value, its declared input fields with their current values,
//! and optionally the Web API used for lookups.
//!
//! ```yaml
//! schema: autotext/control@0.1
//! config_value: "Ship to|columnValue,AddressLine1|lookup,cityValue,name"
//! fields:
//!   AddressLine1: 1 Main Street
//!   cityValue:
//!     - id: 6f1c
//!       entityType: city
//!       name: Paris
//! web_api:
//!   base_url: https://org.crm.dynamics.com/api/data/v9.2
//!   token_env: AUTOTEXT_TOKEN
//! ```

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AutotextError, Result};
use crate::snapshot::InputSnapshot;

/// Schema tag every control file must carry
pub const CONTROL_SCHEMA: &str = "autotext/control@0.1";

/// Parsed control file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlConfig {
    pub schema: String,

    /// `|`-separated configuration value
    #[serde(default)]
    pub config_value: String,

    /// Declared input fields and their current values (null = no value)
    #[serde(default)]
    pub fields: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_api: Option<WebApiConfig>,
}

/// Remote data API used by the `webapi` fetcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebApiConfig {
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// entity type → entity set name, for irregular plurals
    #[serde(default)]
    pub entity_sets: FxHashMap<String, String>,
}

impl ControlConfig {
    /// Parse and check the schema tag
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ControlConfig = serde_yaml::from_str(yaml)?;
        config.check_schema()?;
        Ok(config)
    }

    /// Read a control file (async to not block runtime)
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&yaml)
    }

    fn check_schema(&self) -> Result<()> {
        if self.schema != CONTROL_SCHEMA {
            return Err(AutotextError::InvalidSchema {
                expected: CONTROL_SCHEMA.to_string(),
                actual: self.schema.clone(),
            });
        }
        Ok(())
    }

    /// Build the input snapshot from the declared fields
    pub fn snapshot(&self) -> Result<InputSnapshot> {
        InputSnapshot::from_json_fields(&self.fields)
    }
}
