//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Errors raised while loading control files and setting up fetchers.
///
/// Resolution itself never fails: fragment failures become inline
/// placeholders. These errors only surface at the CLI / host boundary.
#[derive(Error, Debug)]
pub enum AutotextError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Control file errors (AUTO-010 to AUTO-012)
    // ─────────────────────────────────────────────────────────────
    #[error("AUTO-010: Invalid schema: expected '{expected}', got '{actual}'")]
    InvalidSchema { expected: String, actual: String },

    #[error("AUTO-011: Field '{field}' has an unsupported value: {details}")]
    InvalidFieldValue { field: String, details: String },

    #[error("AUTO-012: Configuration error: {reason}")]
    Config { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Fetcher setup errors (AUTO-020 to AUTO-022)
    // ─────────────────────────────────────────────────────────────
    #[error("AUTO-020: Unknown fetcher '{name}'. Available: mock, webapi")]
    UnknownFetcher { name: String },

    #[error("AUTO-021: Fetcher '{name}' requires a web_api section in the control file")]
    MissingWebApi { name: String },

    #[error("AUTO-022: Environment variable '{var}' is not set")]
    MissingToken { var: String },

    // ─────────────────────────────────────────────────────────────
    // Validation (AUTO-030)
    // ─────────────────────────────────────────────────────────────
    #[error("AUTO-030: Configuration value has {count} error(s)")]
    ValidationFailed { count: usize },
}

impl FixSuggestion for AutotextError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            AutotextError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            AutotextError::Io(_) => Some("Check file path and permissions"),
            AutotextError::InvalidSchema { .. } => {
                Some("Start the control file with: schema: autotext/control@0.1")
            }
            AutotextError::InvalidFieldValue { .. } => {
                Some("Use a string, number, boolean, null, or a list of {id, entityType, name} records")
            }
            AutotextError::Config { .. } => Some("Check the web_api section of the control file"),
            AutotextError::UnknownFetcher { .. } => Some("Use --fetcher mock or --fetcher webapi"),
            AutotextError::MissingWebApi { .. } => {
                Some("Add web_api: { base_url: ..., token_env: ... } to the control file")
            }
            AutotextError::MissingToken { .. } => {
                Some("Export the token variable or add it to a .env file")
            }
            AutotextError::ValidationFailed { .. } => {
                Some("Fix the reported segments: lookup needs lookup,<field>,<attribute>")
            }
        }
    }
}

/// Failure of a single record-fetch call.
///
/// Caught per fragment by the resolver and rendered as
/// `[Error retrieving <attribute> for <field>]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("record {entity_type}({id}) not found")]
    NotFound { entity_type: String, id: String },

    #[error("attribute '{attribute}' missing on {entity_type}({id})")]
    AttributeMissing {
        entity_type: String,
        id: String,
        attribute: String,
    },

    #[error("web api returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AutotextError>;
