//! Configuration value diagnostics
//!
//! Flags segments that will render nothing or a placeholder. Validation is
//! advisory: the resolver renders every configuration the same way whether
//! or not it validates.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::template::{Fragment, COLUMN_VALUE, LOOKUP};

/// Field names as the host declares them
static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding about one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Zero-based segment index
    pub segment: usize,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn warning(segment: usize, message: impl Into<String>) -> Self {
        Self {
            segment,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(segment: usize, message: impl Into<String>) -> Self {
        Self {
            segment,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment {}: {}: {}", self.segment + 1, self.severity, self.message)
    }
}

pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME_RE.is_match(name)
}

/// Check fragments against the declared field names.
///
/// An empty `declared` list skips the declaration check.
pub fn validate(fragments: &[Fragment], declared: &[String]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (index, fragment) in fragments.iter().enumerate() {
        match fragment {
            Fragment::Literal { .. } => {}
            Fragment::Unknown { keyword } => diagnostics.push(Diagnostic::warning(
                index,
                format!(
                    "unknown directive '{}' renders nothing (expected {} or {})",
                    keyword, COLUMN_VALUE, LOOKUP
                ),
            )),
            Fragment::ColumnValue { field } | Fragment::Lookup { field, .. } => {
                if !is_valid_field_name(field) {
                    diagnostics.push(Diagnostic::error(
                        index,
                        format!("'{}' is not a valid field name", field),
                    ));
                } else if !declared.is_empty() && !declared.iter().any(|d| d == field) {
                    diagnostics.push(Diagnostic::warning(
                        index,
                        format!("field '{}' is not declared", field),
                    ));
                }

                if let Fragment::Lookup {
                    attribute: None, ..
                } = fragment
                {
                    diagnostics.push(Diagnostic::error(
                        index,
                        format!("lookup on '{}' needs an attribute: lookup,{},<attribute>", field, field),
                    ));
                }
            }
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse;

    fn declared(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn clean_config_has_no_diagnostics() {
        let fragments = parse("Ship to|columnValue,AddressLine1|lookup,cityValue,name");
        assert!(validate(&fragments, &declared(&["AddressLine1", "cityValue"])).is_empty());
    }

    #[test]
    fn unknown_keyword_is_a_warning() {
        let diagnostics = validate(&parse("a|upper,f1"), &[]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].segment, 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn lookup_without_attribute_is_an_error() {
        let diagnostics = validate(&parse("lookup,cityValue"), &[]);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn undeclared_field_is_a_warning() {
        let diagnostics = validate(&parse("columnValue,String4"), &declared(&["String1"]));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("String4"));
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn invalid_field_name_is_an_error() {
        let diagnostics = validate(&parse("columnValue, spaced name"), &[]);
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn field_name_rules() {
        assert!(is_valid_field_name("AddressLine1"));
        assert!(is_valid_field_name("_private"));
        assert!(!is_valid_field_name("1st"));
        assert!(!is_valid_field_name(""));
        assert!(!is_valid_field_name("city value"));
    }

    #[test]
    fn display_is_one_based() {
        let diagnostics = validate(&parse("upper,x"), &[]);
        assert!(diagnostics[0].to_string().starts_with("segment 1: warning:"));
    }
}
