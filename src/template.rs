//! Configuration value parser
//!
//! A configuration value is a `|`-separated list of segments, each segment a
//! `,`-separated list of parts:
//!
//! - one part: literal text, emitted as-is
//! - `columnValue,<field>`: the value of an input field
//! - `lookup,<field>,<attribute>`: an attribute of the record referenced by `<field>`
//!
//! There is no escaping: `|` and `,` can never appear inside literal text.
//!
//! ```
//! use autotext::template::{parse, Fragment};
//!
//! let fragments = parse("Ship to|columnValue,city");
//! assert_eq!(fragments[0], Fragment::literal("Ship to"));
//! assert_eq!(fragments[1], Fragment::column_value("city"));
//! ```

/// Directive keyword selecting a direct field value
pub const COLUMN_VALUE: &str = "columnValue";

/// Directive keyword selecting a referenced record attribute
pub const LOOKUP: &str = "lookup";

const SEGMENT_SEPARATOR: char = '|';
const PART_SEPARATOR: char = ',';

/// One parsed configuration segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text (not trimmed)
    Literal { text: String },
    /// `columnValue,<field>`
    ColumnValue { field: String },
    /// `lookup,<field>,<attribute>` (attribute is `None` when the part is missing)
    Lookup {
        field: String,
        attribute: Option<String>,
    },
    /// Directive with an unrecognized keyword; renders nothing
    Unknown { keyword: String },
}

impl Fragment {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal { text: text.into() }
    }

    pub fn column_value(field: impl Into<String>) -> Self {
        Self::ColumnValue {
            field: field.into(),
        }
    }

    pub fn lookup(field: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Lookup {
            field: field.into(),
            attribute: Some(attribute.into()),
        }
    }

    /// Field name this fragment reads, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ColumnValue { field } | Self::Lookup { field, .. } => Some(field),
            Self::Literal { .. } | Self::Unknown { .. } => None,
        }
    }

    /// Whether resolving this fragment may call the record fetcher
    pub fn may_fetch(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

/// Parse a configuration value into fragments, in declaration order.
///
/// An empty configuration yields no fragments.
pub fn parse(config: &str) -> Vec<Fragment> {
    if config.is_empty() {
        return Vec::new();
    }

    config.split(SEGMENT_SEPARATOR).map(parse_segment).collect()
}

fn parse_segment(segment: &str) -> Fragment {
    let parts: Vec<&str> = segment.split(PART_SEPARATOR).collect();

    if parts.len() == 1 {
        return Fragment::literal(parts[0]);
    }

    match parts[0] {
        COLUMN_VALUE => Fragment::column_value(parts[1]),
        // A fourth part is accepted and ignored
        LOOKUP => Fragment::Lookup {
            field: parts[1].to_string(),
            attribute: parts.get(2).map(|a| a.to_string()),
        },
        keyword => Fragment::Unknown {
            keyword: keyword.to_string(),
        },
    }
}

/// Field names referenced by directives, in first-use order without duplicates
pub fn referenced_fields(fragments: &[Fragment]) -> Vec<&str> {
    let mut fields: Vec<&str> = Vec::new();
    for field in fragments.iter().filter_map(Fragment::field) {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields
}
