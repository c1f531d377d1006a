//! Resource identifier validation
//!
//! Identifiers arrive as raw route segments. Before an action looks a record
//! up it checks that the segment has the shape of the model's primary key:
//! a canonical UUID for UUID keys, a numeric string for everything else.

use std::fmt;

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{ColumnType, ModelSchema};

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$",
    )
    .expect("UUID pattern is valid")
});

static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII digits and whitespace only
    Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("numeric pattern is valid")
});

/// Expected identifier type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdType {
    /// Canonical 8-4-4-4-12 hex UUID
    Uuid,
    /// Integer key
    Integer,
    /// Any other configured type name; validated as numeric
    Other(String),
}

impl IdType {
    /// Parse a configured type name
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "uuid" => Self::Uuid,
            "integer" => Self::Integer,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether `id` has the shape this type requires
    #[must_use]
    pub fn accepts(&self, id: &str) -> bool {
        match self {
            Self::Uuid => is_uuid(id),
            Self::Integer | Self::Other(_) => is_numeric(id),
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid => write!(f, "uuid"),
            Self::Integer => write!(f, "integer"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Canonical UUID string check
#[must_use]
pub fn is_uuid(id: &str) -> bool {
    UUID_PATTERN.is_match(id)
}

/// Numeric string check (optional sign, decimals and exponent allowed)
#[must_use]
pub fn is_numeric(id: &str) -> bool {
    NUMERIC_PATTERN.is_match(id)
}

/// Infer the identifier type from a model's primary key column
///
/// A 36 character string or binary column holds UUIDs; an integer column holds
/// integers. Anything else is inconclusive and yields `None`.
#[must_use]
pub fn detect_id_type(model: &dyn ModelSchema) -> Option<IdType> {
    let column = model.primary_key_column()?;
    match column.column_type {
        ColumnType::String | ColumnType::Binary if column.length == Some(36) => Some(IdType::Uuid),
        ColumnType::Integer => Some(IdType::Integer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableSchema;

    #[test]
    fn test_uuid_shape() {
        assert!(is_uuid(&uuid::Uuid::new_v4().to_string()));
        assert!(is_uuid("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!is_uuid("550e8400e29b41d4a716446655440000"));
        assert!(!is_uuid("{550e8400-e29b-41d4-a716-446655440000}"));
        assert!(!is_uuid("550e8400-e29b-41d4-a716-44665544000"));
        assert!(!is_uuid("not-a-uuid"));
    }

    #[test]
    fn test_uuid_any_version_and_variant_nibble() {
        assert!(is_uuid("ffffffff-ffff-ffff-ffff-ffffffffffff"));
        assert!(is_uuid("00000000-0000-0000-0000-000000000000"));
        assert!(is_uuid("550e8400-e29b-41d4-c716-446655440000"));
        assert!(is_uuid("550e8400-e29b-91d4-a716-446655440000"));
        assert!(IdType::Uuid.accepts("550e8400-e29b-41d4-c716-446655440000"));
    }

    #[test]
    fn test_numeric_shape() {
        assert!(is_numeric("42"));
        assert!(is_numeric("-7"));
        assert!(is_numeric("3.14"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric("abc"));
        assert!(!is_numeric("42abc"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("inf"));
    }

    #[test]
    fn test_numeric_rejects_non_ascii_digits_and_spaces() {
        assert!(!is_numeric("\u{0661}\u{0662}"));
        assert!(!is_numeric("\u{0661}\u{0662}\u{0663}"));
        assert!(!is_numeric("\u{3000}42"));
        assert!(!IdType::Integer.accepts("\u{FF14}\u{FF12}"));
        assert!(is_numeric(" 42"));
        assert!(is_numeric("\t42"));
    }

    #[test]
    fn test_id_type_from_name() {
        assert_eq!(IdType::from_name("uuid"), IdType::Uuid);
        assert_eq!(IdType::from_name("integer"), IdType::Integer);
        assert_eq!(
            IdType::from_name("biginteger"),
            IdType::Other("biginteger".to_string())
        );
        assert!(IdType::from_name("biginteger").accepts("9000"));
    }

    #[test]
    fn test_detect_uuid_from_string_and_binary() {
        for column_type in [ColumnType::String, ColumnType::Binary] {
            let schema = TableSchema::new("Post")
                .with_primary_key("id")
                .with_column("id", column_type, Some(36));
            assert_eq!(detect_id_type(&schema), Some(IdType::Uuid));
        }
    }

    #[test]
    fn test_detect_integer() {
        let schema = TableSchema::new("Post")
            .with_primary_key("id")
            .with_column("id", ColumnType::Integer, None);
        assert_eq!(detect_id_type(&schema), Some(IdType::Integer));
    }

    #[test]
    fn test_detect_inconclusive() {
        let short_string = TableSchema::new("Post")
            .with_primary_key("slug")
            .with_column("slug", ColumnType::String, Some(64));
        assert_eq!(detect_id_type(&short_string), None);

        let no_pk = TableSchema::new("Post");
        assert_eq!(detect_id_type(&no_pk), None);
    }
}
