//! Model schema lookup
//!
//! CRUD actions never talk to the persistence layer directly. They only need
//! to know the model's name (for flash messages) and the declared type of its
//! primary key column (for ID validation). [`ModelSchema`] is that seam;
//! [`TableSchema`] is a small in-memory implementation for services that
//! describe their tables by hand.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Fixed or variable length character data
    String,
    /// Raw bytes
    Binary,
    /// Integer
    Integer,
    /// Large integer
    BigInteger,
    /// Native UUID column
    Uuid,
    /// Free text
    Text,
    /// Boolean
    Boolean,
    /// Date and/or time
    Datetime,
    /// Any other declared type
    Other(String),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Binary => write!(f, "binary"),
            Self::Integer => write!(f, "integer"),
            Self::BigInteger => write!(f, "biginteger"),
            Self::Uuid => write!(f, "uuid"),
            Self::Text => write!(f, "text"),
            Self::Boolean => write!(f, "boolean"),
            Self::Datetime => write!(f, "datetime"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Metadata for a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Declared type
    pub column_type: ColumnType,
    /// Declared length, when the type has one
    #[serde(default)]
    pub length: Option<u32>,
}

impl ColumnSchema {
    /// Create column metadata
    #[must_use]
    pub fn new(column_type: ColumnType, length: Option<u32>) -> Self {
        Self {
            column_type,
            length,
        }
    }
}

/// Schema introspection needed by CRUD actions
pub trait ModelSchema: fmt::Debug + Send + Sync {
    /// Model (class) name, e.g. `BlogPost`
    fn name(&self) -> &str;

    /// Name of the primary key column, if the model has a single one
    fn primary_key(&self) -> Option<&str>;

    /// Metadata for a column
    fn column(&self, name: &str) -> Option<ColumnSchema>;

    /// Metadata for the primary key column
    fn primary_key_column(&self) -> Option<ColumnSchema> {
        self.primary_key().and_then(|pk| self.column(pk))
    }
}

/// In-memory table description
///
/// # Example
///
/// ```rust
/// use crud_actions::model::{ColumnType, ModelSchema, TableSchema};
///
/// let posts = TableSchema::new("BlogPost")
///     .with_primary_key("id")
///     .with_column("id", ColumnType::String, Some(36))
///     .with_column("title", ColumnType::String, Some(255));
///
/// assert_eq!(posts.primary_key(), Some("id"));
/// assert_eq!(posts.primary_key_column().unwrap().length, Some(36));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    primary_key: Option<String>,
    columns: HashMap<String, ColumnSchema>,
}

impl TableSchema {
    /// Describe a table for the given model name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the primary key column
    #[must_use]
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// Add a column
    #[must_use]
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column_type: ColumnType,
        length: Option<u32>,
    ) -> Self {
        self.columns
            .insert(name.into(), ColumnSchema::new(column_type, length));
        self
    }
}

impl ModelSchema for TableSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    fn column(&self, name: &str) -> Option<ColumnSchema> {
        self.columns.get(name).cloned()
    }
}
