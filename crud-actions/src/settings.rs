//! Dotted-path settings tree
//!
//! Every CRUD action keeps its configuration in a [`Settings`] tree: string
//! keys mapping to JSON values, where nested objects are addressed with dotted
//! paths such as `messages.invalidId.text`.
//!
//! Two merge modes exist and they do not agree on precedence:
//!
//! - [`Settings::merge_missing`] and [`Settings::merge_preserving`] keep what is
//!   already stored and only fill gaps from the incoming mapping.
//! - [`Settings::overlay`] lets incoming leaves win. It is used when layering
//!   configuration files over built-in defaults.
//!
//! # Example
//!
//! ```rust
//! use crud_actions::settings::Settings;
//! use serde_json::json;
//!
//! let mut settings = Settings::new();
//! settings.insert("messages.invalidId.text", json!("Invalid id"));
//! assert_eq!(settings.get("messages.invalidId.text"), Some(&json!("Invalid id")));
//! assert_eq!(settings.get("messages.missing"), None);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// String-keyed tree of nested configuration values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(Map<String, Value>);

impl Settings {
    /// Create an empty settings tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the whole tree
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the tree
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Value at a dotted path, or `None` when any segment is missing
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// String value at a dotted path
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Whether a value exists at a dotted path
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Write a value at a dotted path, creating intermediate objects
    ///
    /// An intermediate segment holding a non-object value is replaced by an
    /// empty object.
    pub fn insert(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.0;
        for segment in segments {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            current = match slot {
                Value::Object(map) => map,
                _ => unreachable!("slot was just made an object"),
            };
        }
        current.insert(last.to_string(), value);
    }

    /// Remove the value at a dotted path
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let last = segments.pop()?;

        let mut current = &mut self.0;
        for segment in segments {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
        current.remove(last)
    }

    /// Shallow merge where keys already present win
    pub fn merge_missing(&mut self, incoming: Map<String, Value>) {
        for (key, value) in incoming {
            self.0.entry(key).or_insert(value);
        }
    }

    /// Deep merge an object into the value at `path`, keeping existing leaves
    ///
    /// The incoming object only fills gaps: a leaf already stored under `path`
    /// is never replaced. When nothing (or a non-object) is stored at `path`,
    /// the incoming object is written as is.
    pub fn merge_preserving(&mut self, path: &str, incoming: Map<String, Value>) {
        let merged = match self.get(path) {
            Some(Value::Object(existing)) => {
                let mut merged = existing.clone();
                fill_gaps(&mut merged, incoming);
                merged
            }
            _ => incoming,
        };
        self.insert(path, Value::Object(merged));
    }

    /// Deep merge where incoming leaves win
    pub fn overlay(&mut self, incoming: Map<String, Value>) {
        overlay_into(&mut self.0, incoming);
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn fill_gaps(existing: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        let value = match (existing.get_mut(&key), value) {
            (Some(Value::Object(current)), Value::Object(nested)) => {
                fill_gaps(current, nested);
                continue;
            }
            (Some(_), _) => continue,
            (None, value) => value,
        };
        existing.insert(key, value);
    }
}

fn overlay_into(existing: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        let value = match (existing.get_mut(&key), value) {
            (Some(Value::Object(current)), Value::Object(nested)) => {
                overlay_into(current, nested);
                continue;
            }
            (_, value) => value,
        };
        existing.insert(key, value);
    }
}
