//! Flash messages set by CRUD actions
//!
//! Flash messages are one-time notifications shown on the next page view,
//! typically after a redirect ("Invalid id", "Successfully created Article").
//! Actions hand finished messages to a [`FlashStore`]; where they are kept
//! (a session, a cookie, a test buffer) is the store's business.
//!
//! # Example
//!
//! ```rust
//! use crud_actions::flash::{FlashBag, FlashKind, FlashMessage, FlashStore};
//!
//! let mut bag = FlashBag::new();
//! bag.set(FlashMessage::error("Invalid id"));
//! assert!(bag.has_errors());
//! assert_eq!(bag.by_kind(FlashKind::Error).len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default element used to render a flash message
pub const DEFAULT_ELEMENT: &str = "default";

/// Default key flash messages are stored under
pub const DEFAULT_KEY: &str = "flash";

/// Flash message severity/type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    /// Success message (e.g., "Item saved successfully")
    Success,
    /// Informational message
    Info,
    /// Warning message
    Warning,
    /// Error message (e.g., "Invalid id")
    Error,
}

impl FlashKind {
    /// Kind for a CRUD flash type
    ///
    /// `success` maps to success, `info`/`warning` to themselves, and every
    /// other type (`error`, `invalidId`, ...) is an error.
    #[must_use]
    pub fn from_flash_type(flash_type: &str) -> Self {
        match flash_type {
            "success" => Self::Success,
            "info" => Self::Info,
            "warning" => Self::Warning,
            _ => Self::Error,
        }
    }

    /// Returns the CSS class name for this flash kind.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "flash-success",
            Self::Info => "flash-info",
            Self::Warning => "flash-warning",
            Self::Error => "flash-error",
        }
    }
}

/// A single flash message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// The type/severity of the message.
    pub kind: FlashKind,
    /// The message content.
    pub message: String,
    /// Element (template) used to render the message.
    pub element: String,
    /// Extra parameters for the element.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Key the message is stored under.
    pub key: String,
}

impl FlashMessage {
    /// Create a new flash message with default element and key.
    #[must_use]
    pub fn new(kind: FlashKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            element: DEFAULT_ELEMENT.to_string(),
            params: Map::new(),
            key: DEFAULT_KEY.to_string(),
        }
    }

    /// Create a success flash message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Success, message)
    }

    /// Create an error flash message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashKind::Error, message)
    }
}

/// Destination for flash messages
pub trait FlashStore: Send {
    /// Store a message for the next page view
    fn set(&mut self, message: FlashMessage);
}

/// In-memory flash store
#[derive(Debug, Clone, Default)]
pub struct FlashBag {
    messages: Vec<FlashMessage>,
}

impl FlashBag {
    /// Create an empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all flash messages.
    #[must_use]
    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    /// Take ownership of all flash messages, leaving the bag empty.
    pub fn take(&mut self) -> Vec<FlashMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Check if there are any flash messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get the number of flash messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Get messages of a specific kind.
    #[must_use]
    pub fn by_kind(&self, kind: FlashKind) -> Vec<&FlashMessage> {
        self.messages.iter().filter(|m| m.kind == kind).collect()
    }

    /// Messages stored under a key
    #[must_use]
    pub fn by_key(&self, key: &str) -> Vec<&FlashMessage> {
        self.messages.iter().filter(|m| m.key == key).collect()
    }

    /// Check if there are any error messages.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.kind == FlashKind::Error)
    }
}

impl FlashStore for FlashBag {
    fn set(&mut self, message: FlashMessage) {
        self.messages.push(message);
    }
}

/// Localization hook for flash texts
pub trait Translator: Send + Sync {
    /// Translate `text` within a message domain
    fn translate(&self, domain: &str, text: &str) -> String;
}

/// Translator returning texts unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, _domain: &str, text: &str) -> String {
        text.to_string()
    }
}

/// Human readable form of a model name: `BlogPost` becomes `Blog Post`,
/// `blog_posts` becomes `Blog Posts`
#[must_use]
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| upper_first(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character
#[must_use]
pub fn upper_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
