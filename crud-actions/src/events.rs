//! Events emitted while a CRUD action runs
//!
//! Listeners receive the event mutably and may rewrite its payload: change
//! the arguments an action is called with, replace a redirect target, or
//! reword a flash message before it is stored.
//!
//! # Example
//!
//! ```rust
//! use crud_actions::events::{CrudEvent, EventKind, EventManager, RedirectEvent};
//! use crud_actions::redirect::RedirectTarget;
//!
//! let mut events = EventManager::new();
//! events.on(EventKind::BeforeRedirect, |event| {
//!     if let CrudEvent::BeforeRedirect(redirect) = event {
//!         redirect.url = RedirectTarget::url("/dashboard");
//!     }
//! });
//!
//! let mut event = CrudEvent::BeforeRedirect(RedirectEvent { url: RedirectTarget::index() });
//! events.trigger(&mut event);
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::redirect::RedirectTarget;

/// Which event is being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Before the dispatcher offers a request to its actions
    BeforeHandle,
    /// An identifier failed validation
    InvalidId,
    /// A redirect target is about to be used
    BeforeRedirect,
    /// A flash message is about to be stored
    SetFlash,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeHandle => write!(f, "Crud.beforeHandle"),
            Self::InvalidId => write!(f, "Crud.invalidId"),
            Self::BeforeRedirect => write!(f, "Crud.beforeRedirect"),
            Self::SetFlash => write!(f, "Crud.setFlash"),
        }
    }
}

/// Payload of [`EventKind::BeforeHandle`]
#[derive(Debug, Clone, PartialEq)]
pub struct HandleEvent {
    /// Controller action being dispatched
    pub action: String,
    /// Positional arguments the action will receive
    pub args: Vec<String>,
}

/// Payload of [`EventKind::InvalidId`]
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidIdEvent {
    /// The rejected identifier
    pub id: String,
}

/// Payload of [`EventKind::BeforeRedirect`]
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectEvent {
    /// Final redirect target
    pub url: RedirectTarget,
}

/// Payload of [`EventKind::SetFlash`]
#[derive(Debug, Clone, PartialEq)]
pub struct FlashEvent {
    /// Translated message text
    pub message: String,
    /// Element used to render the message
    pub element: String,
    /// Element parameters
    pub params: Map<String, Value>,
    /// Storage key
    pub key: String,
    /// Flash type, e.g. `invalidId` or `success`
    pub flash_type: String,
    /// Resource name substituted into the text
    pub name: String,
}

/// An event and its mutable payload
#[derive(Debug, Clone, PartialEq)]
pub enum CrudEvent {
    /// See [`EventKind::BeforeHandle`]
    BeforeHandle(HandleEvent),
    /// See [`EventKind::InvalidId`]
    InvalidId(InvalidIdEvent),
    /// See [`EventKind::BeforeRedirect`]
    BeforeRedirect(RedirectEvent),
    /// See [`EventKind::SetFlash`]
    SetFlash(FlashEvent),
}

impl CrudEvent {
    /// Kind of this event
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::BeforeHandle(_) => EventKind::BeforeHandle,
            Self::InvalidId(_) => EventKind::InvalidId,
            Self::BeforeRedirect(_) => EventKind::BeforeRedirect,
            Self::SetFlash(_) => EventKind::SetFlash,
        }
    }
}

/// Event listener
pub type Listener = Box<dyn Fn(&mut CrudEvent) + Send + Sync>;

/// Registry of listeners per event kind
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<EventKind, Vec<Listener>>,
}

impl EventManager {
    /// Create a manager without listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; listeners run in registration order
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: Fn(&mut CrudEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(kind)
            .or_default()
            .push(Box::new(listener));
        self
    }

    /// Number of listeners for a kind
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Run every listener registered for the event's kind
    pub fn trigger(&self, event: &mut CrudEvent) {
        let kind = event.kind();
        let Some(listeners) = self.listeners.get(&kind) else {
            tracing::trace!(event = %kind, "No listeners");
            return;
        };

        tracing::debug!(event = %kind, listeners = listeners.len(), "Triggering event");
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(String, usize)> = self
            .listeners
            .iter()
            .map(|(kind, listeners)| (kind.to_string(), listeners.len()))
            .collect();
        counts.sort();
        f.debug_struct("EventManager")
            .field("listeners", &counts)
            .finish()
    }
}
