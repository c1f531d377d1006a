//! Offers a request to a controller's CRUD actions in turn
//!
//! The dispatcher owns the actions mapped for a controller and the event
//! listeners shared by them. [`CrudDispatcher::dispatch`] triggers
//! `Crud.beforeHandle`, then offers the subject to each action in the order it
//! was added until one takes it.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut dispatcher = CrudDispatcher::new()
//!     .with_action(ViewAction::new())
//!     .with_action(DeleteAction::new());
//! dispatcher.apply_config(&CrudConfig::load()?);
//! dispatcher.disable("delete")?;
//!
//! let mut flash = FlashBag::new();
//! let outcome = dispatcher.dispatch(subject, &mut flash, &PathRedirector::default())?;
//! ```

use std::fmt;

use crate::action::{ActionContext, ActionOutcome, CrudAction};
use crate::config::CrudConfig;
use crate::error::{Error, Result};
use crate::events::{CrudEvent, EventKind, EventManager, HandleEvent};
use crate::flash::{FlashStore, IdentityTranslator, Translator};
use crate::redirect::Redirector;
use crate::subject::Subject;

/// Ordered CRUD actions of one controller
pub struct CrudDispatcher {
    actions: Vec<Box<dyn CrudAction>>,
    events: EventManager,
    translator: Box<dyn Translator>,
}

impl CrudDispatcher {
    /// Dispatcher without actions or listeners
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
            events: EventManager::new(),
            translator: Box::new(IdentityTranslator),
        }
    }

    /// Add an action; it is offered requests after those added before it
    pub fn add_action(&mut self, action: impl CrudAction + 'static) -> &mut Self {
        tracing::debug!(action = %action.base().handle_action(), "Mapping action");
        self.actions.push(Box::new(action));
        self
    }

    /// Builder form of [`add_action`](Self::add_action)
    #[must_use]
    pub fn with_action(mut self, action: impl CrudAction + 'static) -> Self {
        self.add_action(action);
        self
    }

    /// Translator used for flash texts
    #[must_use]
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Action handling `name`
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&dyn CrudAction> {
        self.actions
            .iter()
            .find(|action| action.base().handle_action() == name)
            .map(|action| action.as_ref())
    }

    /// Action handling `name`, mutably
    pub fn action_mut(&mut self, name: &str) -> Option<&mut (dyn CrudAction + 'static)> {
        self.actions
            .iter_mut()
            .find(|action| action.base().handle_action() == name)
            .map(|action| action.as_mut())
    }

    /// Whether an action handles `name`
    #[must_use]
    pub fn is_action_mapped(&self, name: &str) -> bool {
        self.action(name).is_some()
    }

    /// Handle names of the mapped actions, in offer order
    #[must_use]
    pub fn action_names(&self) -> Vec<&str> {
        self.actions
            .iter()
            .map(|action| action.base().handle_action())
            .collect()
    }

    /// Enable the action handling `name`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] if no action handles `name`.
    pub fn enable(&mut self, name: &str) -> Result<()> {
        self.action_mut(name)
            .ok_or_else(|| Error::UnknownAction(name.to_string()))?
            .base_mut()
            .enable();
        Ok(())
    }

    /// Disable the action handling `name`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] if no action handles `name`.
    pub fn disable(&mut self, name: &str) -> Result<()> {
        self.action_mut(name)
            .ok_or_else(|| Error::UnknownAction(name.to_string()))?
            .base_mut()
            .disable();
        Ok(())
    }

    /// Register an event listener shared by all actions
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> &mut Self
    where
        F: Fn(&mut CrudEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, listener);
        self
    }

    /// Registered listeners
    #[must_use]
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Layer each `[actions.<name>]` table over the matching action's settings
    ///
    /// Configured values win over the action's defaults. Tables naming no
    /// mapped action are skipped.
    pub fn apply_config(&mut self, config: &CrudConfig) {
        for (name, settings) in &config.actions {
            match self.action_mut(name) {
                Some(action) => {
                    action.base_mut().overlay_config(settings.clone());
                }
                None => {
                    tracing::warn!(action = %name, "Configured action is not mapped; skipping");
                }
            }
        }
    }

    /// Offer a request to the mapped actions
    ///
    /// `Crud.beforeHandle` listeners may rewrite the arguments first. Returns
    /// the first [`ActionOutcome::Handled`], or
    /// [`ActionOutcome::NotApplicable`] when every action declines.
    ///
    /// # Errors
    ///
    /// Propagates errors from the action that took the request.
    pub fn dispatch(
        &mut self,
        mut subject: Subject,
        flash: &mut dyn FlashStore,
        redirector: &dyn Redirector,
    ) -> Result<ActionOutcome> {
        let mut event = CrudEvent::BeforeHandle(HandleEvent {
            action: subject.action.clone(),
            args: subject.args.clone(),
        });
        self.events.trigger(&mut event);
        if let CrudEvent::BeforeHandle(handle) = event {
            subject.args = handle.args;
        }

        let mut ctx = ActionContext::new(&self.events, flash, redirector)
            .with_translator(self.translator.as_ref());

        for action in &mut self.actions {
            if let ActionOutcome::Handled(response) = action.handle(&subject, &mut ctx)? {
                tracing::debug!(
                    controller = %subject.controller,
                    action = %subject.action,
                    status = %response.status(),
                    "Request handled"
                );
                return Ok(ActionOutcome::Handled(response));
            }
        }

        tracing::debug!(
            controller = %subject.controller,
            action = %subject.action,
            "No action took the request"
        );
        Ok(ActionOutcome::NotApplicable)
    }
}

impl Default for CrudDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CrudDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudDispatcher")
            .field("actions", &self.action_names())
            .field("events", &self.events)
            .finish()
    }
}
