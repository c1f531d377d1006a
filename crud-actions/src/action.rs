//! CRUD action trait and shared action state
//!
//! Every CRUD action (index, view, add, edit, delete, or your own) implements
//! [`CrudAction`] and embeds an [`ActionBase`]. The base holds the action's
//! settings and provides the shared behaviour: enable/disable, ID validation,
//! flash messages and redirects.
//!
//! # Overview
//!
//! - [`CrudAction::handle`] decides whether the action takes the request.
//!   It declines with [`ActionOutcome::NotApplicable`] when the action is
//!   disabled or the requested controller action is not its `handleAction`,
//!   so many actions can be offered the same request in turn.
//! - [`CrudAction::handle_request`] is the per-action hook doing the work.
//! - [`ActionContext`] carries the collaborators (events, flash store,
//!   redirector, translator) into every call.
//!
//! # Example
//!
//! ```rust
//! use axum::response::{IntoResponse, Response};
//! use crud_actions::prelude::*;
//!
//! struct ViewAction {
//!     base: ActionBase,
//! }
//!
//! impl CrudAction for ViewAction {
//!     fn base(&self) -> &ActionBase {
//!         &self.base
//!     }
//!
//!     fn base_mut(&mut self) -> &mut ActionBase {
//!         &mut self.base
//!     }
//!
//!     fn handle_request(
//!         &mut self,
//!         args: &[String],
//!         subject: &Subject,
//!         ctx: &mut ActionContext<'_>,
//!     ) -> Result<Response> {
//!         let id = args.first().cloned().unwrap_or_default();
//!         if let IdCheck::Rejected(redirect) = self.base.validate_id(&id, subject, ctx)? {
//!             return Ok(redirect);
//!         }
//!         Ok(format!("article {id}").into_response())
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};
use crate::events::{CrudEvent, EventManager, FlashEvent, InvalidIdEvent, RedirectEvent};
use crate::flash::{
    humanize, upper_first, FlashKind, FlashMessage, FlashStore, IdentityTranslator, Translator,
    DEFAULT_ELEMENT, DEFAULT_KEY,
};
use crate::model::ModelSchema;
use crate::redirect::{RedirectTarget, Redirector};
use crate::request::RequestContext;
use crate::settings::Settings;
use crate::subject::Subject;
use crate::validation::{detect_id_type, IdType};

/// Message domain used for translation when `messages.domain` is not set
pub const DEFAULT_MESSAGE_DOMAIN: &str = "crud";

/// Flash type emitted when an identifier fails validation
pub const INVALID_ID_FLASH: &str = "invalidId";

/// Result of offering a request to an action
pub enum ActionOutcome {
    /// The action took the request and produced a response
    Handled(Response),
    /// The action declined; the next action may take the request
    NotApplicable,
}

impl ActionOutcome {
    /// Whether an action took the request
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The response, if handled
    #[must_use]
    pub fn into_handled(self) -> Option<Response> {
        match self {
            Self::Handled(response) => Some(response),
            Self::NotApplicable => None,
        }
    }
}

impl fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handled(response) => f
                .debug_tuple("Handled")
                .field(&response.status())
                .finish(),
            Self::NotApplicable => write!(f, "NotApplicable"),
        }
    }
}

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Handled(response) => response,
            Self::NotApplicable => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

/// Result of [`ActionBase::validate_id`]
pub enum IdCheck {
    /// The identifier has the expected shape
    Valid,
    /// The identifier was rejected; the flash message is set and the caller
    /// must return this redirect without doing further work
    Rejected(Response),
}

impl IdCheck {
    /// Whether the identifier passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Debug for IdCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "Valid"),
            Self::Rejected(response) => f
                .debug_tuple("Rejected")
                .field(&response.status())
                .finish(),
        }
    }
}

/// How identifiers are validated, read from the `validateId` setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidation {
    /// Infer the type from the model's primary key (`null`, `true` or unset)
    Detect,
    /// Do not validate (`false`)
    Disabled,
    /// Validate against a fixed type (a type name such as `"uuid"`)
    Type(IdType),
}

impl IdValidation {
    fn from_setting(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(false)) => Self::Disabled,
            Some(Value::String(name)) => Self::Type(IdType::from_name(name)),
            _ => Self::Detect,
        }
    }

    fn to_setting(&self) -> Value {
        match self {
            Self::Detect => Value::Null,
            Self::Disabled => Value::Bool(false),
            Self::Type(id_type) => Value::String(id_type.to_string()),
        }
    }
}

/// Collaborators available to an action during one dispatch
pub struct ActionContext<'a> {
    /// Event listeners
    pub events: &'a EventManager,
    /// Flash message destination
    pub flash: &'a mut dyn FlashStore,
    /// Builds redirect responses
    pub redirector: &'a dyn Redirector,
    /// Translates flash texts
    pub translator: &'a dyn Translator,
}

impl<'a> ActionContext<'a> {
    /// Context with the identity translator
    pub fn new(
        events: &'a EventManager,
        flash: &'a mut dyn FlashStore,
        redirector: &'a dyn Redirector,
    ) -> Self {
        Self {
            events,
            flash,
            redirector,
            translator: &IdentityTranslator,
        }
    }

    /// Use a different translator
    #[must_use]
    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = translator;
        self
    }
}

/// Settings and shared behaviour of a CRUD action
#[derive(Debug, Clone)]
pub struct ActionBase {
    handle_action: String,
    settings: Settings,
    model: Option<Arc<dyn ModelSchema>>,
}

impl ActionBase {
    /// Base for the action handling the controller action `handle_action`
    ///
    /// The action starts enabled, with `handleAction` recorded in its settings
    /// and an `invalidId` flash text.
    #[must_use]
    pub fn new(handle_action: impl Into<String>) -> Self {
        let handle_action = handle_action.into();
        let mut settings = Settings::new();
        settings.insert("handleAction", Value::String(handle_action.clone()));
        settings.insert("enabled", Value::Bool(true));
        settings.insert(
            "messages",
            json!({ INVALID_ID_FLASH: { "text": "Invalid id" } }),
        );

        Self {
            handle_action,
            settings,
            model: None,
        }
    }

    /// Controller action this action handles
    #[must_use]
    pub fn handle_action(&self) -> &str {
        &self.handle_action
    }

    /// The whole settings tree
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Setting at a dotted path
    #[must_use]
    pub fn config(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Add top-level settings that are not set yet; existing keys win
    pub fn merge_config(&mut self, settings: Map<String, Value>) -> &mut Self {
        self.settings.merge_missing(settings);
        self
    }

    /// Write a setting at a dotted path
    ///
    /// Objects are merged into what is already stored under `key`, and stored
    /// leaves win over incoming ones. Any other value replaces the stored one.
    ///
    /// `handleAction` is fixed at construction and cannot be rewritten.
    pub fn set_config(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        match value.into() {
            Value::Object(map) => self.settings.merge_preserving(key, map),
            value => self.settings.insert(key, value),
        }
        self.pin_handle_action();
        self
    }

    /// Layer settings over the current ones; incoming leaves win
    ///
    /// `handleAction` is fixed at construction and cannot be rewritten.
    pub fn overlay_config(&mut self, settings: Map<String, Value>) -> &mut Self {
        self.settings.overlay(settings);
        self.pin_handle_action();
        self
    }

    fn pin_handle_action(&mut self) {
        if self.settings.get_str("handleAction") != Some(self.handle_action.as_str()) {
            tracing::warn!(action = %self.handle_action, "Ignoring write to handleAction");
            self.settings
                .insert("handleAction", Value::String(self.handle_action.clone()));
        }
    }

    /// Enable the action, returning the value written
    pub fn enable(&mut self) -> bool {
        self.settings.insert("enabled", Value::Bool(true));
        true
    }

    /// Disable the action, returning the value written
    pub fn disable(&mut self) -> bool {
        self.settings.insert("enabled", Value::Bool(false));
        false
    }

    /// Whether the action takes requests
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.settings
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Finder used to load records
    #[must_use]
    pub fn find_method(&self) -> Option<&str> {
        self.settings.get_str("findMethod")
    }

    /// Set the finder used to load records
    pub fn set_find_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.settings.insert("findMethod", Value::String(method.into()));
        self
    }

    /// Options passed when saving records
    #[must_use]
    pub fn save_options(&self) -> Option<&Value> {
        self.settings.get("saveOptions")
    }

    /// Set the options passed when saving records
    pub fn set_save_options(&mut self, options: impl Into<Value>) -> &mut Self {
        self.set_config("saveOptions", options)
    }

    /// View to render; defaults to the handled action's name
    #[must_use]
    pub fn view(&self) -> &str {
        self.settings
            .get_str("view")
            .unwrap_or(&self.handle_action)
    }

    /// Set the view to render
    pub fn set_view(&mut self, view: impl Into<String>) -> &mut Self {
        self.settings.insert("view", Value::String(view.into()));
        self
    }

    /// How identifiers are validated
    #[must_use]
    pub fn id_validation(&self) -> IdValidation {
        IdValidation::from_setting(self.settings.get("validateId"))
    }

    /// Set how identifiers are validated
    pub fn set_id_validation(&mut self, validation: IdValidation) -> &mut Self {
        self.settings.insert("validateId", validation.to_setting());
        self
    }

    /// Model captured from the last handled subject
    #[must_use]
    pub fn model(&self) -> Option<&Arc<dyn ModelSchema>> {
        self.model.as_ref()
    }

    /// Bind the model used for schema lookups and resource naming
    pub fn bind_model(&mut self, model: Option<Arc<dyn ModelSchema>>) {
        self.model = model;
    }

    /// First positional route parameter
    #[must_use]
    pub fn id_from_request<'r>(&self, request: &'r RequestContext) -> Option<&'r str> {
        request.pass().first().map(String::as_str)
    }

    /// Human readable resource name used in flash texts
    ///
    /// Taken from the `name` setting, else derived from the model name and
    /// remembered in `name`. Without either the name is empty.
    pub fn resource_name(&mut self) -> String {
        if let Some(name) = self.settings.get_str("name") {
            return name.to_string();
        }

        match self.model.as_deref() {
            Some(model) => {
                let name = humanize(model.name());
                self.settings.insert("name", Value::String(name.clone()));
                name
            }
            None => {
                tracing::debug!(action = %self.handle_action, "No model bound; resource name is empty");
                String::new()
            }
        }
    }

    /// Infer the identifier type from the bound model's primary key
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingModel`] when no model is bound. This is a wiring
    /// mistake and should not be retried.
    pub fn detect_primary_key_type(&self) -> Result<Option<IdType>> {
        let model = self.model.as_deref().ok_or_else(|| Error::MissingModel {
            action: self.handle_action.clone(),
        })?;
        Ok(detect_id_type(model))
    }

    /// Check that `id` has the shape of the model's primary key
    ///
    /// The expected type comes from the `validateId` setting, or is detected
    /// from the primary key. When no type can be determined the id is
    /// accepted. A rejected id triggers `Crud.invalidId`, sets the `invalidId`
    /// flash message and redirects to the referring page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingModel`] when detection is needed and no model is
    /// bound, and [`Error::MissingFlashText`] when the `invalidId` flash text
    /// was removed from the settings.
    pub fn validate_id(
        &mut self,
        id: &str,
        subject: &Subject,
        ctx: &mut ActionContext<'_>,
    ) -> Result<IdCheck> {
        let id_type = match self.id_validation() {
            IdValidation::Disabled => None,
            IdValidation::Type(id_type) => Some(id_type),
            IdValidation::Detect => self.detect_primary_key_type()?,
        };

        let Some(id_type) = id_type else {
            tracing::debug!(action = %self.handle_action, "No id type known; accepting id");
            return Ok(IdCheck::Valid);
        };

        if id_type.accepts(id) {
            return Ok(IdCheck::Valid);
        }

        tracing::warn!(action = %self.handle_action, id, %id_type, "Rejected invalid id");
        ctx.events
            .trigger(&mut CrudEvent::InvalidId(InvalidIdEvent { id: id.to_string() }));
        self.set_flash(INVALID_ID_FLASH, ctx)?;

        let referer = RedirectTarget::url(subject.request.referer().unwrap_or("/"));
        Ok(IdCheck::Rejected(self.redirect(subject, ctx, Some(referer))))
    }

    /// Redirect the client
    ///
    /// The target is, in order of precedence: the `redirect_url` body field,
    /// the `redirect_url` query parameter, `url`, and the `index` action.
    /// `Crud.beforeRedirect` listeners may replace the target.
    pub fn redirect(
        &self,
        subject: &Subject,
        ctx: &ActionContext<'_>,
        url: Option<RedirectTarget>,
    ) -> Response {
        let target = match subject.request.redirect_override() {
            Some(requested) => RedirectTarget::url(requested),
            None => url.unwrap_or_default(),
        };

        let mut event = CrudEvent::BeforeRedirect(RedirectEvent {
            url: target.clone(),
        });
        ctx.events.trigger(&mut event);
        let target = match event {
            CrudEvent::BeforeRedirect(redirect) => redirect.url,
            other => {
                tracing::warn!(event = %other.kind(), "beforeRedirect listener replaced the event; ignoring");
                target
            }
        };

        ctx.redirector.redirect(&target, &subject.controller)
    }

    /// Store the flash message configured under `messages.<flash_type>`
    ///
    /// `{name}` in the text is replaced by the resource name. The text is
    /// translated in the `messages.domain` domain, then `Crud.setFlash`
    /// listeners may rewrite every part of the message before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFlashText`] when the flash type has no `text`.
    pub fn set_flash(&mut self, flash_type: &str, ctx: &mut ActionContext<'_>) -> Result<()> {
        let name = self.resource_name();
        let config = self
            .settings
            .get(&format!("messages.{flash_type}"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let text = config
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingFlashText {
                action: self.handle_action.clone(),
                flash_type: flash_type.to_string(),
            })?;
        let element = config
            .get("element")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ELEMENT);
        let key = config
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_KEY);

        let mut params = config
            .get("params")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let class = params
            .get("class")
            .and_then(Value::as_str)
            .unwrap_or("message")
            .to_string();
        let original = upper_first(&text.replace("{name}", &name));
        params.insert("class".to_string(), Value::String(format!("{class} {flash_type}")));
        params.insert("original".to_string(), Value::String(original.clone()));

        let domain = self
            .settings
            .get_str("messages.domain")
            .unwrap_or(DEFAULT_MESSAGE_DOMAIN);
        let payload = FlashEvent {
            message: ctx.translator.translate(domain, &original),
            element: element.to_string(),
            params,
            key: key.to_string(),
            flash_type: flash_type.to_string(),
            name,
        };

        let mut event = CrudEvent::SetFlash(payload.clone());
        ctx.events.trigger(&mut event);
        let flash = match event {
            CrudEvent::SetFlash(flash) => flash,
            other => {
                tracing::warn!(event = %other.kind(), "setFlash listener replaced the event; ignoring");
                payload
            }
        };

        ctx.flash.set(FlashMessage {
            kind: FlashKind::from_flash_type(&flash.flash_type),
            message: flash.message,
            element: flash.element,
            params: flash.params,
            key: flash.key,
        });
        Ok(())
    }
}

/// A CRUD action
///
/// Implementors provide access to their [`ActionBase`] and the per-action
/// [`handle_request`](CrudAction::handle_request) hook. The provided
/// [`handle`](CrudAction::handle) decides whether the hook runs at all.
pub trait CrudAction: Send {
    /// Shared action state
    fn base(&self) -> &ActionBase;

    /// Shared action state, mutably
    fn base_mut(&mut self) -> &mut ActionBase;

    /// Do the action's work
    ///
    /// `args` are the subject's positional arguments.
    fn handle_request(
        &mut self,
        args: &[String],
        subject: &Subject,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Response>;

    /// Offer a request to this action
    ///
    /// Declines when the action is disabled or `subject.action` is not the
    /// action's `handleAction`. Otherwise the subject's model is bound and
    /// [`handle_request`](CrudAction::handle_request) runs with the subject's
    /// arguments.
    fn handle(&mut self, subject: &Subject, ctx: &mut ActionContext<'_>) -> Result<ActionOutcome> {
        let base = self.base_mut();
        if !base.is_enabled() {
            tracing::debug!(action = %base.handle_action(), "Action disabled; declining");
            return Ok(ActionOutcome::NotApplicable);
        }
        if subject.action != base.handle_action() {
            tracing::trace!(
                action = %base.handle_action(),
                requested = %subject.action,
                "Action not addressed; declining"
            );
            return Ok(ActionOutcome::NotApplicable);
        }

        base.bind_model(subject.model.clone());
        self.handle_request(&subject.args, subject, ctx)
            .map(ActionOutcome::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::flash::FlashBag;
    use crate::model::{ColumnType, TableSchema};
    use crate::redirect::{PathRedirector, RouteSpec};
    use axum::http::header;
    use std::sync::Mutex;

    struct RecordingAction {
        base: ActionBase,
        calls: Vec<Vec<String>>,
    }

    impl RecordingAction {
        fn new(handle_action: &str) -> Self {
            Self {
                base: ActionBase::new(handle_action),
                calls: Vec::new(),
            }
        }
    }

    impl CrudAction for RecordingAction {
        fn base(&self) -> &ActionBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut ActionBase {
            &mut self.base
        }

        fn handle_request(
            &mut self,
            args: &[String],
            _subject: &Subject,
            _ctx: &mut ActionContext<'_>,
        ) -> Result<Response> {
            self.calls.push(args.to_vec());
            Ok(StatusCode::OK.into_response())
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn integer_posts() -> Arc<dyn ModelSchema> {
        Arc::new(
            TableSchema::new("BlogPost")
                .with_primary_key("id")
                .with_column("id", ColumnType::Integer, Some(11)),
        )
    }

    fn uuid_posts() -> Arc<dyn ModelSchema> {
        Arc::new(
            TableSchema::new("BlogPost")
                .with_primary_key("id")
                .with_column("id", ColumnType::String, Some(36)),
        )
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[test]
    fn test_new_records_handle_action() {
        let base = ActionBase::new("delete");
        assert_eq!(base.handle_action(), "delete");
        assert_eq!(base.config("handleAction"), Some(&json!("delete")));
        assert!(base.is_enabled());
    }

    #[test]
    fn test_config_write_then_read() {
        let mut base = ActionBase::new("index");
        base.set_config("paginate.limit", 25)
            .set_config("scope", "published");
        assert_eq!(base.config("paginate.limit"), Some(&json!(25)));
        assert_eq!(base.config("scope"), Some(&json!("published")));
        assert_eq!(base.config("missing"), None);
        assert!(base.settings().contains("paginate"));
    }

    #[test]
    fn test_merge_config_keeps_existing_keys() {
        let mut base = ActionBase::new("index");
        base.set_find_method("published");
        base.merge_config(object(json!({"findMethod": "all", "view": "grid"})));
        assert_eq!(base.find_method(), Some("published"));
        assert_eq!(base.view(), "grid");
    }

    #[test]
    fn test_set_config_object_keeps_existing_leaves() {
        let mut base = ActionBase::new("add");
        base.set_config("messages.success", json!({"text": "Saved {name}"}));
        base.set_config(
            "messages.success",
            json!({"text": "Replaced", "element": "toast"}),
        );
        assert_eq!(base.config("messages.success.text"), Some(&json!("Saved {name}")));
        assert_eq!(base.config("messages.success.element"), Some(&json!("toast")));
    }

    #[test]
    fn test_set_config_scalar_replaces() {
        let mut base = ActionBase::new("add");
        base.set_config("messages.success.text", "First");
        base.set_config("messages.success.text", "Second");
        assert_eq!(base.config("messages.success.text"), Some(&json!("Second")));
    }

    #[test]
    fn test_overlay_config_lets_incoming_win() {
        let mut base = ActionBase::new("add");
        base.overlay_config(object(json!({"messages": {"invalidId": {"text": "Bad id"}}})));
        assert_eq!(base.config("messages.invalidId.text"), Some(&json!("Bad id")));
    }

    #[test]
    fn test_handle_action_setting_is_fixed() {
        let mut base = ActionBase::new("delete");
        base.set_config("handleAction", "edit");
        assert_eq!(base.config("handleAction"), Some(&json!("delete")));

        base.set_config("handleAction", json!({"nested": true}));
        assert_eq!(base.config("handleAction"), Some(&json!("delete")));

        base.overlay_config(object(json!({"handleAction": "edit", "view": "confirm"})));
        assert_eq!(base.config("handleAction"), Some(&json!("delete")));
        assert_eq!(base.handle_action(), "delete");
        assert_eq!(base.view(), "confirm");
    }

    #[test]
    fn test_enable_disable() {
        let mut base = ActionBase::new("edit");
        assert!(!base.disable());
        assert_eq!(base.config("enabled"), Some(&json!(false)));
        assert!(!base.is_enabled());

        assert!(base.enable());
        assert_eq!(base.config("enabled"), Some(&json!(true)));
        assert!(base.is_enabled());
    }

    #[test]
    fn test_view_defaults_to_handle_action() {
        let mut base = ActionBase::new("view");
        assert_eq!(base.view(), "view");
        base.set_view("custom");
        assert_eq!(base.view(), "custom");
    }

    #[test]
    fn test_find_method_and_save_options() {
        let mut base = ActionBase::new("edit");
        assert_eq!(base.find_method(), None);
        assert_eq!(base.save_options(), None);

        base.set_find_method("active")
            .set_save_options(json!({"atomic": true}));
        assert_eq!(base.find_method(), Some("active"));
        assert_eq!(base.save_options(), Some(&json!({"atomic": true})));
    }

    #[test]
    fn test_id_validation_setting() {
        let mut base = ActionBase::new("view");
        assert_eq!(base.id_validation(), IdValidation::Detect);

        base.set_id_validation(IdValidation::Type(IdType::Uuid));
        assert_eq!(base.config("validateId"), Some(&json!("uuid")));
        assert_eq!(base.id_validation(), IdValidation::Type(IdType::Uuid));

        base.set_id_validation(IdValidation::Disabled);
        assert_eq!(base.id_validation(), IdValidation::Disabled);
    }

    #[test]
    fn test_id_from_request() {
        let base = ActionBase::new("view");
        let request = RequestContext::new().with_pass(["12", "extra"]);
        assert_eq!(base.id_from_request(&request), Some("12"));
        assert_eq!(base.id_from_request(&RequestContext::new()), None);
    }

    #[test]
    fn test_detect_without_model_is_fatal() {
        let base = ActionBase::new("view");
        assert!(matches!(
            base.detect_primary_key_type(),
            Err(Error::MissingModel { .. })
        ));
    }

    #[test]
    fn test_validate_id_accepts_integer() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("view");
        base.bind_model(Some(integer_posts()));
        let subject = Subject::new("posts", "view", RequestContext::new());

        let check = base.validate_id("42", &subject, &mut ctx).unwrap();
        assert!(check.is_valid());
        assert!(flash.is_empty());
    }

    #[test]
    fn test_validate_id_rejects_non_numeric() {
        let invalid_ids = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&invalid_ids);
        let mut events = EventManager::new();
        events.on(EventKind::InvalidId, move |event| {
            if let CrudEvent::InvalidId(invalid) = event {
                seen.lock().unwrap().push(invalid.id.clone());
            }
        });
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("view");
        base.bind_model(Some(integer_posts()));
        let request = RequestContext::new().with_header(header::REFERER, "/posts?page=3");
        let subject = Subject::new("posts", "view", request);

        let check = base.validate_id("abc", &subject, &mut ctx).unwrap();
        let IdCheck::Rejected(response) = check else {
            panic!("expected rejection");
        };
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/posts?page=3");
        assert_eq!(*invalid_ids.lock().unwrap(), vec!["abc".to_string()]);

        assert_eq!(flash.len(), 1);
        let message = &flash.messages()[0];
        assert_eq!(message.message, "Invalid id");
        assert_eq!(message.kind, FlashKind::Error);
        assert_eq!(message.params.get("class"), Some(&json!("message invalidId")));
    }

    #[test]
    fn test_validate_id_without_referer_goes_home() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("view");
        base.set_id_validation(IdValidation::Type(IdType::Integer));
        let subject = Subject::new("posts", "view", RequestContext::new());

        let IdCheck::Rejected(response) = base.validate_id("x1", &subject, &mut ctx).unwrap() else {
            panic!("expected rejection");
        };
        assert_eq!(location(&response), "/");
    }

    #[test]
    fn test_validate_id_uuid() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("view");
        base.bind_model(Some(uuid_posts()));
        let subject = Subject::new("posts", "view", RequestContext::new());

        let id = uuid::Uuid::new_v4().to_string();
        assert!(base.validate_id(&id, &subject, &mut ctx).unwrap().is_valid());
        assert!(!base.validate_id("42", &subject, &mut ctx).unwrap().is_valid());
        assert_eq!(flash.len(), 1);
    }

    #[test]
    fn test_validate_id_explicit_type_needs_no_model() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("view");
        base.set_id_validation(IdValidation::Type(IdType::Uuid));
        let subject = Subject::new("posts", "view", RequestContext::new());

        let id = uuid::Uuid::new_v4().to_string();
        assert!(base.validate_id(&id, &subject, &mut ctx).unwrap().is_valid());
    }

    #[test]
    fn test_validate_id_inconclusive_or_disabled_accepts() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);
        let subject = Subject::new("tags", "view", RequestContext::new());

        let mut detected = ActionBase::new("view");
        detected.bind_model(Some(Arc::new(
            TableSchema::new("Tag")
                .with_primary_key("slug")
                .with_column("slug", ColumnType::String, Some(64)),
        )));
        assert!(detected.validate_id("any-slug", &subject, &mut ctx).unwrap().is_valid());

        let mut disabled = ActionBase::new("view");
        disabled.set_id_validation(IdValidation::Disabled);
        assert!(disabled.validate_id("anything", &subject, &mut ctx).unwrap().is_valid());
    }

    #[test]
    fn test_validate_id_detection_without_model_errors() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);
        let subject = Subject::new("posts", "view", RequestContext::new());

        let mut base = ActionBase::new("view");
        let result = base.validate_id("1", &subject, &mut ctx);
        assert!(matches!(result, Err(Error::MissingModel { .. })));
    }

    #[test]
    fn test_redirect_precedence() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let ctx = ActionContext::new(&events, &mut flash, &redirector);
        let base = ActionBase::new("add");

        let body = RequestContext::new()
            .with_field("redirect_url", "/foo")
            .with_query("redirect_url", "/bar");
        let subject = Subject::new("posts", "add", body);
        let response = base.redirect(&subject, &ctx, Some(RouteSpec::action("view").into()));
        assert_eq!(location(&response), "/foo");

        let query = RequestContext::new().with_query("redirect_url", "/bar");
        let subject = Subject::new("posts", "add", query);
        let response = base.redirect(&subject, &ctx, Some(RedirectTarget::url("/baz")));
        assert_eq!(location(&response), "/bar");

        let subject = Subject::new("posts", "add", RequestContext::new());
        let response = base.redirect(&subject, &ctx, Some(RedirectTarget::url("/baz")));
        assert_eq!(location(&response), "/baz");

        let response = base.redirect(&subject, &ctx, None);
        assert_eq!(location(&response), "/posts");
    }

    #[test]
    fn test_before_redirect_listener_rewrites_target() {
        let mut events = EventManager::new();
        events.on(EventKind::BeforeRedirect, |event| {
            if let CrudEvent::BeforeRedirect(redirect) = event {
                redirect.url = RouteSpec::action("view").param("9").into();
            }
        });
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let ctx = ActionContext::new(&events, &mut flash, &redirector);

        let base = ActionBase::new("add");
        let subject = Subject::new("posts", "add", RequestContext::new());
        let response = base.redirect(&subject, &ctx, None);
        assert_eq!(location(&response), "/posts/view/9");
    }

    #[test]
    fn test_set_flash_substitutes_name_and_memoizes() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("add");
        base.bind_model(Some(integer_posts()));
        base.set_config("messages.success.text", "successfully created {name}");
        base.set_flash("success", &mut ctx).unwrap();

        assert_eq!(base.config("name"), Some(&json!("Blog Post")));
        let message = &flash.messages()[0];
        assert_eq!(message.message, "Successfully created Blog Post");
        assert_eq!(message.kind, FlashKind::Success);
        assert_eq!(message.element, DEFAULT_ELEMENT);
        assert_eq!(message.key, DEFAULT_KEY);
        assert_eq!(
            message.params.get("original"),
            Some(&json!("Successfully created Blog Post"))
        );
    }

    #[test]
    fn test_set_flash_uses_configured_name() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("delete");
        base.set_config("name", "entry")
            .set_config("messages.success.text", "Deleted {name}");
        base.set_flash("success", &mut ctx).unwrap();
        assert_eq!(flash.messages()[0].message, "Deleted entry");
    }

    #[test]
    fn test_set_flash_listener_rewrites_message() {
        let mut events = EventManager::new();
        events.on(EventKind::SetFlash, |event| {
            if let CrudEvent::SetFlash(flash) = event {
                flash.message = format!("[{}] {}", flash.flash_type, flash.message);
                flash.key = "alert".to_string();
            }
        });
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("view");
        base.set_flash(INVALID_ID_FLASH, &mut ctx).unwrap();
        assert_eq!(flash.by_key("alert")[0].message, "[invalidId] Invalid id");
    }

    #[test]
    fn test_set_flash_translates_in_domain() {
        struct Upper;
        impl Translator for Upper {
            fn translate(&self, domain: &str, text: &str) -> String {
                format!("{domain}:{}", text.to_uppercase())
            }
        }

        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector).with_translator(&Upper);

        let mut base = ActionBase::new("view");
        base.set_config("messages.domain", "admin");
        base.set_flash(INVALID_ID_FLASH, &mut ctx).unwrap();
        assert_eq!(flash.messages()[0].message, "admin:INVALID ID");
    }

    #[test]
    fn test_set_flash_without_text_errors() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);

        let mut base = ActionBase::new("add");
        let result = base.set_flash("success", &mut ctx);
        assert!(matches!(result, Err(Error::MissingFlashText { .. })));
        assert!(flash.is_empty());
    }

    #[test]
    fn test_handle_declines_other_action_then_handles_own() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);
        let mut action = RecordingAction::new("delete");

        let edit = Subject::new("posts", "edit", RequestContext::new().with_pass(["3"]));
        let outcome = action.handle(&edit, &mut ctx).unwrap();
        assert!(!outcome.is_handled());
        assert!(action.calls.is_empty());

        let delete = Subject::new("posts", "delete", RequestContext::new().with_pass(["3"]))
            .with_model(integer_posts());
        let outcome = action.handle(&delete, &mut ctx).unwrap();
        assert!(outcome.is_handled());
        assert_eq!(action.calls, vec![vec!["3".to_string()]]);
        assert_eq!(action.base().model().map(|m| m.name()), Some("BlogPost"));
    }

    #[test]
    fn test_handle_declines_when_disabled() {
        let events = EventManager::new();
        let mut flash = FlashBag::new();
        let redirector = PathRedirector::default();
        let mut ctx = ActionContext::new(&events, &mut flash, &redirector);
        let mut action = RecordingAction::new("delete");
        action.base_mut().disable();

        let subject = Subject::new("posts", "delete", RequestContext::new());
        let outcome = action.handle(&subject, &mut ctx).unwrap();
        assert!(matches!(outcome, ActionOutcome::NotApplicable));
        assert!(action.calls.is_empty());
        assert_eq!(outcome.into_response().status(), StatusCode::NOT_FOUND);
    }
}
