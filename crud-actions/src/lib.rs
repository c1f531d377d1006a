//! # crud-actions
//!
//! Configurable CRUD action handlers for axum controllers.
//!
//! A controller maps one action per operation (index, view, add, edit,
//! delete, ...). Each action carries its own settings tree and shares the
//! behaviour a CRUD handler needs:
//!
//! - **Settings**: dotted-path configuration per action, layered from code and
//!   `crud.toml`
//! - **Toggles**: actions can be disabled and then decline every request
//! - **ID validation**: integer or UUID identifiers, detected from the model's
//!   primary key
//! - **Redirects**: client supplied `redirect_url` overrides with a sensible
//!   default
//! - **Flash messages**: configurable, translatable texts with the resource
//!   name substituted
//! - **Events**: listeners may rewrite arguments, redirect targets and flash
//!   messages
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::response::{IntoResponse, Response};
//! use crud_actions::prelude::*;
//!
//! struct DeleteAction {
//!     base: ActionBase,
//! }
//!
//! impl CrudAction for DeleteAction {
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
//!         self.base.set_flash("success", ctx)?;
//!         Ok(self.base.redirect(subject, ctx, None))
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let config = CrudConfig::load()?;
//!     init_tracing(&config)?;
//!
//!     let mut delete = ActionBase::new("delete");
//!     delete.set_config("messages.success.text", "Deleted {name}");
//!
//!     let mut dispatcher = CrudDispatcher::new().with_action(DeleteAction { base: delete });
//!     dispatcher.apply_config(&config);
//!
//!     let subject = Subject::new("posts", "delete", RequestContext::new().with_pass(["3"]))
//!         .with_model(std::sync::Arc::new(
//!             TableSchema::new("Post")
//!                 .with_primary_key("id")
//!                 .with_column("id", ColumnType::Integer, None),
//!         ));
//!     let mut flash = FlashBag::new();
//!     let _response = dispatcher
//!         .dispatch(subject, &mut flash, &PathRedirector::default())?
//!         .into_response();
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod flash;
pub mod model;
pub mod observability;
pub mod redirect;
pub mod request;
pub mod settings;
pub mod subject;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{
        ActionBase, ActionContext, ActionOutcome, CrudAction, IdCheck, IdValidation,
    };
    pub use crate::config::{CrudConfig, ServiceConfig};
    pub use crate::dispatcher::CrudDispatcher;
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::events::{CrudEvent, EventKind, EventManager};
    pub use crate::flash::{
        FlashBag, FlashKind, FlashMessage, FlashStore, IdentityTranslator, Translator,
    };
    pub use crate::model::{ColumnSchema, ColumnType, ModelSchema, TableSchema};
    pub use crate::observability::init_tracing;
    pub use crate::redirect::{PathRedirector, RedirectTarget, Redirector, RouteSpec};
    pub use crate::request::RequestContext;
    pub use crate::settings::Settings;
    pub use crate::subject::Subject;
    pub use crate::validation::IdType;
}
