//! Per-dispatch context handed to CRUD actions

use std::sync::Arc;

use crate::model::ModelSchema;
use crate::request::RequestContext;

/// What is being dispatched: controller, action, arguments, model and request
///
/// The positional arguments default to the request's route parameters and
/// may be rewritten by `Crud.beforeHandle` listeners before any action sees
/// them.
#[derive(Debug, Clone)]
pub struct Subject {
    /// Controller name, used to resolve relative redirect routes
    pub controller: String,
    /// Controller action being requested
    pub action: String,
    /// Positional arguments forwarded to the action
    pub args: Vec<String>,
    /// Model the controller works on
    pub model: Option<Arc<dyn ModelSchema>>,
    /// Request data
    pub request: RequestContext,
}

impl Subject {
    /// Subject for `controller`/`action`, taking arguments from the request's
    /// route parameters
    #[must_use]
    pub fn new(
        controller: impl Into<String>,
        action: impl Into<String>,
        request: RequestContext,
    ) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            args: request.pass().to_vec(),
            model: None,
            request,
        }
    }

    /// Replace the positional arguments
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the model schema
    #[must_use]
    pub fn with_model(mut self, model: Arc<dyn ModelSchema>) -> Self {
        self.model = Some(model);
        self
    }

    /// Model class name, if a model is attached
    #[must_use]
    pub fn model_class(&self) -> Option<&str> {
        self.model.as_deref().map(|model| model.name())
    }
}
