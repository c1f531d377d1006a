//! Redirect targets and the redirect collaborator
//!
//! An action redirects either to a literal URL (a client supplied
//! `redirect_url`, the referring page) or to a route described by controller,
//! action and positional params. A [`Redirector`] turns either into a
//! response.

use std::fmt;

use axum::response::{IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

/// Route description, resolved against the current controller when
/// `controller` is not set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Controller name; `None` means the controller being dispatched
    #[serde(default)]
    pub controller: Option<String>,
    /// Action name
    pub action: String,
    /// Positional params appended to the path
    #[serde(default)]
    pub params: Vec<String>,
}

impl RouteSpec {
    /// Route to an action of the current controller
    #[must_use]
    pub fn action(action: impl Into<String>) -> Self {
        Self {
            controller: None,
            action: action.into(),
            params: Vec::new(),
        }
    }

    /// Route to another controller
    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Append a positional param
    #[must_use]
    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Where to send the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedirectTarget {
    /// Literal URL or path
    Url(String),
    /// Route to resolve
    Route(RouteSpec),
}

impl RedirectTarget {
    /// Literal URL target
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// Target used when nothing else is given: the `index` action
    #[must_use]
    pub fn index() -> Self {
        Self::Route(RouteSpec::action("index"))
    }
}

impl Default for RedirectTarget {
    fn default() -> Self {
        Self::index()
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::Route(route) => {
                write!(
                    f,
                    "{{controller: {}, action: {}",
                    route.controller.as_deref().unwrap_or("<current>"),
                    route.action
                )?;
                if !route.params.is_empty() {
                    write!(f, ", params: [{}]", route.params.join(", "))?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<RouteSpec> for RedirectTarget {
    fn from(route: RouteSpec) -> Self {
        Self::Route(route)
    }
}

impl From<&str> for RedirectTarget {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RedirectTarget {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

/// Turns a redirect target into a response
pub trait Redirector: Send + Sync {
    /// Build the redirect response; `controller` is the controller being
    /// dispatched
    fn redirect(&self, target: &RedirectTarget, controller: &str) -> Response;
}

/// Path based redirector
///
/// Routes resolve to `{prefix}/{controller}/{action}/{params..}`; the `index`
/// action without params resolves to `{prefix}/{controller}`. Responses use
/// `303 See Other`.
///
/// # Example
///
/// ```rust
/// use crud_actions::redirect::{PathRedirector, RedirectTarget, RouteSpec};
///
/// let redirector = PathRedirector::new("/admin");
/// assert_eq!(redirector.resolve(&RedirectTarget::index(), "articles"), "/admin/articles");
/// assert_eq!(
///     redirector.resolve(&RouteSpec::action("view").param("7").into(), "articles"),
///     "/admin/articles/view/7"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathRedirector {
    prefix: String,
}

impl PathRedirector {
    /// Create a redirector mounting routes under `prefix`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a target to a path without building a response
    #[must_use]
    pub fn resolve(&self, target: &RedirectTarget, controller: &str) -> String {
        match target {
            RedirectTarget::Url(url) => url.clone(),
            RedirectTarget::Route(route) => {
                let controller = route.controller.as_deref().unwrap_or(controller);
                let mut path = format!("{}/{}", self.prefix, controller);
                if route.action != "index" || !route.params.is_empty() {
                    path.push('/');
                    path.push_str(&route.action);
                }
                for param in &route.params {
                    path.push('/');
                    path.push_str(param);
                }
                path
            }
        }
    }
}

impl Redirector for PathRedirector {
    fn redirect(&self, target: &RedirectTarget, controller: &str) -> Response {
        let location = self.resolve(target, controller);
        tracing::debug!(%target, %location, "Redirecting");
        Redirect::to(&location).into_response()
    }
}
