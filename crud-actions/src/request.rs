//! Request data visible to CRUD actions
//!
//! Actions read three things from the request: positional route parameters
//! (the record id is the first one), submitted body fields, and query
//! parameters. Both body and query may carry a `redirect_url` override.
//!
//! [`RequestContext`] can be extracted directly in axum handlers; the body is
//! not part of the request head, so handlers that accept a form attach it with
//! [`RequestContext::with_data`].
//!
//! ```rust,ignore
//! use axum::Form;
//! use crud_actions::request::RequestContext;
//!
//! async fn edit(request: RequestContext, Form(body): Form<serde_json::Map<String, serde_json::Value>>) {
//!     let request = request.with_data(body);
//!     // ...
//! }
//! ```

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Query, RawPathParams},
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use serde_json::{Map, Value};

use crate::error::Error;

/// Field name carrying a client supplied redirect target
pub const REDIRECT_URL_FIELD: &str = "redirect_url";

/// Request data for one dispatch
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pass: Vec<String>,
    data: Map<String, Value>,
    query: HashMap<String, String>,
    headers: HeaderMap,
}

impl RequestContext {
    /// Create an empty request context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set positional route parameters
    #[must_use]
    pub fn with_pass<I, S>(mut self, pass: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass = pass.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the body fields
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Set a single body field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Set a query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Set a header; invalid header values are ignored
    #[must_use]
    pub fn with_header(mut self, name: header::HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Positional route parameters
    #[must_use]
    pub fn pass(&self) -> &[String] {
        &self.pass
    }

    /// Body fields
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// String body field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Query parameter
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Request headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Referer` header, if present and valid UTF-8
    #[must_use]
    pub fn referer(&self) -> Option<&str> {
        self.headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    }

    /// Client supplied redirect override: body field first, then query
    #[must_use]
    pub fn redirect_override(&self) -> Option<&str> {
        self.field(REDIRECT_URL_FIELD)
            .or_else(|| self.query(REDIRECT_URL_FIELD))
            .filter(|url| !url.is_empty())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Routes without parameters have nothing to forward
        let pass = match RawPathParams::from_request_parts(parts, state).await {
            Ok(params) => params.iter().map(|(_, value)| value.to_string()).collect(),
            Err(_) => Vec::new(),
        };

        let Query(query) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::BadRequest(format!("Invalid query string: {e}")))?;

        Ok(Self {
            pass,
            data: Map::new(),
            query,
            headers: parts.headers.clone(),
        })
    }
}
