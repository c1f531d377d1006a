//! Articles CRUD Example
//!
//! This example demonstrates:
//! - Implementing view and delete actions on top of `ActionBase`
//! - Dispatching axum requests through a `CrudDispatcher`
//! - Integer ID validation with a flash message and redirect on bad IDs
//! - Honouring a `redirect_url` form field after a delete
//!
//! Run with: cargo run --example articles
//!
//! Test with:
//!   curl -i http://localhost:8080/articles/view/1
//!   curl -i http://localhost:8080/articles/view/abc -H "Referer: /articles"
//!   curl -i -X POST http://localhost:8080/articles/delete/2 -d "redirect_url=/done"

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use crud_actions::prelude::*;

type Articles = Arc<Mutex<BTreeMap<u64, String>>>;

// ============================================================================
// Actions
// ============================================================================

struct ViewAction {
    base: ActionBase,
    articles: Articles,
}

impl CrudAction for ViewAction {
    fn base(&self) -> &ActionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActionBase {
        &mut self.base
    }

    fn handle_request(
        &mut self,
        args: &[String],
        subject: &Subject,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Response> {
        let id = args.first().cloned().unwrap_or_default();
        if let IdCheck::Rejected(redirect) = self.base.validate_id(&id, subject, ctx)? {
            return Ok(redirect);
        }

        let articles = self
            .articles
            .lock()
            .map_err(|_| Error::Internal("article store poisoned".to_string()))?;
        let title = id.parse::<u64>().ok().and_then(|id| articles.get(&id).cloned());
        match title {
            Some(title) => Ok(format!("[{}] {}", self.base.view(), title).into_response()),
            None => {
                self.base.set_flash("notFound", ctx)?;
                Ok(self.base.redirect(subject, ctx, None))
            }
        }
    }
}

struct DeleteAction {
    base: ActionBase,
    articles: Articles,
}

impl CrudAction for DeleteAction {
    fn base(&self) -> &ActionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ActionBase {
        &mut self.base
    }

    fn handle_request(
        &mut self,
        args: &[String],
        subject: &Subject,
        ctx: &mut ActionContext<'_>,
    ) -> Result<Response> {
        let id = args.first().cloned().unwrap_or_default();
        if let IdCheck::Rejected(redirect) = self.base.validate_id(&id, subject, ctx)? {
            return Ok(redirect);
        }

        let removed = id.parse::<u64>().ok().and_then(|id| {
            self.articles
                .lock()
                .ok()
                .and_then(|mut articles| articles.remove(&id))
        });
        let flash_type = if removed.is_some() { "success" } else { "error" };
        self.base.set_flash(flash_type, ctx)?;
        Ok(self.base.redirect(subject, ctx, None))
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Mutex<CrudDispatcher>>,
    articles: Articles,
    model: Arc<dyn ModelSchema>,
}

fn run(state: &AppState, action: &str, request: RequestContext) -> Result<Response> {
    let subject = Subject::new("articles", action, request).with_model(Arc::clone(&state.model));
    let mut flash = FlashBag::new();
    let outcome = state
        .dispatcher
        .lock()
        .map_err(|_| Error::Internal("dispatcher poisoned".to_string()))?
        .dispatch(subject, &mut flash, &PathRedirector::default())?;

    for message in flash.take() {
        tracing::info!(kind = ?message.kind, key = %message.key, "Flash: {}", message.message);
    }
    Ok(outcome.into_response())
}

async fn index(State(state): State<AppState>) -> Response {
    let Ok(articles) = state.articles.lock() else {
        return Error::Internal("article store poisoned".to_string()).into_response();
    };
    articles
        .iter()
        .map(|(id, title)| format!("{id}: {title}"))
        .collect::<Vec<_>>()
        .join("\n")
        .into_response()
}

async fn view(State(state): State<AppState>, request: RequestContext) -> Response {
    run(&state, "view", request).into_response()
}

async fn delete(
    State(state): State<AppState>,
    request: RequestContext,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let request = fields
        .into_iter()
        .fold(request, |request, (name, value)| request.with_field(name, value));
    run(&state, "delete", request).into_response()
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = CrudConfig::load()?;
    init_tracing(&config)?;

    let articles: Articles = Arc::new(Mutex::new(BTreeMap::from([
        (1, "Hello, world".to_string()),
        (2, "Second post".to_string()),
    ])));

    let mut view_base = ActionBase::new("view");
    view_base.set_config("messages.notFound.text", "{name} not found");

    let mut delete_base = ActionBase::new("delete");
    delete_base
        .set_config("messages.success.text", "Successfully deleted {name}")
        .set_config("messages.error.text", "Could not delete {name}");

    let mut dispatcher = CrudDispatcher::new()
        .with_action(ViewAction {
            base: view_base,
            articles: Arc::clone(&articles),
        })
        .with_action(DeleteAction {
            base: delete_base,
            articles: Arc::clone(&articles),
        });
    dispatcher.apply_config(&config);

    let state = AppState {
        dispatcher: Arc::new(Mutex::new(dispatcher)),
        articles,
        model: Arc::new(
            TableSchema::new("Article")
                .with_primary_key("id")
                .with_column("id", ColumnType::Integer, Some(11)),
        ),
    };

    let app = Router::new()
        .route("/articles", get(index))
        .route("/articles/view/{id}", get(view))
        .route("/articles/delete/{id}", post(delete))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind: {}", e)))?;
    tracing::info!("Listening on http://0.0.0.0:8080");
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
