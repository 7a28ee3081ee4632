//! Application assembly.
//!
//! The REST surface is registered on the crate's own [`Router`], which is
//! mounted as the Axum fallback so every request that is not the chat
//! socket goes through it. CORS and request tracing wrap everything.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::cors;
use crate::error::ApiError;
use crate::handlers::{agents, analytics, logs};
use crate::router::{Handler, RouteRequest, Router};
use crate::state::AppState;
use crate::ws;

/// Register every REST route.
///
/// Routes:
/// - `GET /api/agents` -- list agents
/// - `POST /api/agents` -- create an agent
/// - `GET /api/agents/:id` -- single agent
/// - `PUT /api/agents/:id` -- update an agent
/// - `DELETE /api/agents/:id` -- delete an agent
/// - `GET /api/analytics` -- analytics rows
/// - `GET /api/logs` -- list logs
pub fn api_router(state: &AppState) -> Router {
    let mut router = Router::new();
    router
        .add(Method::GET, "/api/agents", with_state(state, agents::list_agents))
        .add(Method::POST, "/api/agents", with_state(state, agents::create_agent))
        .add(Method::GET, "/api/agents/:id", with_state(state, agents::get_agent))
        .add(Method::PUT, "/api/agents/:id", with_state(state, agents::update_agent))
        .add(Method::DELETE, "/api/agents/:id", with_state(state, agents::delete_agent))
        .add(Method::GET, "/api/analytics", with_state(state, analytics::list_analytics))
        .add(Method::GET, "/api/logs", with_state(state, logs::list_logs));
    router
}

/// Build the complete Axum application.
///
/// `GET /ws/chat` is mounted only when [`AppState::chat_enabled`] is set.
pub fn build_app(state: AppState) -> axum::Router {
    let api = Arc::new(api_router(&state));

    let mut app = axum::Router::new();
    if state.chat_enabled {
        app = app.route("/ws/chat", get(ws::ws_chat));
    }

    app.fallback(move |request: Request<Body>| dispatch(Arc::clone(&api), request))
        .layer(from_fn(cors::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(api: Arc<Router>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    match api.handle(request).await {
        Some(response) => response,
        None => {
            tracing::debug!(%method, path = %path, "No route matched");
            ApiError::RouteNotFound.into_response()
        }
    }
}

/// Bind a handler taking `(AppState, RouteRequest)` to a copy of `state`.
fn with_state<F, Fut, R>(state: &AppState, handler: F) -> impl Handler
where
    F: Fn(AppState, RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    let state = state.clone();
    move |request: RouteRequest| handler(state.clone(), request)
}
