//! HTTP API for AgentDesk.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for agents (list, get, create, update, delete),
//!   daily chat analytics, and activity logs
//! - **`WebSocket` endpoint** (`/ws/chat`) that relays every chat message
//!   to all connected clients via [`tokio::sync::broadcast`]
//!
//! # Architecture
//!
//! REST routes live in the crate's own method + path [`Router`], mounted
//! as the Axum fallback. Handlers read and write through the injected
//! [`Store`](agentdesk_db::Store) in [`AppState`], so the same code runs
//! against `PostgreSQL` in production and an in-memory store in tests. A
//! CORS middleware answers preflight requests and stamps the CORS headers
//! on every response.

pub mod app;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use app::{api_router, build_app};
pub use error::ApiError;
pub use pagination::{Envelope, Pagination};
pub use router::{Handler, RouteParams, RouteRequest, Router};
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
