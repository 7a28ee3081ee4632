//! Error types for the server binary.
//!
//! [`AppError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An environment variable is missing or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// The database pool could not be created.
    #[error("database error: {source}")]
    Database {
        /// The underlying data layer error.
        #[from]
        source: agentdesk_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: agentdesk_api::ServerError,
    },
}
