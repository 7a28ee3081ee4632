//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors with additional context about which operation failed.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A stored value could not be converted into its record type.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Another agent already uses this name.
    #[error("Duplicate agent name: {0}")]
    DuplicateName(String),

    /// A caller-supplied filter value is not valid for the column it targets.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
