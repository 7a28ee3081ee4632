//! Data layer for the AgentDesk API (`PostgreSQL`).
//!
//! Request handlers never talk to the database directly. They call the
//! functions in [`queries`], which translate request parameters into typed
//! filters and run them against a [`Store`].
//!
//! # Architecture
//!
//! ```text
//! Handler
//!     |
//!     +-- queries::get_agents / get_logs / ... (params -> filters)
//!         |
//!         +-- dyn Store
//!             |-- PostgresPool   (production)
//!             |     |-- AgentStore      (agents, conversations)
//!             |     |-- AnalyticsStore  (chat_analytics)
//!             |     +-- LogStore        (logs)
//!             +-- MemoryStore    (tests, local runs)
//! ```
//!
//! # Modules
//!
//! - [`filter`] -- Filter, sort, and paging descriptions
//! - [`queries`] -- Data-access functions used by the HTTP layer
//! - [`store`] -- The backend trait
//! - [`postgres`] -- `PostgreSQL` connection pool and [`Store`] impl
//! - [`memory`] -- In-process [`Store`] impl
//! - [`error`] -- Shared error types

pub mod agent_store;
pub mod analytics_store;
pub mod error;
pub mod filter;
pub mod log_store;
pub mod memory;
pub mod postgres;
pub mod queries;
pub mod store;

// Re-export primary types for convenience.
pub use agent_store::AgentStore;
pub use analytics_store::AnalyticsStore;
pub use error::DbError;
pub use filter::{
    AgentFilter, AgentSort, AgentSortField, AnalyticsFilter, DateRange, LogFilter, LogSort,
    LogSortField, PageWindow, SortOrder, ALL_STATUSES,
};
pub use log_store::LogStore;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use queries::{
    AgentPage, AgentsParams, AnalyticsParams, LogPage, LogsParams, AGENT_DETAIL_ANALYTICS,
};
pub use store::Store;
