//! The [`Store`] seam between the data-access functions and a backend.
//!
//! [`crate::PostgresPool`] is the production implementation;
//! [`crate::MemoryStore`] evaluates the same filters in process and is used
//! as a test double. Handlers receive an `Arc<dyn Store>` so the backend is
//! chosen once at startup.

use agentdesk_types::{
    Agent, AgentDetail, AgentId, AgentListItem, AgentPatch, AnalyticsEntry, Log, NewAgent,
};
use async_trait::async_trait;

use crate::error::DbError;
use crate::filter::{AgentFilter, AgentSort, AnalyticsFilter, LogFilter, LogSort, PageWindow};

/// Primitive record operations. Each call is one query (or one short
/// sequence of queries) against the backend; composition such as running
/// a count alongside a page fetch happens in [`crate::queries`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one agent with its conversations and recent analytics.
    async fn find_agent(&self, id: AgentId) -> Result<Option<AgentDetail>, DbError>;

    /// Fetch one page of agents matching `filter`.
    async fn find_agents(
        &self,
        filter: &AgentFilter,
        sort: AgentSort,
        window: PageWindow,
    ) -> Result<Vec<AgentListItem>, DbError>;

    /// Count all agents matching `filter`.
    async fn count_agents(&self, filter: &AgentFilter) -> Result<u64, DbError>;

    /// Insert a new agent and return the stored record.
    async fn insert_agent(&self, agent: &NewAgent) -> Result<Agent, DbError>;

    /// Apply `patch` to an agent. Returns `None` if the agent does not exist.
    async fn update_agent(&self, id: AgentId, patch: &AgentPatch)
    -> Result<Option<Agent>, DbError>;

    /// Delete an agent. Returns `false` if the agent did not exist.
    async fn delete_agent(&self, id: AgentId) -> Result<bool, DbError>;

    /// Fetch analytics rows matching `filter`, newest date first, at most
    /// `limit` rows.
    async fn find_analytics(
        &self,
        filter: &AnalyticsFilter,
        limit: u32,
    ) -> Result<Vec<AnalyticsEntry>, DbError>;

    /// Fetch one page of logs matching `filter`.
    async fn find_logs(
        &self,
        filter: &LogFilter,
        sort: LogSort,
        window: PageWindow,
    ) -> Result<Vec<Log>, DbError>;

    /// Count all logs matching `filter`.
    async fn count_logs(&self, filter: &LogFilter) -> Result<u64, DbError>;
}
