//! Data-access functions: one per API read, plus the agent writes.
//!
//! Each function takes an explicit [`Store`] handle and a plain parameter
//! struct, turns the parameters into typed filters, and issues the
//! backend calls. Listing functions run the page fetch and the total
//! count concurrently; the two have no ordering dependency.

use agentdesk_types::{
    Agent, AgentDetail, AgentId, AgentListItem, AgentPatch, AnalyticsEntry, Log, NewAgent,
};
use chrono::NaiveDate;

use crate::error::DbError;
use crate::filter::{AgentFilter, AgentSort, AnalyticsFilter, LogFilter, LogSort, PageWindow};
use crate::store::Store;

/// Number of analytics rows embedded in an agent detail view.
pub const AGENT_DETAIL_ANALYTICS: u32 = 30;

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Parameters for [`get_agents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentsParams {
    /// 1-based page number (echoed back in the response envelope).
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Rows to skip, normally `(page - 1) * limit`.
    pub skip: u64,
    /// Substring searched in name, display name, and description.
    pub search: String,
    /// `all`, `active`, or `inactive`.
    pub status: String,
    /// Requested sort field.
    pub sort: String,
    /// `asc` or `desc`.
    pub order: String,
}

/// One page of agents plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPage {
    /// The requested page.
    pub agents: Vec<AgentListItem>,
    /// Matches across all pages.
    pub total: u64,
}

/// Fetch one agent with its conversations and the most recent analytics.
///
/// A missing agent is `Ok(None)`, not an error.
pub async fn get_agent(store: &dyn Store, id: AgentId) -> Result<Option<AgentDetail>, DbError> {
    store.find_agent(id).await
}

/// Fetch a filtered, sorted page of agents and the filtered total.
pub async fn get_agents(store: &dyn Store, params: &AgentsParams) -> Result<AgentPage, DbError> {
    let filter = AgentFilter::from_params(&params.search, &params.status);
    let sort = AgentSort::from_params(&params.sort, &params.order);
    let window = PageWindow {
        offset: params.skip,
        limit: params.limit,
    };

    let (agents, total) = tokio::try_join!(
        store.find_agents(&filter, sort, window),
        store.count_agents(&filter),
    )?;

    tracing::debug!(
        page = params.page,
        returned = agents.len(),
        total,
        "Fetched agent page"
    );

    Ok(AgentPage { agents, total })
}

/// Create an agent.
pub async fn create_agent(store: &dyn Store, agent: &NewAgent) -> Result<Agent, DbError> {
    let created = store.insert_agent(agent).await?;
    tracing::info!(agent_id = %created.id, name = created.name, "Created agent");
    Ok(created)
}

/// Update an agent. `Ok(None)` when the agent does not exist.
pub async fn update_agent(
    store: &dyn Store,
    id: AgentId,
    patch: &AgentPatch,
) -> Result<Option<Agent>, DbError> {
    let updated = store.update_agent(id, patch).await?;
    if updated.is_some() {
        tracing::info!(agent_id = %id, "Updated agent");
    }
    Ok(updated)
}

/// Delete an agent. `Ok(false)` when the agent does not exist.
pub async fn delete_agent(store: &dyn Store, id: AgentId) -> Result<bool, DbError> {
    let deleted = store.delete_agent(id).await?;
    if deleted {
        tracing::info!(agent_id = %id, "Deleted agent");
    }
    Ok(deleted)
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Parameters for [`get_analytics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsParams {
    /// Restrict to one agent.
    pub agent_id: Option<AgentId>,
    /// First day of the range (ignored unless `end_date` is also set).
    pub start_date: Option<NaiveDate>,
    /// Last day of the range (ignored unless `start_date` is also set).
    pub end_date: Option<NaiveDate>,
    /// Maximum rows returned.
    pub limit: u32,
}

/// Fetch analytics rows, newest date first.
pub async fn get_analytics(
    store: &dyn Store,
    params: &AnalyticsParams,
) -> Result<Vec<AnalyticsEntry>, DbError> {
    let filter = AnalyticsFilter::from_params(params.agent_id, params.start_date, params.end_date);
    if filter.date_range.is_none() && (params.start_date.is_some() || params.end_date.is_some()) {
        tracing::debug!("Only one analytics date bound given, date filter ignored");
    }
    store.find_analytics(&filter, params.limit).await
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// Parameters for [`get_logs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsParams {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub page_size: u32,
    /// Status name, or empty / `ALL` for every status.
    pub status: String,
    /// Requested sort field.
    pub sort_by: String,
    /// `asc` or `desc`.
    pub sort_order: String,
}

/// One page of logs plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPage {
    /// The requested page.
    pub logs: Vec<Log>,
    /// Matches across all pages.
    pub total: u64,
}

/// Fetch a filtered, sorted page of logs and the filtered total.
///
/// Returns [`DbError::InvalidFilter`] for an unknown status name.
pub async fn get_logs(store: &dyn Store, params: &LogsParams) -> Result<LogPage, DbError> {
    let filter =
        LogFilter::from_params(&params.status).map_err(|e| DbError::InvalidFilter(e.to_string()))?;
    let sort = LogSort::from_params(&params.sort_by, &params.sort_order);
    let window = PageWindow::for_page(params.page, params.page_size);

    let (logs, total) = tokio::try_join!(
        store.find_logs(&filter, sort, window),
        store.count_logs(&filter),
    )?;

    Ok(LogPage { logs, total })
}
