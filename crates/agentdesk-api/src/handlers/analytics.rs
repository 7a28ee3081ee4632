//! Analytics endpoint.

use agentdesk_db::queries::{self, AnalyticsParams};
use agentdesk_types::{AgentId, AnalyticsEntry};
use axum::Json;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use super::{non_empty, parse_query, parse_size};
use crate::error::ApiError;
use crate::router::RouteRequest;
use crate::state::AppState;

/// Row cap when `limit` is absent.
pub const DEFAULT_LIMIT: u32 = 30;

/// Largest accepted `limit`.
pub const MAX_LIMIT: u32 = 1000;

/// Query parameters for `GET /api/analytics`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    /// Restrict to one agent.
    pub agent_id: Option<String>,
    /// First day, `YYYY-MM-DD` or RFC 3339.
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD` or RFC 3339.
    pub end_date: Option<String>,
    /// Row cap (default 30, at most 1000).
    pub limit: Option<String>,
}

/// `GET /api/analytics`
///
/// The date range only applies when both `startDate` and `endDate` are
/// given.
pub async fn list_analytics(
    state: AppState,
    request: RouteRequest,
) -> Result<Json<Vec<AnalyticsEntry>>, ApiError> {
    let query: AnalyticsQuery = parse_query(&request)?;

    let agent_id = non_empty(query.agent_id.as_deref())
        .map(|raw| {
            raw.parse::<AgentId>()
                .map_err(|e| ApiError::InvalidQuery(format!("Invalid agentId {raw}: {e}")))
        })
        .transpose()?;

    let params = AnalyticsParams {
        agent_id,
        start_date: parse_date("startDate", query.start_date.as_deref())?,
        end_date: parse_date("endDate", query.end_date.as_deref())?,
        limit: parse_size("limit", query.limit.as_deref(), DEFAULT_LIMIT, MAX_LIMIT)?,
    };

    let rows = queries::get_analytics(state.store.as_ref(), &params)
        .await
        .map_err(|e| ApiError::store_failure("Failed to fetch analytics", &e))?;

    Ok(Json(rows))
}

/// Parse an optional calendar date. Timestamps are reduced to their date.
fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let Some(value) = non_empty(raw) else {
        return Ok(None);
    };
    if let Ok(date) = value.parse::<NaiveDate>() {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(|e| ApiError::InvalidQuery(format!("Invalid {name} {value}: {e}")))
}
