//! Log endpoint.

use agentdesk_db::queries::{self, LogsParams};
use agentdesk_db::DbError;
use agentdesk_types::Log;
use axum::Json;
use serde::Deserialize;

use super::{non_empty, parse_page, parse_query, parse_size};
use crate::error::ApiError;
use crate::pagination::{Envelope, Pagination};
use crate::router::RouteRequest;
use crate::state::AppState;

/// Page size when `pageSize` is absent.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest accepted `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for `GET /api/logs`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Page size (default 10, at most 100).
    pub page_size: Option<String>,
    /// `SUCCESS`, `ERROR`, `WARNING`, `PENDING`, or `ALL`. Empty means all.
    pub status: Option<String>,
    /// `createdAt` (default), `updatedAt`, or `status`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// `GET /api/logs`
pub async fn list_logs(state: AppState, request: RouteRequest) -> Result<Json<Envelope<Log>>, ApiError> {
    let query: LogsQuery = parse_query(&request)?;
    let page = parse_page(query.page.as_deref())?;
    let page_size = parse_size(
        "pageSize",
        query.page_size.as_deref(),
        DEFAULT_PAGE_SIZE,
        MAX_PAGE_SIZE,
    )?;

    let params = LogsParams {
        page,
        page_size,
        status: query.status.unwrap_or_default(),
        sort_by: non_empty(query.sort_by.as_deref())
            .unwrap_or("createdAt")
            .to_owned(),
        sort_order: non_empty(query.sort_order.as_deref())
            .unwrap_or("desc")
            .to_owned(),
    };

    let result = queries::get_logs(state.store.as_ref(), &params)
        .await
        .map_err(|e| match e {
            DbError::InvalidFilter(msg) => ApiError::InvalidQuery(msg),
            other => ApiError::store_failure("Failed to fetch logs", &other),
        })?;

    Ok(Json(Envelope {
        data: result.logs,
        pagination: Pagination::new(page, page_size, result.total).with_navigation(),
    }))
}
