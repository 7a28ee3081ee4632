//! Agent endpoints.

use agentdesk_db::queries::{self, AgentsParams};
use agentdesk_db::{DbError, PageWindow};
use agentdesk_types::{Agent, AgentDetail, AgentListItem, AgentPatch, NewAgent};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::{non_empty, parse_body, parse_page, parse_query, parse_size, path_agent_id};
use crate::error::ApiError;
use crate::pagination::{Envelope, Pagination};
use crate::router::RouteRequest;
use crate::state::AppState;

/// Page size when `pageSize` is absent.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest accepted `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

const AGENT_NOT_FOUND: &str = "Agent not found";

/// Query parameters for `GET /api/agents`.
///
/// Everything arrives as text so that empty values can fall back to their
/// defaults and bad numbers can be reported by name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsQuery {
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Page size (default 12, at most 100).
    pub page_size: Option<String>,
    /// Substring searched in name, display name, and description.
    pub search: Option<String>,
    /// `all` (default), `active`, or `inactive`.
    pub status: Option<String>,
    /// `displayName`, `createdAt` (default), or `updatedAt`.
    pub sort: Option<String>,
    /// `asc` or `desc` (default).
    pub order: Option<String>,
}

/// Body of `POST /api/agents`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentBody {
    /// Unique machine name.
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: String,
    /// Human-facing name.
    #[validate(length(
        min = 1,
        max = 100,
        message = "displayName must be 1 to 100 characters"
    ))]
    pub display_name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Avatar URL.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Model identifier.
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,
    /// System prompt.
    #[serde(default)]
    pub system_prompt: String,
    /// Capability tags.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Initial activity flag (default `true`).
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl From<CreateAgentBody> for NewAgent {
    fn from(body: CreateAgentBody) -> Self {
        Self {
            name: body.name,
            display_name: body.display_name,
            description: body.description,
            avatar: body.avatar,
            model: body.model,
            system_prompt: body.system_prompt,
            capabilities: body.capabilities,
            is_active: body.is_active.unwrap_or(true),
        }
    }
}

/// Body of `PUT /api/agents/:id`. Absent fields are left unchanged; present
/// ones are validated like on create.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentBody {
    /// New machine name.
    #[validate(length(min = 1, max = 100, message = "name must be 1 to 100 characters"))]
    pub name: Option<String>,
    /// New human-facing name.
    #[validate(length(
        min = 1,
        max = 100,
        message = "displayName must be 1 to 100 characters"
    ))]
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New avatar URL. An explicit `null` clears it.
    #[serde(default, deserialize_with = "agentdesk_types::deserialize_nullable")]
    pub avatar: Option<Option<String>>,
    /// New model identifier.
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: Option<String>,
    /// New system prompt.
    pub system_prompt: Option<String>,
    /// Replacement capability list.
    pub capabilities: Option<Vec<String>>,
    /// New activity flag.
    pub is_active: Option<bool>,
}

impl From<UpdateAgentBody> for AgentPatch {
    fn from(body: UpdateAgentBody) -> Self {
        Self {
            name: body.name,
            display_name: body.display_name,
            description: body.description,
            avatar: body.avatar,
            model: body.model,
            system_prompt: body.system_prompt,
            capabilities: body.capabilities,
            is_active: body.is_active,
        }
    }
}

/// `GET /api/agents`
pub async fn list_agents(
    state: AppState,
    request: RouteRequest,
) -> Result<Json<Envelope<AgentListItem>>, ApiError> {
    let query: AgentsQuery = parse_query(&request)?;
    let page = parse_page(query.page.as_deref())?;
    let page_size = parse_size(
        "pageSize",
        query.page_size.as_deref(),
        DEFAULT_PAGE_SIZE,
        MAX_PAGE_SIZE,
    )?;

    let params = AgentsParams {
        page,
        limit: page_size,
        skip: PageWindow::for_page(page, page_size).offset,
        search: non_empty(query.search.as_deref())
            .unwrap_or_default()
            .to_owned(),
        status: non_empty(query.status.as_deref())
            .unwrap_or("all")
            .to_owned(),
        sort: non_empty(query.sort.as_deref())
            .unwrap_or("createdAt")
            .to_owned(),
        order: non_empty(query.order.as_deref())
            .unwrap_or("desc")
            .to_owned(),
    };

    let result = queries::get_agents(state.store.as_ref(), &params)
        .await
        .map_err(|e| ApiError::store_failure("Failed to fetch agents", &e))?;

    Ok(Json(Envelope {
        data: result.agents,
        pagination: Pagination::new(page, page_size, result.total),
    }))
}

/// `GET /api/agents/:id`
pub async fn get_agent(state: AppState, request: RouteRequest) -> Result<Json<AgentDetail>, ApiError> {
    let id = path_agent_id(&request)?;

    queries::get_agent(state.store.as_ref(), id)
        .await
        .map_err(|e| ApiError::store_failure("Failed to fetch agent", &e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(String::from(AGENT_NOT_FOUND)))
}

/// `POST /api/agents`
pub async fn create_agent(
    state: AppState,
    request: RouteRequest,
) -> Result<(StatusCode, Json<Agent>), ApiError> {
    let body: CreateAgentBody = parse_body(&request)?;
    let agent = NewAgent::from(body);

    let created = queries::create_agent(state.store.as_ref(), &agent)
        .await
        .map_err(|e| write_failure("Failed to create agent", e))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/agents/:id`
pub async fn update_agent(state: AppState, request: RouteRequest) -> Result<Json<Agent>, ApiError> {
    let id = path_agent_id(&request)?;
    let body: UpdateAgentBody = parse_body(&request)?;
    let patch = AgentPatch::from(body);

    queries::update_agent(state.store.as_ref(), id, &patch)
        .await
        .map_err(|e| write_failure("Failed to update agent", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(String::from(AGENT_NOT_FOUND)))
}

/// A taken name is the client's conflict; anything else is a store failure.
fn write_failure(context: &str, err: DbError) -> ApiError {
    match err {
        DbError::DuplicateName(name) => {
            ApiError::Conflict(format!("Agent name already exists: {name}"))
        }
        other => ApiError::store_failure(context, &other),
    }
}

/// `DELETE /api/agents/:id`
pub async fn delete_agent(
    state: AppState,
    request: RouteRequest,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = path_agent_id(&request)?;

    let deleted = queries::delete_agent(state.store.as_ref(), id)
        .await
        .map_err(|e| ApiError::store_failure("Failed to delete agent", &e))?;

    if !deleted {
        return Err(ApiError::NotFound(String::from(AGENT_NOT_FOUND)));
    }
    Ok(Json(serde_json::json!({ "message": "Agent deleted successfully" })))
}
