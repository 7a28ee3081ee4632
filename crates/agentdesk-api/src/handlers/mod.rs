//! REST API endpoint handlers.
//!
//! Each handler receives the shared [`AppState`](crate::state::AppState)
//! and the routed [`RouteRequest`], parses its query string or body, calls
//! the matching data-access function in [`agentdesk_db::queries`], and
//! shapes the JSON response.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/agents` | Filtered, sorted page of agents |
//! | `GET` | `/api/agents/:id` | Single agent with conversations and analytics |
//! | `POST` | `/api/agents` | Create an agent |
//! | `PUT` | `/api/agents/:id` | Update an agent |
//! | `DELETE` | `/api/agents/:id` | Delete an agent |
//! | `GET` | `/api/analytics` | Daily analytics rows |
//! | `GET` | `/api/logs` | Filtered, sorted page of logs |

pub mod agents;
pub mod analytics;
pub mod logs;

use agentdesk_types::AgentId;
use axum::extract::Query;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;
use crate::router::RouteRequest;

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Deserialize the request's query string into `T`.
fn parse_query<T: DeserializeOwned>(request: &RouteRequest) -> Result<T, ApiError> {
    Query::<T>::try_from_uri(&request.uri)
        .map(|Query(query)| query)
        .map_err(|e| ApiError::InvalidQuery(e.body_text()))
}

/// Value of an optional text parameter, `None` when absent or empty.
fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.is_empty())
}

/// Parse a numeric parameter. Absent or empty takes `default`.
fn parse_number(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    non_empty(raw).map_or(Ok(default), |value| {
        value.parse().map_err(|e: std::num::ParseIntError| {
            tracing::debug!(param = name, error = %e, "Rejected numeric parameter");
            ApiError::InvalidQuery(format!("Invalid {name}: {value}"))
        })
    })
}

/// Parse a page number, clamped to at least 1.
fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    parse_number("page", raw, 1).map(|page| page.max(1))
}

/// Parse a size parameter, clamped to `1..=max`.
fn parse_size(name: &str, raw: Option<&str>, default: u32, max: u32) -> Result<u32, ApiError> {
    parse_number(name, raw, default).map(|size| size.clamp(1, max))
}

// ---------------------------------------------------------------------------
// Path and body
// ---------------------------------------------------------------------------

/// The `:id` capture as an [`AgentId`].
fn path_agent_id(request: &RouteRequest) -> Result<AgentId, ApiError> {
    let raw = request
        .param("id")
        .ok_or_else(|| ApiError::InvalidUuid(String::from("Missing agent id")))?;
    raw.parse()
        .map_err(|e| ApiError::InvalidUuid(format!("Invalid agent id {raw}: {e}")))
}

/// Decode and validate a JSON request body.
fn parse_body<T: DeserializeOwned + Validate>(request: &RouteRequest) -> Result<T, ApiError> {
    let body: T = serde_json::from_slice(&request.body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::InvalidBody
    })?;
    body.validate()
        .map_err(|errors| ApiError::Validation(validation_message(&errors)))?;
    Ok(body)
}

/// Flatten field errors into one message, sorted for stable output.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                err.message
                    .as_ref()
                    .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method, Uri};

    use super::*;

    fn request(uri: &str) -> RouteRequest {
        RouteRequest {
            method: Method::GET,
            uri: uri.parse::<Uri>().unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    #[test]
    fn numbers_default_when_absent_or_empty() {
        assert_eq!(parse_number("page", None, 7).unwrap(), 7);
        assert_eq!(parse_number("page", Some(""), 7).unwrap(), 7);
        assert_eq!(parse_number("page", Some("3"), 7).unwrap(), 3);
    }

    #[test]
    fn non_numeric_is_rejected() {
        let err = parse_number("pageSize", Some("ten"), 10).unwrap_err();
        assert_eq!(err.to_string(), "Invalid pageSize: ten");
        assert!(parse_number("page", Some("-1"), 1).is_err());
    }

    #[test]
    fn page_and_size_clamping() {
        assert_eq!(parse_page(Some("0")).unwrap(), 1);
        assert_eq!(parse_size("pageSize", Some("0"), 10, 100).unwrap(), 1);
        assert_eq!(parse_size("pageSize", Some("500"), 10, 100).unwrap(), 100);
        assert_eq!(parse_size("limit", None, 30, 1000).unwrap(), 30);
    }

    #[test]
    fn missing_and_malformed_ids() {
        let err = path_agent_id(&request("/api/agents/:id")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUuid(_)));

        let mut req = request("/api/agents/nope");
        req.params.insert(String::from("id"), String::from("nope"));
        assert!(matches!(path_agent_id(&req), Err(ApiError::InvalidUuid(_))));

        let id = AgentId::new();
        req.params.insert(String::from("id"), id.to_string());
        assert_eq!(path_agent_id(&req).unwrap(), id);
    }

    #[test]
    fn query_string_decoding() {
        #[derive(serde::Deserialize)]
        struct Q {
            search: Option<String>,
        }
        let q: Q = parse_query(&request("/api/agents?search=hello%20world")).unwrap();
        assert_eq!(q.search.as_deref(), Some("hello world"));
        let q: Q = parse_query(&request("/api/agents")).unwrap();
        assert!(q.search.is_none());
    }
}
