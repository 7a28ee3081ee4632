//! Method + path dispatch for the REST API.
//!
//! Patterns are split on `/` at registration time into a list of segment
//! matchers: a literal that must equal the request segment, or a `:name`
//! capture that binds it. Matching first tries an exact lookup of the
//! request path among the registered pattern strings, then walks the
//! patterns for the method in registration order. The first structural
//! match wins; there is no most-specific preference, so overlapping
//! patterns resolve by registration order.
//!
//! Trailing slashes are significant (`/api/agents/` has one more segment
//! than `/api/agents`) and the query string never takes part in matching.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Uri};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;

use crate::error::ApiError;

/// Largest request body read before dispatch (2 MiB, Axum's default limit).
pub const MAX_BODY_BYTES: usize = 2_097_152;

/// Named path captures, keyed without the leading `:`.
pub type RouteParams = HashMap<String, String>;

/// Everything a route handler receives.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    /// Request method.
    pub method: Method,
    /// Full request URI, including the query string.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Collected request body.
    pub body: Bytes,
    /// Captured path segments. Empty for exact matches.
    pub params: RouteParams,
}

impl RouteRequest {
    /// Value of the `name` capture, if the matched pattern had one.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// An async route handler.
///
/// Implemented for every `Fn(RouteRequest) -> impl Future<Output = impl IntoResponse>`
/// that can be shared across tasks.
pub trait Handler: Send + Sync + 'static {
    /// Run the handler.
    fn call(&self, request: RouteRequest) -> BoxFuture<'static, Response>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(RouteRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, request: RouteRequest) -> BoxFuture<'static, Response> {
        let fut = self(request);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

struct Route {
    segments: Vec<Segment>,
    handler: Arc<dyn Handler>,
}

impl Route {
    fn matches(&self, path: &str) -> Option<RouteParams> {
        let mut params = RouteParams::new();
        let mut parts = path.split('/');
        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Capture(name) => {
                    params.insert(name.clone(), part.to_owned());
                }
            }
        }
        // Segment counts must be equal.
        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

#[derive(Default)]
struct MethodRoutes {
    /// Pattern string -> index into `routes`.
    exact: HashMap<String, usize>,
    /// Registration order.
    routes: Vec<Route>,
}

/// Route registry and dispatcher.
#[derive(Default)]
pub struct Router {
    methods: HashMap<Method, MethodRoutes>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// Registering the same pair again replaces the handler and keeps the
    /// original position in the matching order.
    pub fn add<H: Handler>(&mut self, method: Method, pattern: &str, handler: H) -> &mut Self {
        let table = self.methods.entry(method).or_default();
        let handler: Arc<dyn Handler> = Arc::new(handler);

        if let Some(route) = table
            .exact
            .get(pattern)
            .copied()
            .and_then(|index| table.routes.get_mut(index))
        {
            route.handler = handler;
            return self;
        }

        table.exact.insert(pattern.to_owned(), table.routes.len());
        table.routes.push(Route {
            segments: compile(pattern),
            handler,
        });
        self
    }

    /// Find the handler for `method` and `path` along with its captures.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<(Arc<dyn Handler>, RouteParams)> {
        let table = self.methods.get(method)?;

        if let Some(route) = table
            .exact
            .get(path)
            .and_then(|&index| table.routes.get(index))
        {
            return Some((Arc::clone(&route.handler), RouteParams::new()));
        }

        table.routes.iter().find_map(|route| {
            route
                .matches(path)
                .map(|params| (Arc::clone(&route.handler), params))
        })
    }

    /// Dispatch a request. `None` means no route matched.
    ///
    /// The body is buffered up to [`MAX_BODY_BYTES`]. A body over the limit,
    /// or one that fails to read, is answered with 413 and the handler is
    /// not called.
    pub async fn handle(&self, request: Request<Body>) -> Option<Response> {
        let (handler, params) = self.resolve(request.method(), request.uri().path())?;

        let (parts, body) = request.into_parts();
        let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, path = %parts.uri.path(), "Rejected request body");
                return Some(ApiError::PayloadTooLarge.into_response());
            }
        };

        let route_request = RouteRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params,
        };
        Some(handler.call(route_request).await)
    }

    /// Number of registered routes across all methods.
    pub fn len(&self) -> usize {
        self.methods.values().map(|table| table.routes.len()).sum()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.methods.values().all(|table| table.routes.is_empty())
    }
}

fn compile(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .map(|part| match part.strip_prefix(':') {
            Some(name) => Segment::Capture(name.to_owned()),
            None => Segment::Literal(part.to_owned()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects
    )]

    use axum::http::StatusCode;

    use super::*;

    /// Handler that answers with a fixed tag and echoes its captures.
    fn tagged(tag: &'static str) -> impl Handler {
        move |req: RouteRequest| async move {
            let mut params: Vec<(String, String)> = req.params.into_iter().collect();
            params.sort();
            axum::Json(serde_json::json!({ "tag": tag, "params": params }))
        }
    }

    async fn call(router: &Router, method: Method, uri: &str) -> Option<serde_json::Value> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = router.handle(request).await?;
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        Some(serde_json::from_slice(&bytes).unwrap())
    }

    fn sample_router() -> Router {
        let mut router = Router::new();
        router
            .add(Method::GET, "/api/agents", tagged("list"))
            .add(Method::GET, "/api/agents/:id", tagged("get"))
            .add(Method::POST, "/api/agents", tagged("create"))
            .add(Method::GET, "/api/agents/:id/logs/:logId", tagged("nested"));
        router
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_the_handler() {
        let mut router = Router::new();
        router.add(Method::POST, "/upload", |req: RouteRequest| async move {
            format!("{} bytes", req.body.len())
        });

        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![b'x'; MAX_BODY_BYTES + 1]))
            .unwrap();
        let response = router.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .body(Body::from(vec![b'x'; MAX_BODY_BYTES]))
            .unwrap();
        let response = router.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], format!("{MAX_BODY_BYTES} bytes").as_bytes());
    }

    #[tokio::test]
    async fn exact_path_has_empty_params() {
        let router = sample_router();
        let body = call(&router, Method::GET, "/api/agents").await.unwrap();
        assert_eq!(body["tag"], "list");
        assert_eq!(body["params"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn capture_binds_segment() {
        let router = sample_router();
        let body = call(&router, Method::GET, "/api/agents/abc-123").await.unwrap();
        assert_eq!(body["tag"], "get");
        assert_eq!(body["params"], serde_json::json!([["id", "abc-123"]]));
    }

    #[tokio::test]
    async fn multiple_captures() {
        let router = sample_router();
        let body = call(&router, Method::GET, "/api/agents/a/logs/b").await.unwrap();
        assert_eq!(body["tag"], "nested");
        assert_eq!(
            body["params"],
            serde_json::json!([["id", "a"], ["logId", "b"]])
        );
    }

    #[tokio::test]
    async fn query_string_is_ignored() {
        let router = sample_router();
        let body = call(&router, Method::GET, "/api/agents?page=2&search=x")
            .await
            .unwrap();
        assert_eq!(body["tag"], "list");
    }

    #[tokio::test]
    async fn method_is_part_of_the_key() {
        let router = sample_router();
        let body = call(&router, Method::POST, "/api/agents").await.unwrap();
        assert_eq!(body["tag"], "create");
        assert!(call(&router, Method::DELETE, "/api/agents").await.is_none());
        assert!(call(&router, Method::POST, "/api/agents/1").await.is_none());
    }

    #[test]
    fn segment_counts_must_match() {
        let router = sample_router();
        assert!(router.resolve(&Method::GET, "/api/agents/1/extra").is_none());
        assert!(router.resolve(&Method::GET, "/api").is_none());
        assert!(router.resolve(&Method::GET, "/api/agents/1/logs").is_none());
    }

    #[test]
    fn trailing_slash_is_significant() {
        let router = sample_router();
        // One extra empty segment: binds `id` to "".
        let (_, params) = router.resolve(&Method::GET, "/api/agents/").unwrap();
        assert_eq!(params["id"], "");
        assert!(router.resolve(&Method::POST, "/api/agents/").is_none());
    }

    #[test]
    fn literal_segments_must_be_equal() {
        let router = sample_router();
        assert!(router.resolve(&Method::GET, "/api/agentz/1").is_none());
        assert!(router.resolve(&Method::GET, "/API/agents").is_none());
    }

    #[tokio::test]
    async fn first_registered_pattern_wins() {
        let mut router = Router::new();
        router
            .add(Method::GET, "/items/:id", tagged("capture"))
            .add(Method::GET, "/items/:name", tagged("shadowed"));
        let body = call(&router, Method::GET, "/items/7").await.unwrap();
        assert_eq!(body["tag"], "capture");
        assert_eq!(body["params"], serde_json::json!([["id", "7"]]));
    }

    #[tokio::test]
    async fn reregistering_replaces_in_place() {
        let mut router = Router::new();
        router
            .add(Method::GET, "/items/:id", tagged("first"))
            .add(Method::GET, "/items/:other", tagged("second"))
            .add(Method::GET, "/items/:id", tagged("replaced"));

        assert_eq!(router.len(), 2);
        let body = call(&router, Method::GET, "/items/7").await.unwrap();
        assert_eq!(body["tag"], "replaced");
    }

    #[tokio::test]
    async fn literal_pattern_path_matches_exactly() {
        let router = sample_router();
        let body = call(&router, Method::GET, "/api/agents/:id").await.unwrap();
        assert_eq!(body["tag"], "get");
        assert_eq!(body["params"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn handler_receives_body_and_status_passes_through() {
        let mut router = Router::new();
        router.add(Method::POST, "/echo", |req: RouteRequest| async move {
            (StatusCode::CREATED, req.body)
        });
        let request = Request::builder()
            .method(Method::POST)
            .uri("/echo")
            .body(Body::from("hello"))
            .unwrap();
        let response = router.handle(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[test]
    fn empty_router() {
        let router = Router::new();
        assert!(router.is_empty());
        assert!(router.resolve(&Method::GET, "/").is_none());
    }
}
