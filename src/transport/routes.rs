use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request};
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::broker::Publisher;
use crate::config::HttpSettings;
use crate::schema::MessageValidator;
use crate::transport::handlers::{healthcheck, ingest, version};

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub validator: MessageValidator,
    pub publisher: Arc<dyn Publisher>,
}

impl AppState {
    pub fn new(validator: MessageValidator, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            validator,
            publisher,
        }
    }
}

/// Builds the router:
/// - `GET /healthcheck`
/// - `GET /api/v1/unitytestapi` (version banner)
/// - `POST /api/v1/unitytestapi` (validate, then publish)
pub fn create_router(state: Arc<AppState>, http: &HttpSettings) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // outside the timeout so a 408 still carries the id
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(TimeoutLayer::new(http.request_timeout()));

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/api/v1/unitytestapi", get(version).post(ingest))
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .layer(middleware)
        .with_state(state)
}
