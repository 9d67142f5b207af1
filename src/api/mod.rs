//! API module
//!
//! HTTP API endpoints, shared state and middleware.

pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    http::{HeaderName, HeaderValue},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use routes::create_router;
pub use state::AppState;

/// Build the application router
///
/// An empty origin list allows any origin.
pub fn build_app(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let correlation_header = HeaderName::from_static(middleware::CORRELATION_ID_HEADER);

    let api_routes =
        create_router().layer(axum::middleware::from_fn(middleware::logging_middleware));

    // Layers run outermost-last: CORS, then request id, then tracing
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(correlation_header.clone()))
        .layer(SetRequestIdLayer::new(correlation_header, MakeRequestUuid))
        .layer(cors_layer(cors_allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(middleware::CORRELATION_ID_HEADER)]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
