//! Axum router — URL paths, CORS policy, request tracing.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers::potency::get_potency;
use crate::handlers::root::index;
use crate::state::{AppState, SharedState};

/// Build and return the full router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/", get(index))
        .route("/get_potency", post(get_potency))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// CORS restricted to the configured origins. A literal `"*"` opens the
/// API fully and is only meant for local demos.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        warn!("CORS allows all origins; restrict this outside local demos");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
