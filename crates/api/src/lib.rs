//! HTTP API for the storefront cart and checkout.
//!
//! Provides the checkout session endpoint and cart maintenance endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, BackendInfo, InMemoryBackends};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/checkout/create-session",
            post(routes::checkout::create_session),
        )
        .route(
            "/cart",
            get(routes::cart::get).delete(routes::cart::clear),
        )
        .route("/cart/items", post(routes::cart::add_item))
        .route(
            "/cart/items/{product_id}",
            put(routes::cart::update_item).delete(routes::cart::remove_item),
        )
        .route("/cart/merge", post(routes::cart::merge))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
