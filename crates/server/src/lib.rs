//! fhir-portal library crate
//!
//! Exposes `build_app`, `config` and the FHIR client so integration tests can
//! drive the portal against an in-memory server. The binary entrypoint is in
//! `main.rs`.

pub mod client;
pub mod config;
mod error;
pub mod flash;
mod middleware;
pub mod paths;
mod routes;
mod views;

use std::sync::Arc;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use tower_http::trace::TraceLayer;

use client::FhirClient;
use config::Config;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn FhirClient>,
    pub config: Arc<Config>,
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(client: Arc<dyn FhirClient>, config: &Config) -> Router {
    let state = AppState {
        client,
        config: Arc::new(config.clone()),
    };

    // Repeated installs (e.g. across integration tests) are ignored; the
    // handle still renders what the first recorder collects.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let operational_routes = Router::new()
        .route(paths::HEALTH, get(routes::health::check))
        .route(paths::METRICS, get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    Router::new()
        .merge(operational_routes)
        .merge(routes::portal_routes())
        .fallback(routes::not_found)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
