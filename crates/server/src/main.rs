//! fhir-portal: web front end for a FHIR R4 server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fhir_portal::client::HttpFhirClient;
use fhir_portal::config::Config;

#[tokio::main]
async fn main() {
    // Missing .env is fine; the process environment still applies
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();

    if config.development {
        tracing::warn!("Development mode enabled");
    }
    tracing::info!(
        fhir_server = %config.fhir_server_url,
        timeout_secs = config.request_timeout_secs,
        "Using FHIR server"
    );

    let client = HttpFhirClient::new(
        config.fhir_server_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .expect("Failed to create FHIR client");

    // Build application
    let app = fhir_portal::build_app(Arc::new(client), &config);

    // Start server
    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting FHIR portal on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// Resolve on Ctrl+C or SIGTERM so in-flight page requests can finish
async fn shutdown_signal() {
    use tokio::signal;

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Ctrl+C handler failed");
            }
            "Ctrl+C"
        }
        _ = terminate => "SIGTERM",
    };

    tracing::info!(signal = received, "Starting graceful shutdown");
}
