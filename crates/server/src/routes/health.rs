//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    fhir_server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fhir_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check that the FHIR server answers its capability statement
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    let fhir_server = state.config.fhir_server_url.clone();

    match state.client.metadata().await {
        Ok(capability) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                fhir_server,
                fhir_version: capability
                    .get("fhirVersion")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                reason: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    fhir_server,
                    fhir_version: None,
                    reason: Some(e.to_string()),
                }),
            )
        }
    }
}
