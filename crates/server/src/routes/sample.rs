//! Sample patient summary pages

use axum::{extract::State, http::HeaderMap, response::Response};
use fhir_portal_core::sample::SAMPLE_PATIENT_ID;
use fhir_portal_core::{fhir_to_cda, sample_patient, sample_patient_bundle};

use super::render;
use crate::AppState;
use crate::error::AppError;
use crate::flash::{Flash, redirect_with};
use crate::{paths, views};

/// GET /hl7/patient_summary/fhir/json - Sample bundle as pretty printed JSON
pub async fn bundle_json(headers: HeaderMap) -> Result<Response, AppError> {
    let json = serde_json::to_string_pretty(&sample_patient_bundle())
        .map_err(|e| AppError::Internal(format!("Error generating patient record: {}", e)))?;

    Ok(render(&headers, None, |flash| {
        views::sample::bundle_json(flash, &json)
    }))
}

/// GET /hl7/patient_summary/cda - Sample bundle converted to CDA
pub async fn cda(headers: HeaderMap) -> Result<Response, AppError> {
    let xml = fhir_to_cda(&sample_patient_bundle())?;

    Ok(render(&headers, None, |flash| views::sample::cda(flash, &xml)))
}

/// POST /hl7/patient_summary/fhir/upload - Store the sample patient on the
/// FHIR server and show its summary
pub async fn upload(State(state): State<AppState>) -> Response {
    match state.client.save(&sample_patient()).await {
        Ok(_) => {
            tracing::info!(patient_id = SAMPLE_PATIENT_ID, "Sample patient uploaded");
            redirect_with(
                &paths::summary(SAMPLE_PATIENT_ID),
                Flash::success("Sample patient uploaded successfully."),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Sample patient upload failed");
            redirect_with(
                paths::SAMPLE_JSON,
                Flash::danger(format!("Error uploading sample patient: {}", e)),
            )
        }
    }
}
