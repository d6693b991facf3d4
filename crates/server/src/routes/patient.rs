//! Patient page handlers
//!
//! Failures talking to the FHIR server never surface as error pages: they are
//! logged, turned into a flash notification and the user is sent back to the
//! patient list or summary.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use fhir_portal_core::{
    FormFields, apply_form, edit_values, patient_from_form, project_patient, selected_languages,
    summarize,
};
use serde::Deserialize;
use uuid::Uuid;

use super::render;
use crate::AppState;
use crate::flash::{Flash, redirect_with};
use crate::paths;
use crate::views;
use crate::views::patient::PatientForm;

const PATIENT: &str = "Patient";

/// Number of patients shown on the list page
const LIST_COUNT: &str = "100";

/// `?patient_id=` of the edit and delete pages
#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    #[serde(default)]
    pub patient_id: String,
}

impl PatientQuery {
    fn id(&self) -> Option<&str> {
        let id = self.patient_id.trim();
        (!id.is_empty()).then_some(id)
    }
}

fn missing_id() -> Response {
    redirect_with(paths::PATIENT_LIST, Flash::danger("No patient ID was given."))
}

/// GET|POST /hl7/patient_summary/fhir/select - Most recently updated patients
pub async fn list(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let params = vec![
        ("_sort".to_string(), "-_lastUpdated".to_string()),
        ("_count".to_string(), LIST_COUNT.to_string()),
    ];

    match state.client.search(PATIENT, &params).await {
        Ok(patients) => {
            let patients: Vec<_> = patients.iter().map(summarize).collect();
            tracing::debug!(count = patients.len(), "Fetched patient list");
            render(&headers, None, |flash| views::patient::list(flash, &patients))
        }
        Err(e) => {
            tracing::error!(error = %e, "Patient list failed");
            let flash = Flash::danger(format!("Error fetching patient list: {}", e));
            render(&headers, Some(flash), |flash| views::patient::list(flash, &[]))
        }
    }
}

/// POST /hl7/patient_summary/fhir/patient - Jump to the summary of the posted id
pub async fn select(body: String) -> Response {
    let form = FormFields::parse(&body);
    match form.get("patient_id") {
        "" => missing_id(),
        id => Redirect::to(&paths::summary(id)).into_response(),
    }
}

/// GET /hl7/patient_summary/fhir/{patient_id} - Patient summary
pub async fn summary(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    render_summary(&state, &patient_id, &headers).await
}

/// GET /hl7/patient_summary/fhir/patient?patient_id= - Patient summary for ids
/// that the fixed pages shadow; without an id, back to the list
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
    headers: HeaderMap,
) -> Response {
    match query.id() {
        Some(patient_id) => render_summary(&state, patient_id, &headers).await,
        None => Redirect::to(paths::PATIENT_LIST).into_response(),
    }
}

async fn render_summary(state: &AppState, patient_id: &str, headers: &HeaderMap) -> Response {
    match state.client.read(PATIENT, patient_id).await {
        Ok(patient) => {
            let record = project_patient(&patient);
            render(headers, None, |flash| {
                views::patient::summary(flash, patient_id, &record, &patient)
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, patient_id = %patient_id, "Patient read failed");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("The patient ID was not found: {}", e)),
            )
        }
    }
}

/// GET /hl7/patient_summary/fhir/patient/edit - Edit form prefilled from the server
pub async fn edit_form(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(patient_id) = query.id() else {
        return missing_id();
    };

    match state.client.read(PATIENT, patient_id).await {
        Ok(patient) => {
            let form = PatientForm {
                heading: "Edit Patient",
                action: paths::edit(patient_id),
                values: edit_values(&patient),
                languages: selected_languages(&patient),
            };
            render(&headers, None, |flash| views::patient::form(flash, &form))
        }
        Err(e) => {
            tracing::warn!(error = %e, patient_id = %patient_id, "Patient read failed");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("The patient ID was not found: {}", e)),
            )
        }
    }
}

/// POST /hl7/patient_summary/fhir/patient/edit - Apply the form and update the patient
pub async fn update(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
    body: String,
) -> Response {
    let Some(patient_id) = query.id() else {
        return missing_id();
    };
    let form = FormFields::parse(&body);

    let existing = match state.client.read(PATIENT, patient_id).await {
        Ok(existing) => existing,
        Err(e) => {
            tracing::warn!(error = %e, patient_id = %patient_id, "Patient read failed");
            return redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("The patient ID was not found: {}", e)),
            );
        }
    };

    let summary = paths::summary(patient_id);
    let patient = match apply_form(&existing, &form, patient_id) {
        Ok(patient) => patient,
        Err(e) => {
            return redirect_with(
                &summary,
                Flash::danger(format!("Error updating patient: {}", e)),
            );
        }
    };

    match state.client.save(&patient).await {
        Ok(_) => {
            tracing::info!(patient_id = %patient_id, "Patient updated");
            redirect_with(
                &summary,
                Flash::success("Patient information updated successfully."),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, patient_id = %patient_id, "Patient update failed");
            redirect_with(
                &summary,
                Flash::danger(format!("Error updating patient: {}", e)),
            )
        }
    }
}

/// GET /hl7/patient_summary/fhir/patient/new - Empty patient form
pub async fn new_form(headers: HeaderMap) -> Response {
    let form = PatientForm {
        heading: "New Patient",
        action: paths::NEW.to_string(),
        values: vec![("active", "True".to_string())],
        languages: Vec::new(),
    };

    render(&headers, None, |flash| views::patient::form(flash, &form))
}

/// POST /hl7/patient_summary/fhir/patient/new - Create a patient with a fresh id
pub async fn create(State(state): State<AppState>, body: String) -> Response {
    let form = FormFields::parse(&body);
    let patient_id = Uuid::new_v4().simple().to_string();

    let patient = match patient_from_form(&form, &patient_id) {
        Ok(patient) => patient,
        Err(e) => {
            return redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("Error creating new patient: {}", e)),
            );
        }
    };

    match state.client.save(&patient).await {
        Ok(_) => {
            tracing::info!(patient_id = %patient_id, "Patient created");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::success("New patient record created successfully."),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Patient create failed");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("Error creating new patient: {}", e)),
            )
        }
    }
}

/// GET /hl7/patient_summary/fhir/patient/delete - Confirmation page
pub async fn delete_confirm(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
    headers: HeaderMap,
) -> Response {
    let Some(patient_id) = query.id() else {
        return missing_id();
    };

    match state.client.read(PATIENT, patient_id).await {
        Ok(patient) => {
            let record = project_patient(&patient);
            render(&headers, None, |flash| {
                views::patient::delete_confirm(flash, patient_id, &record)
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, patient_id = %patient_id, "Patient read failed");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("Error fetching patient record: {}", e)),
            )
        }
    }
}

/// POST /hl7/patient_summary/fhir/patient/delete - Delete the patient
pub async fn delete(State(state): State<AppState>, Query(query): Query<PatientQuery>) -> Response {
    let Some(patient_id) = query.id() else {
        return missing_id();
    };

    match state.client.delete(PATIENT, patient_id).await {
        Ok(()) => {
            tracing::info!(patient_id = %patient_id, "Patient deleted");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::success("Patient record deleted successfully."),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, patient_id = %patient_id, "Patient delete failed");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("Error deleting patient record: {}", e)),
            )
        }
    }
}
