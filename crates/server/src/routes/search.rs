//! Multi-resource search

use axum::{extract::State, http::HeaderMap, response::Response};
use fhir_portal_core::{FormFields, ResourceKind, search_params, summarize};

use super::render;
use crate::AppState;
use crate::flash::{Flash, redirect_with};
use crate::{paths, views};

/// GET /hl7/patient_summary/fhir/patient/search - Search form
pub async fn form(headers: HeaderMap) -> Response {
    render(&headers, None, views::search::form)
}

/// POST /hl7/patient_summary/fhir/patient/search - Run the search for the
/// selected resource type
pub async fn run(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let form = FormFields::parse(&body);

    let kind: ResourceKind = match form.get("resource_type").parse() {
        Ok(kind) => kind,
        Err(e) => return redirect_with(paths::SEARCH, Flash::danger(e.to_string())),
    };
    let params = search_params(kind, &form);

    match state.client.search(kind.as_str(), &params).await {
        Ok(resources) => {
            let results: Vec<_> = resources.iter().map(summarize).collect();
            tracing::debug!(resource_type = %kind, count = results.len(), "Search finished");
            render(&headers, None, |flash| {
                views::search::results(flash, kind, &params, &results)
            })
        }
        Err(e) => {
            tracing::error!(error = %e, resource_type = %kind, "Search failed");
            redirect_with(
                paths::PATIENT_LIST,
                Flash::danger(format!("Error fetching search results: {}", e)),
            )
        }
    }
}
