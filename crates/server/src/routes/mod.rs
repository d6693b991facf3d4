pub mod health;
pub mod metrics;
mod patient;
mod sample;
mod search;

use axum::{
    Router,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};

use crate::AppState;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::{paths, views};

/// Build the portal page routes
pub fn portal_routes() -> Router<AppState> {
    Router::new()
        .route(paths::INDEX, get(index))
        .route(paths::SAMPLE_JSON, get(sample::bundle_json))
        .route(paths::SAMPLE_CDA, get(sample::cda))
        .route(paths::SAMPLE_UPLOAD, post(sample::upload))
        .route(paths::PATIENT_LIST, get(patient::list).post(patient::list))
        .route(paths::SEARCH, get(search::form).post(search::run))
        .route(
            paths::SELECT_PATIENT,
            get(patient::show).post(patient::select),
        )
        .route(
            paths::EDIT,
            get(patient::edit_form).post(patient::update),
        )
        .route(paths::NEW, get(patient::new_form).post(patient::create))
        .route(
            paths::DELETE,
            get(patient::delete_confirm).post(patient::delete),
        )
        .route(paths::SUMMARY, get(patient::summary))
}

/// GET / - Home page
async fn index(headers: HeaderMap) -> Response {
    render(&headers, None, views::index)
}

/// Fallback for unknown URLs
pub async fn not_found() -> AppError {
    AppError::NotFound("The requested URL was not found on the server.".to_string())
}

/// Render a page with the pending flash notification, or with `flash` when
/// the handler has a fresher one. A consumed cookie is cleared.
fn render(
    headers: &HeaderMap,
    flash: Option<Flash>,
    view: impl FnOnce(Option<&Flash>) -> String,
) -> Response {
    let pending = Flash::from_headers(headers);
    let html = view(flash.as_ref().or(pending.as_ref()));

    if pending.is_some() {
        ([(header::SET_COOKIE, flash::clear_cookie())], Html(html)).into_response()
    } else {
        Html(html).into_response()
    }
}
