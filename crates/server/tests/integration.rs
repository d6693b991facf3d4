//! Integration tests for the FHIR patient portal.
//!
//! The router is driven through `tower::ServiceExt::oneshot` against an
//! in-memory `FhirClient`, so no FHIR server or network is needed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use fhir_portal::client::{ClientError, FhirClient};
use fhir_portal::config::Config;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// In-memory FHIR server keyed by `Type/id`
#[derive(Default)]
struct FakeFhirClient {
    resources: Mutex<HashMap<String, JsonValue>>,
    searches: Mutex<Vec<(String, Vec<(String, String)>)>>,
    offline: bool,
}

impl FakeFhirClient {
    fn with(resources: Vec<JsonValue>) -> Self {
        let client = Self::default();
        for resource in resources {
            client.insert(resource);
        }
        client
    }

    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn insert(&self, resource: JsonValue) {
        let key = format!(
            "{}/{}",
            resource["resourceType"].as_str().unwrap(),
            resource["id"].as_str().unwrap()
        );
        self.resources.lock().unwrap().insert(key, resource);
    }

    fn get(&self, resource_type: &str, id: &str) -> Option<JsonValue> {
        self.resources
            .lock()
            .unwrap()
            .get(&format!("{}/{}", resource_type, id))
            .cloned()
    }

    fn all(&self, resource_type: &str) -> Vec<JsonValue> {
        self.resources
            .lock()
            .unwrap()
            .values()
            .filter(|r| r["resourceType"] == resource_type)
            .cloned()
            .collect()
    }

    fn check_online(&self) -> Result<(), ClientError> {
        if self.offline {
            return Err(ClientError::Connection("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl FhirClient for FakeFhirClient {
    async fn search(
        &self,
        resource_type: &str,
        params: &[(String, String)],
    ) -> Result<Vec<JsonValue>, ClientError> {
        self.check_online()?;
        self.searches
            .lock()
            .unwrap()
            .push((resource_type.to_string(), params.to_vec()));
        Ok(self.all(resource_type))
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<JsonValue, ClientError> {
        self.check_online()?;
        self.get(resource_type, id).ok_or_else(|| ClientError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        })
    }

    async fn save(&self, resource: &JsonValue) -> Result<JsonValue, ClientError> {
        self.check_online()?;
        self.insert(resource.clone());
        Ok(resource.clone())
    }

    async fn delete(&self, resource_type: &str, id: &str) -> Result<(), ClientError> {
        self.check_online()?;
        self.resources
            .lock()
            .unwrap()
            .remove(&format!("{}/{}", resource_type, id));
        Ok(())
    }

    async fn metadata(&self) -> Result<JsonValue, ClientError> {
        self.check_online()?;
        Ok(json!({"resourceType": "CapabilityStatement", "fhirVersion": "4.0.1"}))
    }
}

fn test_config() -> Config {
    Config {
        bind_address: "0.0.0.0:0".to_string(),
        fhir_server_url: "http://fhir.test/baseR4".to_string(),
        development: true,
        request_timeout_secs: 5,
    }
}

fn test_app(client: Arc<FakeFhirClient>) -> Router {
    fhir_portal::build_app(client, &test_config())
}

fn jane() -> JsonValue {
    json!({
        "resourceType": "Patient",
        "id": "12345",
        "meta": {"profile": ["http://hl7.org/fhir/us/core/StructureDefinition/us-core-patient"]},
        "identifier": [{"system": "urn:mrn", "value": "MRN-1"}],
        "name": [{"use": "official", "given": ["Jane"], "family": "Doe"}],
        "gender": "female",
        "birthDate": "1980-05-12",
        "telecom": [
            {"system": "phone", "value": "555-0100", "use": "home"},
            {"system": "email", "value": "jane@example.org"}
        ],
        "text": {"status": "generated", "div": "<div xmlns=\"http://www.w3.org/1999/xhtml\"><p>Jane Doe</p></div>"}
    })
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("Request failed")
}

async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Decoded flash cookie of a redirect, as `level|message`
fn flash_of(response: &Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Missing Set-Cookie header")
        .to_str()
        .unwrap();
    let value = cookie
        .split(';')
        .next()
        .unwrap()
        .strip_prefix("flash=")
        .expect("Not a flash cookie");
    urlencoding::decode(value).unwrap().into_owned()
}

fn location_of(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_index_page() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let html = body_text(response).await;
    assert!(html.contains("/hl7/patient_summary/fhir/select"));
}

#[tokio::test]
async fn test_patient_list_requests_recent_patients() {
    let client = Arc::new(FakeFhirClient::with(vec![jane()]));
    let app = test_app(client.clone());

    let response = send(&app, get("/hl7/patient_summary/fhir/select")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"<a href="/hl7/patient_summary/fhir/12345">12345</a>"#));
    assert!(html.contains("Jane Doe (official)"));

    let searches = client.searches.lock().unwrap();
    assert_eq!(searches[0].0, "Patient");
    assert!(searches[0].1.contains(&("_sort".to_string(), "-_lastUpdated".to_string())));
    assert!(searches[0].1.contains(&("_count".to_string(), "100".to_string())));
}

#[tokio::test]
async fn test_patient_list_upstream_failure_shows_flash() {
    let app = test_app(Arc::new(FakeFhirClient::offline()));

    let response = send(&app, get("/hl7/patient_summary/fhir/select")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("alert-danger"));
    assert!(html.contains("Error fetching patient list"));
}

#[tokio::test]
async fn test_patient_summary() {
    let app = test_app(Arc::new(FakeFhirClient::with(vec![jane()])));

    let response = send(&app, get("/hl7/patient_summary/fhir/12345")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<td>Jane Doe (official)</td>"));
    assert!(html.contains("<td>555-0100 (home)</td>"));
    assert!(html.contains("<td>jane@example.org</td>"));
    assert!(html.contains("<td>urn:mrn - MRN-1</td>"));
    assert!(html.contains(
        r#"<a href="http://hl7.org/fhir/us/core/StructureDefinition/us-core-patient" target="_blank">"#
    ));
    assert!(html.contains("<p>Jane Doe</p>"));
}

#[tokio::test]
async fn test_select_redirects_to_summary() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient", "patient_id=12345"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/12345");
}

#[tokio::test]
async fn test_unknown_patient_redirects_with_flash() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(&app, get("/hl7/patient_summary/fhir/nope")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/select");
    assert!(flash_of(&response).starts_with("alert-danger|The patient ID was not found"));
}

#[tokio::test]
async fn test_flash_cookie_is_shown_then_cleared() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let request = Request::builder()
        .uri("/")
        .header(header::COOKIE, "flash=alert-success%7CSaved%20it")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("flash=;"));
    assert!(cookie.contains("Max-Age=0"));

    let html = body_text(response).await;
    assert!(html.contains(r#"<div class="alert alert-success" role="alert">Saved it</div>"#));
}

#[tokio::test]
async fn test_search_patients() {
    let client = Arc::new(FakeFhirClient::with(vec![jane()]));
    let app = test_app(client.clone());

    let response = send(
        &app,
        post_form(
            "/hl7/patient_summary/fhir/patient/search",
            "resource_type=Patient&id=&given=Jane&family=&birthdate=&practitioner_given=Greg",
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("1 Patient results for given=Jane."));
    assert!(html.contains(r#"<a href="/hl7/patient_summary/fhir/12345">12345</a>"#));

    let searches = client.searches.lock().unwrap();
    assert_eq!(
        searches[0],
        (
            "Patient".to_string(),
            vec![("given".to_string(), "Jane".to_string())]
        )
    );
}

#[tokio::test]
async fn test_search_unsupported_type_redirects() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient/search", "resource_type=Encounter"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/patient/search");
    assert_eq!(flash_of(&response), "alert-danger|Unsupported resource type: Encounter");
}

#[tokio::test]
async fn test_search_upstream_failure_redirects_to_list() {
    let app = test_app(Arc::new(FakeFhirClient::offline()));

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient/search", "resource_type=Observation"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/select");
    assert!(flash_of(&response).starts_with("alert-danger|"));
}

#[tokio::test]
async fn test_create_patient() {
    let client = Arc::new(FakeFhirClient::default());
    let app = test_app(client.clone());

    let response = send(
        &app,
        post_form(
            "/hl7/patient_summary/fhir/patient/new",
            "given_name=Ann&family_name=Lee&birth_date=1990-01-02&gender=female&email=ann%40example.org",
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/select");
    assert_eq!(
        flash_of(&response),
        "alert-success|New patient record created successfully."
    );

    let patients = client.all("Patient");
    assert_eq!(patients.len(), 1);
    let patient = &patients[0];
    assert_eq!(patient["id"].as_str().unwrap().len(), 32);
    assert_eq!(patient["name"][0]["family"], "Lee");
    assert_eq!(patient["telecom"][1]["value"], "ann@example.org");
}

#[tokio::test]
async fn test_create_patient_rejects_bad_date() {
    let client = Arc::new(FakeFhirClient::default());
    let app = test_app(client.clone());

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient/new", "birth_date=12%2F05%2F1980"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_of(&response).starts_with("alert-danger|Error creating new patient"));
    assert!(client.all("Patient").is_empty());
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = test_app(Arc::new(FakeFhirClient::with(vec![jane()])));

    let response = send(
        &app,
        get("/hl7/patient_summary/fhir/patient/edit?patient_id=12345"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"name="given_name" value="Jane""#));
    assert!(html.contains(r#"name="email" value="jane@example.org""#));
    assert!(html.contains(r#"action="/hl7/patient_summary/fhir/patient/edit?patient_id=12345""#));
}

#[tokio::test]
async fn test_edit_patient_keeps_unmanaged_elements() {
    let client = Arc::new(FakeFhirClient::with(vec![jane()]));
    let app = test_app(client.clone());

    let response = send(
        &app,
        post_form(
            "/hl7/patient_summary/fhir/patient/edit?patient_id=12345",
            "given_name=Janet&family_name=Doe&gender=female&phone=555-0199",
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/12345");
    assert_eq!(
        flash_of(&response),
        "alert-success|Patient information updated successfully."
    );

    let patient = client.get("Patient", "12345").unwrap();
    assert_eq!(patient["name"][0]["given"][0], "Janet");
    assert_eq!(patient["telecom"][0]["value"], "555-0199");
    assert!(patient.get("birthDate").is_none());
    assert_eq!(patient["identifier"][0]["value"], "MRN-1");
    assert_eq!(patient["text"]["status"], "generated");
}

#[tokio::test]
async fn test_edit_round_trip_keeps_partial_birth_date() {
    let mut patient = jane();
    patient["birthDate"] = json!("1980-05");
    let client = Arc::new(FakeFhirClient::with(vec![patient]));
    let app = test_app(client.clone());

    let form = send(
        &app,
        get("/hl7/patient_summary/fhir/patient/edit?patient_id=12345"),
    )
    .await;
    let html = body_text(form).await;
    assert!(html.contains(r#"name="birth_date" value="1980-05""#));

    let response = send(
        &app,
        post_form(
            "/hl7/patient_summary/fhir/patient/edit?patient_id=12345",
            "given_name=Jane&family_name=Doe&gender=female&birth_date=1980-05",
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/12345");
    let saved = client.get("Patient", "12345").unwrap();
    assert_eq!(saved["birthDate"], "1980-05");
}

#[tokio::test]
async fn test_edit_without_id_redirects() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(&app, get("/hl7/patient_summary/fhir/patient/edit")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/select");
}

#[tokio::test]
async fn test_delete_patient() {
    let client = Arc::new(FakeFhirClient::with(vec![jane()]));
    let app = test_app(client.clone());

    let confirm = send(
        &app,
        get("/hl7/patient_summary/fhir/patient/delete?patient_id=12345"),
    )
    .await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(body_text(confirm).await.contains("Jane Doe (official)"));

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient/delete?patient_id=12345", ""),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        flash_of(&response),
        "alert-success|Patient record deleted successfully."
    );
    assert!(client.get("Patient", "12345").is_none());
}

#[tokio::test]
async fn test_delete_upstream_failure() {
    let app = test_app(Arc::new(FakeFhirClient::offline()));

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient/delete?patient_id=12345", ""),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_of(&response).starts_with("alert-danger|Error deleting patient record"));
}

#[tokio::test]
async fn test_sample_pages() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let json_page = send(&app, get("/hl7/patient_summary/fhir/json")).await;
    assert_eq!(json_page.status(), StatusCode::OK);
    assert!(body_text(json_page).await.contains(r#""id": "bundle1""#));

    let cda_page = send(&app, get("/hl7/patient_summary/cda")).await;
    assert_eq!(cda_page.status(), StatusCode::OK);
    let html = body_text(cda_page).await;
    assert!(html.contains("&lt;ClinicalDocument xmlns=\"urn:hl7-org:v3\"&gt;"));
    assert!(html.contains("&lt;name&gt;Jane Doe&lt;/name&gt;"));
}

#[tokio::test]
async fn test_upload_sample_patient() {
    let client = Arc::new(FakeFhirClient::default());
    let app = test_app(client.clone());

    let json_page = send(&app, get("/hl7/patient_summary/fhir/json")).await;
    assert!(body_text(json_page)
        .await
        .contains(r#"action="/hl7/patient_summary/fhir/upload""#));

    let response = send(&app, post_form("/hl7/patient_summary/fhir/upload", "")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/12345");
    assert_eq!(
        flash_of(&response),
        "alert-success|Sample patient uploaded successfully."
    );

    let patient = client.get("Patient", "12345").unwrap();
    assert_eq!(patient["name"][0]["family"], "Doe");
    assert!(client.all("AllergyIntolerance").is_empty());
}

#[tokio::test]
async fn test_upload_sample_patient_upstream_failure() {
    let app = test_app(Arc::new(FakeFhirClient::offline()));

    let response = send(&app, post_form("/hl7/patient_summary/fhir/upload", "")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/json");
    assert!(flash_of(&response).starts_with("alert-danger|Error uploading sample patient"));
}

#[tokio::test]
async fn test_patient_with_reserved_id_is_reachable() {
    let mut patient = jane();
    patient["id"] = json!("select");
    let app = test_app(Arc::new(FakeFhirClient::with(vec![patient])));

    let response = send(
        &app,
        post_form("/hl7/patient_summary/fhir/patient", "patient_id=select"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = location_of(&response).to_string();
    assert_eq!(location, "/hl7/patient_summary/fhir/patient?patient_id=select");

    let response = send(&app, get(&location)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<td>Jane Doe (official)</td>"));
    assert!(html.contains("/hl7/patient_summary/fhir/patient/edit?patient_id=select"));
}

#[tokio::test]
async fn test_select_page_without_id_redirects_to_list() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(&app, get("/hl7/patient_summary/fhir/patient")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/hl7/patient_summary/fhir/select");
}

#[tokio::test]
async fn test_unknown_route_returns_404_page() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    let response = send(&app, get("/no/such/page")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let html = body_text(response).await;
    assert!(html.contains("Page Not Found"));
}

#[tokio::test]
async fn test_health() {
    let healthy = test_app(Arc::new(FakeFhirClient::default()));
    let unhealthy = test_app(Arc::new(FakeFhirClient::offline()));

    let response = send(&healthy, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: JsonValue = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["fhir_version"], "4.0.1");

    let response = send(&unhealthy, get("/health")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: JsonValue = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "unhealthy");
    assert!(body["reason"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app(Arc::new(FakeFhirClient::default()));

    send(&app, get("/")).await;
    let response = send(&app, get("/metrics")).await;

    assert_eq!(response.status(), StatusCode::OK);
}
