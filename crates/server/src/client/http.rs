//! reqwest-backed FHIR client

use std::time::Duration;

use async_trait::async_trait;
use fhir_portal_core::{Bundle, OperationOutcome};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde_json::Value as JsonValue;

use super::{ClientError, FhirClient};

const FHIR_JSON: &str = "application/fhir+json";

/// Client for a FHIR R4 server's REST API
#[derive(Clone)]
pub struct HttpFhirClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFhirClient {
    /// Create a client for `base_url` (e.g. `https://hapi.fhir.org/baseR4`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Turn a non-success response into a [`ClientError`].
    async fn check(
        response: Response,
        resource_type: &str,
        id: &str,
    ) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) && !id.is_empty() {
            return Err(ClientError::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<OperationOutcome>(&body)
            .ok()
            .and_then(|outcome| outcome.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn json_body(response: Response) -> Result<JsonValue, ClientError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FhirClient for HttpFhirClient {
    async fn search(
        &self,
        resource_type: &str,
        params: &[(String, String)],
    ) -> Result<Vec<JsonValue>, ClientError> {
        tracing::debug!(resource_type, ?params, "FHIR search");

        let response = self
            .http
            .get(self.url(&[resource_type]))
            .header(ACCEPT, FHIR_JSON)
            .query(params)
            .send()
            .await?;
        let response = Self::check(response, resource_type, "").await?;

        let body = Self::json_body(response).await?;
        let bundle: Bundle =
            serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;

        if let Some(next) = bundle.next_link() {
            tracing::debug!(resource_type, next, "Search result has more pages");
        }

        Ok(bundle.into_resources())
    }

    async fn read(&self, resource_type: &str, id: &str) -> Result<JsonValue, ClientError> {
        let response = self
            .http
            .get(self.url(&[resource_type, id]))
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;
        let response = Self::check(response, resource_type, id).await?;

        Self::json_body(response).await
    }

    async fn save(&self, resource: &JsonValue) -> Result<JsonValue, ClientError> {
        let resource_type = resource
            .get("resourceType")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ClientError::InvalidResource("missing resourceType".into()))?;
        let id = resource.get("id").and_then(|v| v.as_str()).unwrap_or("");

        let request = if id.is_empty() {
            self.http.post(self.url(&[resource_type]))
        } else {
            self.http.put(self.url(&[resource_type, id]))
        };

        let response = request
            .header(ACCEPT, FHIR_JSON)
            .header(CONTENT_TYPE, FHIR_JSON)
            .json(resource)
            .send()
            .await?;
        let response = Self::check(response, resource_type, id).await?;

        // Servers may answer with an empty body (Prefer: return=minimal)
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(resource.clone());
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn delete(&self, resource_type: &str, id: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&[resource_type, id]))
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;
        Self::check(response, resource_type, id).await?;

        Ok(())
    }

    async fn metadata(&self) -> Result<JsonValue, ClientError> {
        let response = self
            .http
            .get(self.url(&["metadata"]))
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;
        let response = Self::check(response, "CapabilityStatement", "").await?;

        Self::json_body(response).await
    }
}
