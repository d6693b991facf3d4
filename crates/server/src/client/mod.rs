//! FHIR server client
//!
//! Route handlers only see the [`FhirClient`] trait so tests can swap the
//! HTTP implementation for an in-memory one.

mod http;

pub use http::HttpFhirClient;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors talking to the FHIR server
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not reach the FHIR server: {0}")]
    Connection(String),

    #[error("The FHIR server did not answer in time: {0}")]
    Timeout(String),

    #[error("{resource_type}/{id} was not found")]
    NotFound { resource_type: String, id: String },

    #[error("The FHIR server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from the FHIR server: {0}")]
    Decode(String),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

/// Operations the portal needs from a FHIR server
#[async_trait]
pub trait FhirClient: Send + Sync {
    /// Search `resource_type` and return the resources of the first page
    async fn search(
        &self,
        resource_type: &str,
        params: &[(String, String)],
    ) -> Result<Vec<JsonValue>, ClientError>;

    /// Read a single resource
    async fn read(&self, resource_type: &str, id: &str) -> Result<JsonValue, ClientError>;

    /// Create or update a resource: update when it carries an `id`, create otherwise
    async fn save(&self, resource: &JsonValue) -> Result<JsonValue, ClientError>;

    /// Delete a resource
    async fn delete(&self, resource_type: &str, id: &str) -> Result<(), ClientError>;

    /// Fetch the server's CapabilityStatement
    async fn metadata(&self) -> Result<JsonValue, ClientError>;
}
