//! One-line summaries of search results
//!
//! The search page can return Patient, Practitioner, Observation, Medication
//! or MedicationRequest resources. Each is reduced to a title and a detail
//! line with the same sentinel rules as the patient projection.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::path::{first, lookup, lookup_str, scalar_text};
use crate::projector::{NOT_AVAILABLE, address, human_name};

/// Summary of a single search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub resource_type: String,
    pub id: String,
    pub title: String,
    pub detail: String,
}

/// Summarize any resource returned from a search.
pub fn summarize(resource: &JsonValue) -> ResourceSummary {
    let resource_type = lookup_str(resource, "resourceType").unwrap_or(NOT_AVAILABLE);

    let (title, detail) = match resource_type {
        "Patient" => (
            first(resource, "name").and_then(human_name),
            lookup_str(resource, "birthDate").map(str::to_string),
        ),
        "Practitioner" => (
            first(resource, "name").and_then(human_name),
            first(resource, "address").and_then(address),
        ),
        "Observation" => (codeable_concept(resource, "code"), observation_value(resource)),
        "Medication" => (
            codeable_concept(resource, "code"),
            codeable_concept(resource, "form"),
        ),
        "MedicationRequest" => (
            codeable_concept(resource, "medicationCodeableConcept")
                .or_else(|| lookup_str(resource, "medicationReference.reference").map(str::to_string)),
            lookup_str(resource, "status").map(str::to_string),
        ),
        _ => (None, None),
    };

    ResourceSummary {
        resource_type: resource_type.to_string(),
        id: lookup_str(resource, "id").unwrap_or(NOT_AVAILABLE).to_string(),
        title: title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        detail: detail.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

/// `text` of a CodeableConcept, falling back to its first coding's display
/// and then its code.
fn codeable_concept(resource: &JsonValue, element: &str) -> Option<String> {
    let concept = lookup(resource, element)?;
    lookup_str(concept, "text")
        .or_else(|| lookup_str(concept, "coding.0.display"))
        .or_else(|| lookup_str(concept, "coding.0.code"))
        .map(str::to_string)
}

fn observation_value(observation: &JsonValue) -> Option<String> {
    if let Some(quantity) = lookup(observation, "valueQuantity") {
        let value = lookup(quantity, "value").and_then(scalar_text)?;
        return Some(match lookup_str(quantity, "unit") {
            Some(unit) => format!("{} {}", value, unit),
            None => value,
        });
    }

    codeable_concept(observation, "valueCodeableConcept")
        .or_else(|| lookup(observation, "valueString").and_then(scalar_text))
        .or_else(|| lookup(observation, "valueBoolean").and_then(scalar_text))
        .or_else(|| lookup(observation, "valueInteger").and_then(scalar_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summarize_patient() {
        let summary = summarize(&json!({
            "resourceType": "Patient",
            "id": "p1",
            "name": [{"given": ["Jane"], "family": "Doe"}],
            "birthDate": "1980-05-12"
        }));

        assert_eq!(summary.resource_type, "Patient");
        assert_eq!(summary.id, "p1");
        assert_eq!(summary.title, "Jane Doe");
        assert_eq!(summary.detail, "1980-05-12");
    }

    #[test]
    fn test_summarize_practitioner() {
        let summary = summarize(&json!({
            "resourceType": "Practitioner",
            "id": "dr1",
            "name": [{"given": ["Gregory"], "family": "House", "use": "official"}],
            "address": [{"city": "Princeton", "state": "NJ"}]
        }));

        assert_eq!(summary.title, "Gregory House (official)");
        assert_eq!(summary.detail, "Princeton, NJ");
    }

    #[test]
    fn test_summarize_observation_quantity() {
        let summary = summarize(&json!({
            "resourceType": "Observation",
            "id": "obs1",
            "code": {"coding": [{"system": "http://loinc.org", "code": "8867-4", "display": "Heart rate"}]},
            "valueQuantity": {"value": 72, "unit": "beats/minute"}
        }));

        assert_eq!(summary.title, "Heart rate");
        assert_eq!(summary.detail, "72 beats/minute");
    }

    #[test]
    fn test_summarize_observation_without_value() {
        let summary = summarize(&json!({
            "resourceType": "Observation",
            "code": {"text": "Smoking status"}
        }));

        assert_eq!(summary.title, "Smoking status");
        assert_eq!(summary.detail, NOT_AVAILABLE);
        assert_eq!(summary.id, NOT_AVAILABLE);
    }

    #[test]
    fn test_summarize_medication_and_request() {
        let medication = summarize(&json!({
            "resourceType": "Medication",
            "code": {"coding": [{"code": "313782"}]},
            "form": {"text": "Tablet"}
        }));
        let request = summarize(&json!({
            "resourceType": "MedicationRequest",
            "status": "active",
            "medicationReference": {"reference": "Medication/med1"}
        }));

        assert_eq!(medication.title, "313782");
        assert_eq!(medication.detail, "Tablet");
        assert_eq!(request.title, "Medication/med1");
        assert_eq!(request.detail, "active");
    }

    #[test]
    fn test_summarize_unknown_or_malformed() {
        let unknown = summarize(&json!({"resourceType": "Device", "id": "d1"}));
        let malformed = summarize(&json!(["not", "a", "resource"]));

        assert_eq!(unknown.title, NOT_AVAILABLE);
        assert_eq!(unknown.id, "d1");
        assert_eq!(malformed.resource_type, NOT_AVAILABLE);
        assert_eq!(malformed.title, NOT_AVAILABLE);
    }
}
