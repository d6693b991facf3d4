//! URL paths of the portal pages

pub const INDEX: &str = "/";
pub const SAMPLE_JSON: &str = "/hl7/patient_summary/fhir/json";
pub const SAMPLE_CDA: &str = "/hl7/patient_summary/cda";
pub const SAMPLE_UPLOAD: &str = "/hl7/patient_summary/fhir/upload";
pub const PATIENT_LIST: &str = "/hl7/patient_summary/fhir/select";
pub const SEARCH: &str = "/hl7/patient_summary/fhir/patient/search";
pub const SELECT_PATIENT: &str = "/hl7/patient_summary/fhir/patient";
pub const SUMMARY: &str = "/hl7/patient_summary/fhir/{patient_id}";
pub const EDIT: &str = "/hl7/patient_summary/fhir/patient/edit";
pub const NEW: &str = "/hl7/patient_summary/fhir/patient/new";
pub const DELETE: &str = "/hl7/patient_summary/fhir/patient/delete";
pub const HEALTH: &str = "/health";
pub const METRICS: &str = "/metrics";

/// Last segments of fixed pages that shadow `{patient_id}` in [`SUMMARY`]
const RESERVED_IDS: [&str; 4] = ["json", "select", "patient", "upload"];

/// Summary page of a patient. Ids that collide with a fixed page go through
/// the `?patient_id=` form of [`SELECT_PATIENT`] instead.
pub fn summary(patient_id: &str) -> String {
    if RESERVED_IDS.contains(&patient_id) {
        return format!(
            "{}?patient_id={}",
            SELECT_PATIENT,
            urlencoding::encode(patient_id)
        );
    }
    format!("/hl7/patient_summary/fhir/{}", urlencoding::encode(patient_id))
}

pub fn edit(patient_id: &str) -> String {
    format!("{}?patient_id={}", EDIT, urlencoding::encode(patient_id))
}

pub fn delete(patient_id: &str) -> String {
    format!("{}?patient_id={}", DELETE, urlencoding::encode(patient_id))
}
