//! Search form to FHIR search parameters

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::form::FormFields;

/// Resource types the search page can query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Patient,
    Practitioner,
    Observation,
    Medication,
    MedicationRequest,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Patient,
        ResourceKind::Practitioner,
        ResourceKind::Observation,
        ResourceKind::Medication,
        ResourceKind::MedicationRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Practitioner => "Practitioner",
            ResourceKind::Observation => "Observation",
            ResourceKind::Medication => "Medication",
            ResourceKind::MedicationRequest => "MedicationRequest",
        }
    }

    /// (form field, FHIR search parameter) pairs accepted for this type
    pub fn filters(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ResourceKind::Patient => &[
                ("id", "_id"),
                ("given", "given"),
                ("family", "family"),
                ("birthdate", "birthdate"),
            ],
            ResourceKind::Practitioner => &[
                ("practitioner_id", "_id"),
                ("practitioner_given", "given"),
                ("practitioner_family", "family"),
                ("practitioner_city", "address-city"),
            ],
            ResourceKind::Observation => &[
                ("observation_id", "_id"),
                ("observation_code", "code"),
                ("observation_performer", "performer"),
            ],
            ResourceKind::Medication => &[
                ("medication_id", "_id"),
                ("lot_number", "lot-number"),
                ("ingredient_code", "ingredient-code"),
                ("medication_name", "identifier"),
                ("dose_form", "form"),
            ],
            ResourceKind::MedicationRequest => &[
                ("medication_request_id", "_id"),
                ("medication_request_status", "status"),
                ("medication_request_medication", "medication"),
                ("medication_request_patient", "patient"),
            ],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnsupportedResourceType(s.to_string()))
    }
}

/// FHIR search parameters for `kind` taken from the search form.
///
/// Only the filters belonging to `kind` are read, and blank filters are
/// dropped so they never reach the server as empty constraints.
pub fn search_params(kind: ResourceKind, form: &FormFields) -> Vec<(String, String)> {
    kind.filters()
        .iter()
        .filter_map(|(field, param)| {
            let value = form.get(field);
            (!value.is_empty()).then(|| (param.to_string(), value.to_string()))
        })
        .collect()
}
