//! Sample patient summary bundle
//!
//! A fixed collection Bundle used by the JSON preview page and the CDA
//! conversion page. Its Patient entry is what the sample upload stores.

use serde_json::{Value as JsonValue, json};

pub const SAMPLE_PATIENT_ID: &str = "12345";

/// Patient 12345 with one allergy, medication, condition and procedure.
pub fn sample_patient_bundle() -> JsonValue {
    json!({
        "resourceType": "Bundle",
        "id": "bundle1",
        "type": "collection",
        "entry": [
            {"resource": sample_patient()},
            {"resource": {
                "resourceType": "AllergyIntolerance",
                "id": "allergy1",
                "patient": {"reference": "Patient/12345"},
                "clinicalStatus": {"coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical",
                    "code": "active"
                }]},
                "verificationStatus": {"coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification",
                    "code": "confirmed"
                }]},
                "code": {
                    "coding": [{
                        "system": "http://snomed.info/sct",
                        "code": "91936005",
                        "display": "Allergy to penicillin"
                    }],
                    "text": "Allergy to penicillin"
                },
                "onsetDateTime": "2024-01-01"
            }},
            {"resource": {
                "resourceType": "MedicationStatement",
                "id": "med1",
                "status": "active",
                "subject": {"reference": "Patient/12345", "display": "Jane Doe"},
                "medication": {"concept": {
                    "coding": [{
                        "system": "http://www.nlm.nih.gov/research/umls/rxnorm",
                        "code": "313782",
                        "display": "Amoxicillin 500 MG Oral Tablet"
                    }],
                    "text": "Amoxicillin 500 MG Oral Tablet"
                }},
                "dosage": [{
                    "text": "500 mg/day Oral Tablet",
                    "timing": {"repeat": {"frequency": 1, "period": 1, "periodUnit": "d"}},
                    "route": {"text": "Oral"},
                    "doseAndRate": [{"doseQuantity": {
                        "value": 500,
                        "unit": "mg",
                        "system": "http://unitsofmeasure.org",
                        "code": "mg"
                    }}]
                }],
                "effectivePeriod": {"start": "2024-01-01"}
            }},
            {"resource": {
                "resourceType": "Condition",
                "id": "condition1",
                "subject": {"reference": "Patient/12345"},
                "clinicalStatus": {"coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                    "code": "active",
                    "display": "active"
                }]},
                "verificationStatus": {"text": "confirmed"},
                "category": [{"coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/condition-category",
                    "code": "problem-list-item",
                    "display": "Problem List Item"
                }]}],
                "code": {
                    "coding": [{
                        "system": "http://snomed.info/sct",
                        "code": "36971009",
                        "display": "Bacterial infection"
                    }],
                    "text": "Bacterial infection"
                },
                "onsetDateTime": "2024-01-01"
            }},
            {"resource": {
                "resourceType": "Procedure",
                "id": "procedure1",
                "subject": {"reference": "Patient/12345"},
                "status": "completed",
                "code": {
                    "coding": [{
                        "system": "http://snomed.info/sct",
                        "code": "233258006",
                        "display": "Balloon angioplasty of artery"
                    }],
                    "text": "Previous balloon angioplasty on mid-LAD stenosis with STENT Implantation"
                }
            }}
        ]
    })
}

/// The Patient entry of the sample bundle on its own.
pub fn sample_patient() -> JsonValue {
    json!({
        "resourceType": "Patient",
        "id": SAMPLE_PATIENT_ID,
        "gender": "female",
        "birthDate": "1980-05-12",
        "name": [{"use": "official", "family": "Doe", "given": ["Jane"]}],
        "address": [{
            "use": "home",
            "line": ["123 Main St"],
            "city": "Springfield",
            "state": "IL",
            "postalCode": "62701"
        }]
    })
}
