//! fhir-portal-core: Display logic for the FHIR patient portal
//!
//! Everything in this crate is pure and I/O-free: projecting FHIR resources
//! into flat display records, the search parameter contract, form-to-resource
//! marshalling and the sample bundle / CDA conversion.

pub mod bundle;
pub mod cda;
pub mod error;
pub mod form;
pub mod outcome;
pub mod path;
pub mod projector;
pub mod sample;
pub mod search;
pub mod summary;

pub use bundle::{Bundle, BundleEntry, BundleLink, BundleType};
pub use cda::fhir_to_cda;
pub use error::{CoreError, Result};
pub use form::{FormFields, apply_form, edit_values, patient_from_form, selected_languages};
pub use outcome::{IssueSeverity, OperationOutcome, OperationOutcomeIssue};
pub use projector::{DisplayRecord, NOT_AVAILABLE, project_patient};
pub use sample::{sample_patient, sample_patient_bundle};
pub use search::{ResourceKind, search_params};
pub use summary::{ResourceSummary, summarize};
