//! Patient resource to display record projection
//!
//! Every field is extracted independently and degrades to [`NOT_AVAILABLE`]
//! when its source element is absent, empty, too short or of the wrong shape.
//! Projection never fails and never touches its input.
//!
//! Repeated elements (`name`, `address`, `contact`) only contribute their
//! first entry. Telecom is positional: `telecom[0]` is shown as the phone and
//! `telecom[1]` as the email, regardless of each entry's `system`. Resources
//! that list an email first will show it under "Phone"; the create and edit
//! forms always write phone before email, which keeps round trips consistent.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::path::{first, lookup, lookup_array, lookup_str, scalar_text};

/// Sentinel for a field that is absent or could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// Extension carrying a name prefix that belongs to the family name
pub const OWN_PREFIX_EXTENSION: &str =
    "http://hl7.org/fhir/StructureDefinition/humanname-own-prefix";

/// Flat, render-ready view of a Patient resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    pub id: String,
    pub name: String,
    pub identifier: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub source: String,
    pub version_id: String,
    pub last_updated: String,
    /// Profile canonical URLs; rendering them as links is left to the view
    pub profiles: Vec<String>,
    pub active: String,
    pub marital_status: String,
    pub deceased: String,
    pub deceased_age: String,
    pub multiple_birth: String,
    pub multiple_birth_integer: String,
    pub communication: String,
    pub contact: String,
    pub contact_relationship: String,
    pub contact_address: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub general_practitioner: String,
    pub managing_organization: String,
    pub link: String,
    pub photo: String,
    /// Narrative XHTML from the resource, passed through verbatim
    pub text: String,
}

impl DisplayRecord {
    /// Labelled text fields in display order.
    ///
    /// `profiles` is flattened to a comma separated list here; `text` is left
    /// out because it is markup rather than text.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let profiles = if self.profiles.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.profiles.join(", ")
        };

        vec![
            ("ID", self.id.clone()),
            ("Name", self.name.clone()),
            ("Identifier", self.identifier.clone()),
            ("Birth Date", self.birth_date.clone()),
            ("Gender", self.gender.clone()),
            ("Address", self.address.clone()),
            ("Phone", self.phone.clone()),
            ("Email", self.email.clone()),
            ("Source", self.source.clone()),
            ("Version", self.version_id.clone()),
            ("Last Updated", self.last_updated.clone()),
            ("Profile", profiles),
            ("Active", self.active.clone()),
            ("Marital Status", self.marital_status.clone()),
            ("Deceased", self.deceased.clone()),
            ("Deceased Age", self.deceased_age.clone()),
            ("Multiple Birth", self.multiple_birth.clone()),
            ("Birth Order", self.multiple_birth_integer.clone()),
            ("Communication", self.communication.clone()),
            ("Contact", self.contact.clone()),
            ("Contact Relationship", self.contact_relationship.clone()),
            ("Contact Address", self.contact_address.clone()),
            ("Contact Phone", self.contact_phone.clone()),
            ("Contact Email", self.contact_email.clone()),
            ("General Practitioner", self.general_practitioner.clone()),
            ("Managing Organization", self.managing_organization.clone()),
            ("Link", self.link.clone()),
            ("Photo", self.photo.clone()),
        ]
    }
}

/// Project a Patient resource into a [`DisplayRecord`].
pub fn project_patient(patient: &JsonValue) -> DisplayRecord {
    let contact = first(patient, "contact");

    DisplayRecord {
        id: text_at(patient, "id"),
        name: or_na(first(patient, "name").and_then(human_name)),
        identifier: identifiers(patient),
        birth_date: text_at(patient, "birthDate"),
        gender: text_at(patient, "gender"),
        address: or_na(first(patient, "address").and_then(address)),
        phone: or_na(lookup(patient, "telecom.0").and_then(contact_point)),
        email: or_na(lookup(patient, "telecom.1").and_then(contact_point)),
        source: text_at(patient, "meta.source"),
        version_id: text_at(patient, "meta.versionId"),
        last_updated: text_at(patient, "meta.lastUpdated"),
        profiles: lookup_array(patient, "meta.profile")
            .iter()
            .filter_map(|p| p.as_str())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        active: text_at(patient, "active"),
        marital_status: text_at(patient, "maritalStatus.coding.0.display"),
        deceased: or_na(
            lookup(patient, "deceasedDateTime")
                .and_then(scalar_text)
                .or_else(|| lookup(patient, "deceasedBoolean").and_then(scalar_text)),
        ),
        deceased_age: or_na(lookup(patient, "deceasedAge").and_then(age)),
        multiple_birth: text_at(patient, "multipleBirthBoolean"),
        multiple_birth_integer: text_at(patient, "multipleBirthInteger"),
        communication: languages(patient),
        contact: or_na(contact.and_then(contact_name)),
        contact_relationship: or_na(
            contact.and_then(|c| lookup_str(c, "relationship.0.coding.0.display").map(str::to_string)),
        ),
        contact_address: or_na(contact.and_then(|c| first(c, "address")).and_then(address)),
        contact_phone: or_na(contact.and_then(|c| lookup(c, "telecom.0")).and_then(contact_point)),
        contact_email: or_na(contact.and_then(|c| lookup(c, "telecom.1")).and_then(contact_point)),
        general_practitioner: reference_at(patient, "generalPractitioner", &["reference"]),
        managing_organization: reference_at(patient, "managingOrganization", &["reference"]),
        link: reference_at(patient, "link", &["reference", "other.reference"]),
        photo: reference_at(patient, "photo", &["reference", "url"]),
        text: text_at(patient, "text.div"),
    }
}

/// Compose `"{given[0]} {family}"`, followed by `" ({use})"` when a use is set.
pub(crate) fn human_name(name: &JsonValue) -> Option<String> {
    let full = join_present(&[lookup_str(name, "given.0"), lookup_str(name, "family")]);
    if full.is_empty() {
        return None;
    }

    Some(with_use(full, lookup_str(name, "use")))
}

fn identifiers(resource: &JsonValue) -> String {
    let formatted: Vec<String> = lookup_array(resource, "identifier")
        .iter()
        .map(|identifier| {
            format!(
                "{} - {}",
                lookup_str(identifier, "system").unwrap_or_default(),
                lookup_str(identifier, "value").unwrap_or_default()
            )
        })
        .collect();

    if formatted.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        formatted.join(", ")
    }
}

/// `"{line[0]}, {city}, {state} {postalCode}"` with the separators of missing
/// leading or trailing parts trimmed away, then `" ({use})"`.
pub(crate) fn address(address: &JsonValue) -> Option<String> {
    let composed = format!(
        "{}, {}, {} {}",
        lookup_str(address, "line.0").unwrap_or_default(),
        lookup_str(address, "city").unwrap_or_default(),
        lookup_str(address, "state").unwrap_or_default(),
        lookup_str(address, "postalCode").unwrap_or_default(),
    );
    let trimmed = composed.trim_matches(|c| c == ',' || c == ' ');
    if trimmed.is_empty() {
        return None;
    }

    Some(with_use(trimmed.to_string(), lookup_str(address, "use")))
}

fn contact_point(telecom: &JsonValue) -> Option<String> {
    let value = lookup_str(telecom, "value")?;
    Some(with_use(value.to_string(), lookup_str(telecom, "use")))
}

fn age(age: &JsonValue) -> Option<String> {
    let value = lookup(age, "value").and_then(scalar_text)?;
    Some(join_present(&[Some(value.as_str()), lookup_str(age, "unit")]))
}

fn languages(patient: &JsonValue) -> String {
    let languages: Vec<String> = lookup_array(patient, "communication")
        .iter()
        .map(|communication| {
            let display = lookup_str(communication, "language.coding.0.display")
                .unwrap_or(NOT_AVAILABLE);
            let preferred = lookup(communication, "preferred").and_then(JsonValue::as_bool);
            if preferred == Some(true) {
                format!("{} (preferred)", display)
            } else {
                display.to_string()
            }
        })
        .collect();

    if languages.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        languages.join(", ")
    }
}

fn contact_name(contact: &JsonValue) -> Option<String> {
    let name = lookup(contact, "name")?;
    let prefix = lookup_array(name, "_family.extension")
        .iter()
        .find(|ext| lookup_str(ext, "url") == Some(OWN_PREFIX_EXTENSION))
        .and_then(|ext| lookup_str(ext, "valueString"));

    let full = join_present(&[prefix, lookup_str(name, "given.0"), lookup_str(name, "family")]);
    if full.is_empty() { None } else { Some(full) }
}

/// Reference string of the first entry of `element`, trying each candidate
/// path in order.
fn reference_at(resource: &JsonValue, element: &str, candidates: &[&str]) -> String {
    let entry = first(resource, element);
    or_na(entry.and_then(|entry| {
        candidates
            .iter()
            .find_map(|path| lookup_str(entry, path))
            .map(str::to_string)
    }))
}

fn text_at(resource: &JsonValue, path: &str) -> String {
    or_na(lookup(resource, path).and_then(scalar_text))
}

fn with_use(text: String, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(qualifier) => format!("{} ({})", text, qualifier),
        None => text,
    }
}

fn join_present(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
