//! HTML form decoding and form-to-Patient marshalling
//!
//! The create and edit pages post the same set of fields. Blank inputs are
//! left out of the resource entirely; FHIR does not allow empty primitives.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value as JsonValue, json};

use crate::error::{CoreError, Result};
use crate::path::{first, lookup, lookup_array, lookup_str, scalar_text};
use crate::projector::OWN_PREFIX_EXTENSION;

pub const US_CORE_PATIENT_PROFILE: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-patient";
const MARITAL_STATUS_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus";
const RELATIONSHIP_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v2-0131";
const LANGUAGE_SYSTEM: &str = "urn:ietf:bcp:47";

/// Languages offered on the form, as (display, BCP-47 code)
pub const LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("French", "fr"),
    ("German", "de"),
    ("Spanish", "es"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Romanian", "ro"),
    ("Dutch", "nl"),
    ("Swedish", "sv"),
    ("Danish", "da"),
    ("Norwegian", "no"),
    ("Russian", "ru"),
    ("Polish", "pl"),
    ("Czech", "cs"),
    ("Slovak", "sk"),
    ("Bulgarian", "bg"),
    ("Serbian", "sr"),
    ("Croatian", "hr"),
    ("Slovenian", "sl"),
    ("Latvian", "lv"),
    ("Lithuanian", "lt"),
    ("Greek", "el"),
    ("Finnish", "fi"),
    ("Hungarian", "hu"),
    ("Estonian", "et"),
];

/// Contact relationships (v2-0131), as (display, code)
pub const RELATIONSHIPS: &[(&str, &str)] = &[
    ("Billing contact person", "BP"),
    ("Contact person", "CP"),
    ("Emergency contact person", "EP"),
    ("Person preparing referral", "PR"),
    ("Employer", "E"),
    ("Emergency Contact", "C"),
    ("Federal Agency", "F"),
    ("Insurance Company", "I"),
    ("Next-of-Kin", "N"),
    ("State Agency", "S"),
    ("Unknown", "U"),
];

/// Marital statuses (v3-MaritalStatus), as (display, code)
pub const MARITAL_STATUSES: &[(&str, &str)] = &[
    ("Annulled", "A"),
    ("Divorced", "D"),
    ("Interlocutory", "I"),
    ("Legally Separated", "L"),
    ("Married", "M"),
    ("Polygamous", "P"),
    ("Never Married", "S"),
    ("Domestic partner", "T"),
    ("Unmarried", "U"),
    ("Widowed", "W"),
];

/// BCP-47 code for a language display name, matched case-insensitively.
/// Unknown languages map to `en`.
pub fn language_code(display: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(display.trim()))
        .map(|(_, code)| *code)
        .unwrap_or("en")
}

/// v2-0131 code for a relationship display name. Unknown values map to `U`.
pub fn relationship_code(display: &str) -> &'static str {
    RELATIONSHIPS
        .iter()
        .find(|(name, _)| *name == display)
        .map(|(_, code)| *code)
        .unwrap_or("U")
}

/// v3-MaritalStatus code for a display name. Unknown values map to `UNK`.
pub fn marital_status_code(display: &str) -> &'static str {
    MARITAL_STATUSES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(display))
        .map(|(_, code)| *code)
        .unwrap_or("UNK")
}

/// Decoded `application/x-www-form-urlencoded` body.
///
/// Keeps every pair in submission order so repeated fields (checkbox groups)
/// survive decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &str) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value for `name`, trimmed; `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .unwrap_or("")
    }

    /// Every non-blank value submitted for `name`.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// True when the checkbox/select `name` was submitted as `"True"`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == "True"
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Build a Patient resource from the create/edit form.
///
/// Telecom entries are always written phone first, then email, so that the
/// positional reading in the projector shows them in the right slots. When
/// only an email is entered, an empty phone entry holds position 0.
pub fn patient_from_form(form: &FormFields, id: &str) -> Result<JsonValue> {
    let mut patient = Map::new();
    patient.insert("resourceType".into(), json!("Patient"));
    patient.insert("id".into(), json!(id));
    patient.insert("meta".into(), json!({"profile": [US_CORE_PATIENT_PROFILE]}));
    patient.insert("active".into(), json!(form.flag("active")));

    put_str(&mut patient, "gender", form.get("gender"));
    put_str(&mut patient, "birthDate", &date_field(form, "birth_date", false)?);

    let mut name = Map::new();
    put_str(&mut name, "use", form.get("official_name"));
    put_str(&mut name, "family", form.get("family_name"));
    put_list(&mut name, "given", form.get("given_name"));
    if !name.is_empty() {
        patient.insert("name".into(), json!([name]));
    }

    if let Some(address) = address_from_form(form, "", None)? {
        patient.insert("address".into(), json!([address]));
    }

    let telecom = telecom_from_form(form, "");
    if !telecom.is_empty() {
        patient.insert("telecom".into(), JsonValue::Array(telecom));
    }

    let marital_status = form.get("marital_status");
    if !marital_status.is_empty() {
        patient.insert(
            "maritalStatus".into(),
            json!({"coding": [{
                "system": MARITAL_STATUS_SYSTEM,
                "code": marital_status_code(marital_status),
                "display": marital_status,
            }]}),
        );
    }

    let deceased = date_field(form, "deceased", true)?;
    if !deceased.is_empty() {
        patient.insert("deceasedDateTime".into(), json!(deceased));
    } else if form.flag("deceased_boolean") {
        patient.insert("deceasedBoolean".into(), json!(true));
    }

    let birth_order = form.get("multiple_birth_integer");
    if birth_order.is_empty() {
        patient.insert("multipleBirthBoolean".into(), json!(form.flag("multiple_birth")));
    } else {
        let order: i64 = birth_order
            .parse()
            .map_err(|_| CoreError::invalid_field("multiple_birth_integer", "expected a whole number"))?;
        patient.insert("multipleBirthInteger".into(), json!(order));
    }

    let preferred = form.get("preferred_language");
    let communication: Vec<JsonValue> = form
        .get_all("languages")
        .into_iter()
        .map(|language| {
            json!({
                "language": {"coding": [{
                    "system": LANGUAGE_SYSTEM,
                    "code": language_code(language),
                    "display": language,
                }]},
                "preferred": language == preferred,
            })
        })
        .collect();
    if !communication.is_empty() {
        patient.insert("communication".into(), JsonValue::Array(communication));
    }

    if let Some(contact) = contact_from_form(form)? {
        patient.insert("contact".into(), json!([contact]));
    }

    if let Some(reference) = reference_from_form(form, "general_practitioner", "Practitioner") {
        patient.insert("generalPractitioner".into(), json!([reference]));
    }
    if let Some(reference) = reference_from_form(form, "managing_organization", "Organization") {
        patient.insert("managingOrganization".into(), reference);
    }

    let link = form.get("link");
    if !link.is_empty() {
        patient.insert(
            "link".into(),
            json!([{"other": {"reference": link}, "type": "seealso"}]),
        );
    }
    let photo = form.get("photo");
    if !photo.is_empty() {
        patient.insert("photo".into(), json!([{"url": photo}]));
    }

    Ok(JsonValue::Object(patient))
}

/// Elements owned by the create/edit form, including every variant of the
/// `deceased[x]` and `multipleBirth[x]` choices.
const FORM_ELEMENTS: &[&str] = &[
    "active",
    "gender",
    "birthDate",
    "name",
    "address",
    "telecom",
    "maritalStatus",
    "deceasedDateTime",
    "deceasedBoolean",
    "multipleBirthBoolean",
    "multipleBirthInteger",
    "communication",
    "contact",
    "generalPractitioner",
    "managingOrganization",
    "link",
    "photo",
];

/// Apply the edit form to an existing Patient.
///
/// Form-owned elements are replaced (or removed when left blank); everything
/// else on the resource, such as `identifier`, `text` or `meta`, is kept.
pub fn apply_form(existing: &JsonValue, form: &FormFields, id: &str) -> Result<JsonValue> {
    let edited = patient_from_form(form, id)?;

    let mut patient = existing.as_object().cloned().unwrap_or_default();
    for element in FORM_ELEMENTS {
        patient.remove(*element);
    }
    if let JsonValue::Object(edited) = edited {
        for (key, value) in edited {
            if key == "meta" && patient.contains_key("meta") {
                continue;
            }
            patient.insert(key, value);
        }
    }

    Ok(JsonValue::Object(patient))
}

fn contact_from_form(form: &FormFields) -> Result<Option<JsonValue>> {
    let mut contact = Map::new();

    let relationship = form.get("contact_relationship");
    if !relationship.is_empty() {
        contact.insert(
            "relationship".into(),
            json!([{"coding": [{
                "system": RELATIONSHIP_SYSTEM,
                "code": relationship_code(relationship),
                "display": relationship,
            }]}]),
        );
    }

    let mut name = Map::new();
    put_str(&mut name, "family", form.get("contact_family_name"));
    let prefix = form.get("contact_family_name_prefix");
    if !prefix.is_empty() {
        name.insert(
            "_family".into(),
            json!({"extension": [{"url": OWN_PREFIX_EXTENSION, "valueString": prefix}]}),
        );
    }
    put_list(&mut name, "given", form.get("contact_given_name"));
    if !name.is_empty() {
        contact.insert("name".into(), JsonValue::Object(name));
    }

    let telecom = telecom_from_form(form, "contact_");
    if !telecom.is_empty() {
        contact.insert("telecom".into(), JsonValue::Array(telecom));
    }

    let start = date_field(form, "contact_start", true)?;
    let period_start = (!start.is_empty()).then_some(start.as_str());
    if let Some(address) = address_from_form(form, "contact_", period_start)? {
        contact.insert("address".into(), address);
    }

    Ok((!contact.is_empty()).then(|| JsonValue::Object(contact)))
}

fn address_from_form(
    form: &FormFields,
    prefix: &str,
    period_start: Option<&str>,
) -> Result<Option<JsonValue>> {
    let field = |name: &str| form.get(&format!("{}{}", prefix, name));

    let mut address = Map::new();
    put_list(&mut address, "line", field("address_line"));
    put_str(&mut address, "city", field("city"));
    put_str(&mut address, "state", field("state"));
    put_str(&mut address, "postalCode", field("postal_code"));
    if address.is_empty() {
        return Ok(None);
    }

    put_str(&mut address, "use", field("address_use"));
    if let Some(start) = period_start {
        address.insert("period".into(), json!({"start": start}));
    }

    Ok(Some(JsonValue::Object(address)))
}

fn telecom_from_form(form: &FormFields, prefix: &str) -> Vec<JsonValue> {
    let field = |name: &str| form.get(&format!("{}{}", prefix, name));

    let phone = field("phone");
    let email = field("email");
    if phone.is_empty() && email.is_empty() {
        return Vec::new();
    }

    let mut phone_entry = Map::new();
    phone_entry.insert("system".into(), json!("phone"));
    put_str(&mut phone_entry, "value", phone);
    if !phone.is_empty() {
        put_str(&mut phone_entry, "use", field("phone_use"));
    }
    let mut telecom = vec![JsonValue::Object(phone_entry)];

    if !email.is_empty() {
        let mut email_entry = Map::new();
        email_entry.insert("system".into(), json!("email"));
        email_entry.insert("value".into(), json!(email));
        put_str(&mut email_entry, "use", field("email_use"));
        telecom.push(JsonValue::Object(email_entry));
    }

    telecom
}

fn reference_from_form(form: &FormFields, field: &str, target: &str) -> Option<JsonValue> {
    let reference = form.get(field);
    if reference.is_empty() {
        return None;
    }

    let mut value = Map::new();
    value.insert("reference".into(), json!(reference));
    value.insert("type".into(), json!(target));
    put_str(&mut value, "display", form.get(&format!("{}_display", field)));
    Some(JsonValue::Object(value))
}

/// Validated FHIR `date` field, `""` when blank.
///
/// Accepts the partial forms `YYYY` and `YYYY-MM` as well as `YYYY-MM-DD`;
/// with `date_time` a full RFC 3339 `dateTime` is accepted too. The value is
/// kept as entered so stored precision survives an edit.
fn date_field(form: &FormFields, field: &str, date_time: bool) -> Result<String> {
    let raw = form.get(field);
    if raw.is_empty() {
        return Ok(String::new());
    }

    if is_fhir_date(raw) || (date_time && DateTime::parse_from_rfc3339(raw).is_ok()) {
        return Ok(raw.to_string());
    }

    let expected = if date_time {
        "expected YYYY, YYYY-MM, YYYY-MM-DD or a full date and time"
    } else {
        "expected YYYY, YYYY-MM or YYYY-MM-DD"
    };
    Err(CoreError::invalid_field(field, expected))
}

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` naming a real calendar date
pub fn is_fhir_date(value: &str) -> bool {
    let padded = match value.len() {
        4 => format!("{}-01-01", value),
        7 => format!("{}-01", value),
        10 => value.to_string(),
        _ => return false,
    };

    value.as_bytes()[..4].iter().all(u8::is_ascii_digit)
        && NaiveDate::parse_from_str(&padded, "%Y-%m-%d").is_ok()
}

fn put_str(map: &mut Map<String, JsonValue>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), json!(value));
    }
}

fn put_list(map: &mut Map<String, JsonValue>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), json!([value]));
    }
}

/// Current values of the edit form's text inputs, keyed by input name.
///
/// Reads the first entry of each repeated element, mirroring what the
/// summary page shows.
pub fn edit_values(patient: &JsonValue) -> Vec<(&'static str, String)> {
    let text = |path: &str| lookup(patient, path).and_then(scalar_text).unwrap_or_default();
    let contact = first(patient, "contact");
    let contact_text = |path: &str| {
        contact
            .and_then(|c| lookup(c, path))
            .and_then(scalar_text)
            .unwrap_or_default()
    };
    let contact_address = contact.and_then(|c| first(c, "address"));
    let contact_address_text = |path: &str| {
        contact_address
            .and_then(|a| lookup_str(a, path))
            .unwrap_or_default()
            .to_string()
    };
    let prefix = contact
        .map(|c| lookup_array(c, "name._family.extension"))
        .unwrap_or(&[])
        .iter()
        .find(|ext| lookup_str(ext, "url") == Some(OWN_PREFIX_EXTENSION))
        .and_then(|ext| lookup_str(ext, "valueString"))
        .unwrap_or_default()
        .to_string();
    let reference = |element: &str, paths: &[&str]| {
        first(patient, element)
            .and_then(|entry| paths.iter().find_map(|path| lookup_str(entry, path)))
            .unwrap_or_default()
            .to_string()
    };

    vec![
        ("given_name", text("name.0.given.0")),
        ("family_name", text("name.0.family")),
        ("official_name", text("name.0.use")),
        ("birth_date", text("birthDate")),
        ("gender", text("gender")),
        ("address_line", text("address.0.line.0")),
        ("city", text("address.0.city")),
        ("state", text("address.0.state")),
        ("postal_code", text("address.0.postalCode")),
        ("address_use", text("address.0.use")),
        ("phone", text("telecom.0.value")),
        ("phone_use", text("telecom.0.use")),
        ("email", text("telecom.1.value")),
        ("email_use", text("telecom.1.use")),
        ("marital_status", text("maritalStatus.coding.0.display")),
        ("deceased", text("deceasedDateTime")),
        ("multiple_birth_integer", text("multipleBirthInteger")),
        ("contact_relationship", contact_text("relationship.0.coding.0.display")),
        ("contact_family_name_prefix", prefix),
        ("contact_given_name", contact_text("name.given.0")),
        ("contact_family_name", contact_text("name.family")),
        ("contact_phone", contact_text("telecom.0.value")),
        ("contact_phone_use", contact_text("telecom.0.use")),
        ("contact_email", contact_text("telecom.1.value")),
        ("contact_email_use", contact_text("telecom.1.use")),
        ("contact_address_line", contact_address_text("line.0")),
        ("contact_city", contact_address_text("city")),
        ("contact_state", contact_address_text("state")),
        ("contact_postal_code", contact_address_text("postalCode")),
        ("contact_address_use", contact_address_text("use")),
        ("contact_start", contact_address_text("period.start")),
        ("general_practitioner", reference("generalPractitioner", &["reference"])),
        ("managing_organization", reference("managingOrganization", &["reference"])),
        ("link", reference("link", &["reference", "other.reference"])),
        ("photo", reference("photo", &["reference", "url"])),
        ("active", flag(lookup(patient, "active"))),
        ("deceased_boolean", flag(lookup(patient, "deceasedBoolean"))),
        ("multiple_birth", flag(lookup(patient, "multipleBirthBoolean"))),
        ("preferred_language", preferred_language(patient)),
    ]
}

/// Display names of the languages in `communication`, in order.
pub fn selected_languages(patient: &JsonValue) -> Vec<String> {
    lookup_array(patient, "communication")
        .iter()
        .filter_map(|entry| lookup_str(entry, "language.coding.0.display"))
        .map(str::to_string)
        .collect()
}

fn preferred_language(patient: &JsonValue) -> String {
    lookup_array(patient, "communication")
        .iter()
        .find(|entry| lookup(entry, "preferred") == Some(&JsonValue::Bool(true)))
        .and_then(|entry| lookup_str(entry, "language.coding.0.display"))
        .unwrap_or_default()
        .to_string()
}

/// Checkbox value as the form posts it
fn flag(value: Option<&JsonValue>) -> String {
    match value {
        Some(JsonValue::Bool(true)) => "True".to_string(),
        _ => String::new(),
    }
}
