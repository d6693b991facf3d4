//! Patient list, summary, create/edit and delete pages

use fhir_portal_core::form::{LANGUAGES, MARITAL_STATUSES, RELATIONSHIPS, is_fhir_date};
use fhir_portal_core::{DisplayRecord, ResourceSummary};
use serde_json::Value as JsonValue;

use super::{attr, esc, page};
use crate::flash::Flash;
use crate::paths;

pub fn list(flash: Option<&Flash>, patients: &[ResourceSummary]) -> String {
    let rows: String = patients
        .iter()
        .map(|patient| {
            format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{}</td></tr>"#,
                attr(&paths::summary(&patient.id)),
                esc(&patient.id),
                esc(&patient.title),
                esc(&patient.detail)
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="{select}">
  <label for="patient_id">Patient ID</label>
  <input type="text" id="patient_id" name="patient_id" required>
  <button type="submit">Show summary</button>
</form>
<p>{count} patients, most recently updated first.</p>
<table>
<thead><tr><th>ID</th><th>Name</th><th>Birth Date</th></tr></thead>
<tbody>
{rows}
</tbody>
</table>"#,
        select = paths::SELECT_PATIENT,
        count = patients.len(),
    );

    page("Patients", flash, &body)
}

/// Summary page: the projected record, the narrative and the raw top-level
/// elements of the resource
pub fn summary(
    flash: Option<&Flash>,
    patient_id: &str,
    record: &DisplayRecord,
    patient: &JsonValue,
) -> String {
    let fields: String = record
        .fields()
        .into_iter()
        .map(|(label, value)| {
            let value = if label == "Profile" && !record.profiles.is_empty() {
                profile_links(&record.profiles)
            } else {
                esc(&value).into_owned()
            };
            format!("<tr><th>{}</th><td>{}</td></tr>\n", label, value)
        })
        .collect();

    let raw: String = patient
        .as_object()
        .map(|elements| {
            elements
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    format!("<tr><th>{}</th><td>{}</td></tr>\n", esc(key), esc(&value))
                })
                .collect()
        })
        .unwrap_or_default();

    let body = format!(
        r#"<p>
  <a href="{edit}">Edit</a> |
  <a href="{delete}">Delete</a>
</p>
<table>
{fields}</table>
<h2>Narrative</h2>
<div class="narrative">{text}</div>
<h2>Resource elements</h2>
<table>
{raw}</table>"#,
        edit = attr(&paths::edit(patient_id)),
        delete = attr(&paths::delete(patient_id)),
        text = record.text,
    );

    page(&format!("Patient {}", patient_id), flash, &body)
}

fn profile_links(profiles: &[String]) -> String {
    profiles
        .iter()
        .map(|url| format!(r#"<a href="{}" target="_blank">{}</a>"#, attr(url), esc(url)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// State of the create/edit form
pub struct PatientForm<'a> {
    pub heading: &'a str,
    pub action: String,
    /// Text input values keyed by input name
    pub values: Vec<(&'static str, String)>,
    pub languages: Vec<String>,
}

impl PatientForm<'_> {
    fn value(&self, name: &str) -> &str {
        self.values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    fn input(&self, name: &str, label: &str, kind: &str) -> String {
        format!(
            r#"<p><label for="{name}">{label}</label><input type="{kind}" id="{name}" name="{name}" value="{value}"></p>"#,
            name = name,
            label = label,
            kind = kind,
            value = attr(self.value(name)),
        )
    }

    /// Date input, or a text input when the stored value carries a precision
    /// a browser date picker would drop (`1980`, `1980-05`, a dateTime)
    fn date_input(&self, name: &str, label: &str) -> String {
        let value = self.value(name);
        let full_date = value.len() == 10 && is_fhir_date(value);
        if value.is_empty() || full_date {
            self.input(name, label, "date")
        } else {
            self.input(name, label, "text")
        }
    }

    fn checkbox(&self, name: &str, label: &str) -> String {
        let checked = if self.value(name) == "True" { " checked" } else { "" };
        format!(
            r#"<p><label for="{name}">{label}</label><input type="checkbox" id="{name}" name="{name}" value="True"{checked}></p>"#,
        )
    }

    fn select<'o>(
        &self,
        name: &str,
        label: &str,
        options: impl IntoIterator<Item = &'o str>,
    ) -> String {
        let current = self.value(name);
        let options: String = std::iter::once("")
            .chain(options)
            .map(|option| {
                let selected = if option == current { " selected" } else { "" };
                format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    attr(option),
                    selected,
                    esc(option)
                )
            })
            .collect();
        format!(
            r#"<p><label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select></p>"#,
        )
    }

    fn language_checkboxes(&self) -> String {
        LANGUAGES
            .iter()
            .map(|(display, code)| {
                let checked = if self.languages.iter().any(|l| l.eq_ignore_ascii_case(display)) {
                    " checked"
                } else {
                    ""
                };
                format!(
                    r#"<label><input type="checkbox" name="languages" value="{display}"{checked}> {display} ({code})</label>"#,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn telecom(&self, prefix: &str) -> String {
        [
            self.input(&format!("{}phone", prefix), "Phone", "tel"),
            self.select(&format!("{}phone_use", prefix), "Phone use", TELECOM_USES),
            self.input(&format!("{}email", prefix), "Email", "email"),
            self.select(&format!("{}email_use", prefix), "Email use", TELECOM_USES),
        ]
        .concat()
    }

    fn address(&self, prefix: &str) -> String {
        [
            self.input(&format!("{}address_line", prefix), "Street", "text"),
            self.input(&format!("{}city", prefix), "City", "text"),
            self.input(&format!("{}state", prefix), "State", "text"),
            self.input(&format!("{}postal_code", prefix), "Postal code", "text"),
            self.select(&format!("{}address_use", prefix), "Address use", ADDRESS_USES),
        ]
        .concat()
    }
}

const TELECOM_USES: [&str; 5] = ["home", "work", "temp", "old", "mobile"];
const ADDRESS_USES: [&str; 5] = ["home", "work", "temp", "old", "billing"];
const NAME_USES: [&str; 7] = [
    "usual", "official", "temp", "nickname", "anonymous", "old", "maiden",
];
const GENDERS: [&str; 4] = ["male", "female", "other", "unknown"];

pub fn form(flash: Option<&Flash>, form: &PatientForm<'_>) -> String {
    let language_names = LANGUAGES.iter().map(|(display, _)| *display);

    let body = [
        format!(r#"<form method="post" action="{}">"#, attr(&form.action)),
        "<fieldset><legend>Patient</legend>".to_string(),
        form.input("given_name", "Given name", "text"),
        form.input("family_name", "Family name", "text"),
        form.select("official_name", "Name use", NAME_USES),
        form.date_input("birth_date", "Birth date"),
        form.select("gender", "Gender", GENDERS),
        form.checkbox("active", "Active record"),
        form.select(
            "marital_status",
            "Marital status",
            MARITAL_STATUSES.iter().map(|(display, _)| *display),
        ),
        form.date_input("deceased", "Deceased on"),
        form.checkbox("deceased_boolean", "Deceased"),
        form.checkbox("multiple_birth", "Multiple birth"),
        form.input("multiple_birth_integer", "Birth order", "number"),
        "</fieldset>".to_string(),
        "<fieldset><legend>Address</legend>".to_string(),
        form.address(""),
        "</fieldset>".to_string(),
        "<fieldset><legend>Telecom</legend>".to_string(),
        form.telecom(""),
        "</fieldset>".to_string(),
        "<fieldset><legend>Communication</legend>".to_string(),
        form.language_checkboxes(),
        form.select("preferred_language", "Preferred language", language_names),
        "</fieldset>".to_string(),
        "<fieldset><legend>Contact</legend>".to_string(),
        form.select(
            "contact_relationship",
            "Relationship",
            RELATIONSHIPS.iter().map(|(display, _)| *display),
        ),
        form.input("contact_family_name_prefix", "Family name prefix", "text"),
        form.input("contact_given_name", "Given name", "text"),
        form.input("contact_family_name", "Family name", "text"),
        form.telecom("contact_"),
        form.address("contact_"),
        form.date_input("contact_start", "Contact since"),
        "</fieldset>".to_string(),
        "<fieldset><legend>References</legend>".to_string(),
        form.input("general_practitioner", "General practitioner", "text"),
        form.input("managing_organization", "Managing organization", "text"),
        form.input("link", "Linked patient", "text"),
        form.input("photo", "Photo URL", "url"),
        "</fieldset>".to_string(),
        r#"<button type="submit">Save</button>"#.to_string(),
        "</form>".to_string(),
    ]
    .join("\n");

    page(form.heading, flash, &body)
}

pub fn delete_confirm(flash: Option<&Flash>, patient_id: &str, record: &DisplayRecord) -> String {
    let body = format!(
        r#"<p>Delete patient <strong>{name}</strong> ({id}), born {birth_date}? This cannot be undone.</p>
<form method="post" action="{action}">
  <button type="submit">Delete</button>
  <a href="{summary}">Cancel</a>
</form>"#,
        name = esc(&record.name),
        id = esc(patient_id),
        birth_date = esc(&record.birth_date),
        action = attr(&paths::delete(patient_id)),
        summary = attr(&paths::summary(patient_id)),
    );

    page("Delete Patient", flash, &body)
}
