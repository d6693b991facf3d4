//! FHIR Bundle to simplified CDA conversion
//!
//! Produces a small `ClinicalDocument` with a patient header and one section
//! per clinical resource type. This is a display aid, not a conformant CDA R2
//! document.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};
use crate::path::{lookup_array, lookup_str};

const CDA_NS: &str = "urn:hl7-org:v3";
const UNKNOWN: &str = "Unknown";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// (section element, entry element, resource type, code paths tried in order)
const SECTIONS: &[(&str, &str, &str, &[&str])] = &[
    ("allergies", "allergy", "AllergyIntolerance", &["code.text"]),
    (
        "medications",
        "medication",
        "MedicationStatement",
        &[
            "medication.concept.text",
            "medication.code.text",
            "medicationCodeableConcept.text",
        ],
    ),
    ("conditions", "condition", "Condition", &["code.text"]),
    ("procedures", "procedure", "Procedure", &["code.text"]),
];

/// Convert a Bundle into CDA XML, including the XML declaration.
pub fn fhir_to_cda(bundle: &JsonValue) -> Result<String> {
    if !bundle.is_object() {
        return Err(CoreError::ExpectedObject);
    }

    let resources: Vec<&JsonValue> = lookup_array(bundle, "entry")
        .iter()
        .filter_map(|entry| entry.get("resource"))
        .collect();

    let patient = resources
        .iter()
        .copied()
        .find(|r| lookup_str(r, "resourceType") == Some("Patient"))
        .ok_or(CoreError::MissingPatient)?;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("ClinicalDocument");
    root.push_attribute(("xmlns", CDA_NS));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("header")))?;
    writer.write_event(Event::Start(BytesStart::new("patient")))?;
    let name = [lookup_str(patient, "name.0.given.0"), lookup_str(patient, "name.0.family")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    write_text(&mut writer, "name", &name)?;
    write_text(&mut writer, "id", lookup_str(patient, "id").unwrap_or_default())?;
    write_text(&mut writer, "birthDate", lookup_str(patient, "birthDate").unwrap_or_default())?;
    writer.write_event(Event::End(BytesEnd::new("patient")))?;
    writer.write_event(Event::End(BytesEnd::new("header")))?;

    for (section, element, resource_type, code_paths) in SECTIONS {
        writer.write_event(Event::Start(BytesStart::new(*section)))?;
        for resource in resources
            .iter()
            .filter(|r| lookup_str(r, "resourceType") == Some(*resource_type))
        {
            let text = code_paths
                .iter()
                .find_map(|path| lookup_str(resource, path))
                .unwrap_or(UNKNOWN);
            write_text(&mut writer, element, text)?;
        }
        writer.write_event(Event::End(BytesEnd::new(*section)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("ClinicalDocument")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_text(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
