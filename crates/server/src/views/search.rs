//! Search form and results

use fhir_portal_core::{ResourceKind, ResourceSummary};

use super::{attr, esc, page};
use crate::flash::Flash;
use crate::paths;

pub fn form(flash: Option<&Flash>) -> String {
    let kinds: String = ResourceKind::ALL
        .iter()
        .map(|kind| format!(r#"<option value="{0}">{0}</option>"#, kind.as_str()))
        .collect();

    let fieldsets: String = ResourceKind::ALL
        .iter()
        .map(|kind| {
            let inputs: String = kind
                .filters()
                .iter()
                .map(|(field, param)| {
                    format!(
                        r#"<p><label for="{field}">{param}</label><input type="text" id="{field}" name="{field}"></p>"#,
                    )
                })
                .collect();
            format!(
                "<fieldset><legend>{}</legend>\n{}</fieldset>\n",
                kind.as_str(),
                inputs
            )
        })
        .collect();

    let body = format!(
        r#"<form method="post" action="{action}">
<p><label for="resource_type">Resource type</label>
<select id="resource_type" name="resource_type">{kinds}</select></p>
<p>Only the filters of the selected resource type are used.</p>
{fieldsets}<button type="submit">Search</button>
</form>"#,
        action = paths::SEARCH,
    );

    page("Search", flash, &body)
}

pub fn results(
    flash: Option<&Flash>,
    kind: ResourceKind,
    params: &[(String, String)],
    results: &[ResourceSummary],
) -> String {
    let criteria = if params.is_empty() {
        "no filters".to_string()
    } else {
        params
            .iter()
            .map(|(name, value)| format!("{}={}", esc(name), esc(value)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let rows: String = results
        .iter()
        .map(|result| {
            let id = if kind == ResourceKind::Patient {
                format!(
                    r#"<a href="{}">{}</a>"#,
                    attr(&paths::summary(&result.id)),
                    esc(&result.id)
                )
            } else {
                esc(&result.id).into_owned()
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                id,
                esc(&result.title),
                esc(&result.detail)
            )
        })
        .collect();

    let body = format!(
        r#"<p>{count} {kind} results for {criteria}.</p>
<table>
<thead><tr><th>ID</th><th>Title</th><th>Detail</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<p><a href="{search}">New search</a></p>"#,
        count = results.len(),
        search = paths::SEARCH,
    );

    page("Search Results", flash, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_lists_every_kind() {
        let html = form(None);

        for kind in ResourceKind::ALL {
            assert!(html.contains(&format!(r#"<option value="{0}">{0}</option>"#, kind)));
        }
        assert!(html.contains(r#"name="practitioner_city""#));
        assert!(html.contains(r#"name="medication_request_status""#));
    }

    #[test]
    fn test_results_link_patients_only() {
        let result = ResourceSummary {
            resource_type: "Patient".into(),
            id: "p1".into(),
            title: "Jane <Doe>".into(),
            detail: "1980-05-12".into(),
        };
        let params = vec![("family".to_string(), "Doe".to_string())];

        let patients = results(None, ResourceKind::Patient, &params, &[result.clone()]);
        let observations = results(None, ResourceKind::Observation, &[], &[result]);

        assert!(patients.contains(r#"<a href="/hl7/patient_summary/fhir/p1">p1</a>"#));
        assert!(patients.contains("Jane &lt;Doe&gt;"));
        assert!(patients.contains("1 Patient results for family=Doe."));
        assert!(!observations.contains("<a href=\"/hl7/patient_summary/fhir/p1\">"));
        assert!(observations.contains("no filters"));
    }
}
