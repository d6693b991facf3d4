//! Sample bundle and CDA preview pages

use super::{esc, page};
use crate::flash::Flash;
use crate::paths;

pub fn bundle_json(flash: Option<&Flash>, pretty_json: &str) -> String {
    let body = format!(
        r#"<p>A patient summary bundle with one allergy, medication, condition and procedure.
<a href="{cda}">View it as CDA</a>.</p>
<form method="post" action="{upload}">
  <button type="submit">Upload the sample patient to the FHIR server</button>
</form>
<pre><code>{json}</code></pre>"#,
        cda = paths::SAMPLE_CDA,
        upload = paths::SAMPLE_UPLOAD,
        json = esc(pretty_json),
    );

    page("Sample Patient Summary", flash, &body)
}

pub fn cda(flash: Option<&Flash>, xml: &str) -> String {
    let body = format!(
        r#"<p>The sample bundle converted to a simplified CDA document.</p>
<pre><code>{}</code></pre>"#,
        esc(xml)
    );

    page("Sample CDA Document", flash, &body)
}
