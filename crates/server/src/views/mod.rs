//! Server-rendered HTML pages
//!
//! Every upstream or user supplied string goes through [`esc`] or [`attr`]
//! before it reaches the markup. The one exception is the Patient narrative
//! (`text.div`), which the FHIR server already rendered as XHTML.

pub mod patient;
pub mod sample;
pub mod search;

use std::borrow::Cow;

use crate::flash::Flash;
use crate::paths;

/// Escape text content
pub fn esc(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

/// Escape a double quoted attribute value
pub fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Wrap `body` in the site layout, showing `flash` above the content
pub fn page(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let notice = flash
        .map(|flash| {
            format!(
                r#"<div class="alert {}" role="alert">{}</div>"#,
                flash.level.css_class(),
                esc(&flash.message)
            )
        })
        .unwrap_or_default();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="icon" href="data:,">
<title>{title} | FHIR Patient Portal</title>
<style>
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         background: #f5f5f5; color: #333; line-height: 1.6; margin: 0; }}
  nav {{ background: #2c3e50; padding: 12px 32px; }}
  nav a {{ color: #ecf0f1; margin-right: 20px; text-decoration: none; }}
  main {{ max-width: 960px; margin: 24px auto; padding: 0 16px; }}
  table {{ width: 100%; border-collapse: collapse; background: #fff; }}
  th, td {{ text-align: left; padding: 6px 10px; border-bottom: 1px solid #eee; vertical-align: top; }}
  th {{ width: 30%; color: #666; font-weight: 500; }}
  pre {{ background: #fff; padding: 12px; overflow-x: auto; }}
  fieldset {{ background: #fff; border: 1px solid #ddd; margin-bottom: 16px; }}
  label {{ display: inline-block; min-width: 200px; }}
  .alert {{ padding: 10px 16px; margin-bottom: 16px; border-radius: 4px; }}
  .alert-success {{ background: #d4edda; color: #155724; }}
  .alert-danger {{ background: #f8d7da; color: #721c24; }}
</style>
</head>
<body>
<nav>
  <a href="{index}">Home</a>
  <a href="{list}">Patients</a>
  <a href="{search}">Search</a>
  <a href="{new}">New Patient</a>
  <a href="{json}">Sample Bundle</a>
  <a href="{cda}">Sample CDA</a>
</nav>
<main>
{notice}
<h1>{heading}</h1>
{body}
</main>
</body>
</html>
"##,
        title = esc(title),
        heading = esc(title),
        index = paths::INDEX,
        list = paths::PATIENT_LIST,
        search = paths::SEARCH,
        new = paths::NEW,
        json = paths::SAMPLE_JSON,
        cda = paths::SAMPLE_CDA,
    )
}

pub fn index(flash: Option<&Flash>) -> String {
    let body = format!(
        r#"<p>Browse, search and maintain Patient resources on a FHIR R4 server.</p>
<ul>
  <li><a href="{list}">Recently updated patients</a></li>
  <li><a href="{search}">Search patients, practitioners, observations and medications</a></li>
  <li><a href="{new}">Create a patient</a></li>
  <li><a href="{json}">Sample patient summary bundle (JSON)</a></li>
  <li><a href="{cda}">Sample patient summary as CDA</a></li>
</ul>"#,
        list = paths::PATIENT_LIST,
        search = paths::SEARCH,
        new = paths::NEW,
        json = paths::SAMPLE_JSON,
        cda = paths::SAMPLE_CDA,
    );

    page("FHIR Patient Portal", flash, &body)
}

pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        r#"<p>{}</p>
<p><a href="{}">Back to the home page</a></p>"#,
        esc(message),
        paths::INDEX
    );

    page(title, None, &body)
}
