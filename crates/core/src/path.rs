//! Safe navigation through untyped FHIR JSON
//!
//! Paths are dot-separated. A numeric segment indexes into an array, any other
//! segment looks up an object key: `"name.0.given.0"`. A missing key, an
//! out-of-range index or a segment applied to the wrong kind of node all
//! resolve to `None` instead of failing.

use serde_json::Value as JsonValue;

/// Resolve `path` against `value`.
///
/// An empty path returns the value itself.
pub fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }

    path.split('.').try_fold(value, |node, segment| match node {
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        JsonValue::Object(map) => map.get(segment),
        _ => None,
    })
}

/// Resolve `path` to a non-empty string.
pub fn lookup_str<'a>(value: &'a JsonValue, path: &str) -> Option<&'a str> {
    lookup(value, path)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
}

/// Resolve `path` to an array, treating anything else as empty.
pub fn lookup_array<'a>(value: &'a JsonValue, path: &str) -> &'a [JsonValue] {
    lookup(value, path)
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First element of a repeated element.
///
/// Upstream servers and older revisions of the create form disagree on
/// whether some elements (`managingOrganization`, `contact.address`) are a
/// single object or a list, so a bare object is accepted as its own first
/// element.
pub fn first<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    match lookup(value, path)? {
        JsonValue::Array(items) => items.first(),
        JsonValue::Null => None,
        other => Some(other),
    }
}

/// Render a scalar leaf as display text.
///
/// Strings are returned verbatim, booleans and numbers use their JSON text.
/// Containers and null have no scalar rendering.
pub fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
