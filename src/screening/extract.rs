use serde_json::Value;
use std::borrow::Cow;

use crate::ashby::types::{str_at, Record};

/// Visit every string leaf under `value`, at any depth, in document order.
pub fn for_each_string<'a, F>(value: &'a Value, f: &mut F)
where
    F: FnMut(&'a str),
{
    match value {
        Value::String(s) => f(s),
        Value::Array(items) => {
            for item in items {
                for_each_string(item, f);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                for_each_string(item, f);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Render a custom-field value as text. Strings pass through, other values
/// use their JSON form, null contributes nothing.
fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Flatten the screening-relevant parts of an application record into one
/// space-separated corpus.
///
/// Visits, in order: candidate name and primary email, custom fields
/// (title, value, value label), every string inside the form submissions,
/// source title, resume file name and job title. Missing or mistyped
/// fields contribute nothing; present but empty strings still take a slot,
/// so neighbouring parts never fuse into a phrase. This never fails.
pub fn extract_text<'a>(record: &'a Record) -> String {
    let mut parts: Vec<Cow<'a, str>> = Vec::new();
    let mut push = |s: Cow<'a, str>| parts.push(s);

    if let Some(name) = str_at(record, &["candidate", "name"]) {
        push(Cow::Borrowed(name));
    }
    if let Some(email) = str_at(record, &["candidate", "primaryEmailAddress", "value"]) {
        push(Cow::Borrowed(email));
    }

    if let Some(fields) = record.get("customFields").and_then(Value::as_array) {
        for field in fields.iter().filter_map(Value::as_object) {
            if let Some(title) = field.get("title").and_then(Value::as_str) {
                push(Cow::Borrowed(title));
            }
            if let Some(value) = field.get("value").and_then(value_text) {
                push(value);
            }
            if let Some(label) = field.get("valueLabel").and_then(Value::as_str) {
                push(Cow::Borrowed(label));
            }
        }
    }

    if let Some(submissions) = record.get("applicationFormSubmissions") {
        for_each_string(submissions, &mut |s| push(Cow::Borrowed(s)));
    }

    for path in [
        &["source", "title"][..],
        &["resumeFileHandle", "name"][..],
        &["job", "title"][..],
    ] {
        if let Some(text) = str_at(record, path) {
            push(Cow::Borrowed(text));
        }
    }

    parts.join(" ")
}
