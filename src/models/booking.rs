//! Display fields of a booking, extracted from a webhook payload of unknown shape.
//!
//! Different versions of the scheduling service put the same information under
//! different keys. Every logical field is described by an ordered list of key
//! paths; the first path that resolves to a non-blank scalar wins.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

pub const NO_NAME: &str = "no name";
pub const UNKNOWN: &str = "unknown";
pub const NO_NOTES: &str = "none";

type Path = &'static [&'static str];

const NAME: &[Path] = &[&["guest", "name"], &["name"]];
const EMAIL: &[Path] = &[&["guest", "email"], &["email"]];
const START: &[Path] = &[
    &["event", "start_time"],
    &["event", "startTime"],
    &["start_time"],
    &["startTime"],
];
const END: &[Path] = &[
    &["event", "end_time"],
    &["event", "endTime"],
    &["end_time"],
    &["endTime"],
];
const MESSAGE: &[Path] = &[&["guest", "message"], &["message"]];
const ANSWERS: &[Path] = &[
    &["questions_and_answers"],
    &["guest", "questions_and_answers"],
];

const ANSWER_LABEL: &[&str] = &["question", "label"];
const ANSWER_VALUE: &[&str] = &["answer", "value"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub name: String,
    pub email: String,
    /// Raw start timestamp, `None` if the payload has none.
    pub start: Option<String>,
    /// Raw end timestamp, empty if the payload has none.
    pub end: String,
    pub notes: String,
}

impl Booking {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            name: first_of(payload, NAME).unwrap_or_else(|| NO_NAME.to_string()),
            email: first_of(payload, EMAIL).unwrap_or_else(|| UNKNOWN.to_string()),
            start: first_of(payload, START),
            end: first_of(payload, END).unwrap_or_default(),
            notes: notes(payload),
        }
    }
}

fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |value, key| value.get(key))
}

/// Renders a scalar as display text. Strings are kept verbatim; whitespace-only
/// strings, objects, arrays and `null` count as absent.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_of(doc: &Value, paths: &[Path]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(doc, path))
        .find_map(scalar)
}

fn first_key(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| entry.get(key)).find_map(scalar)
}

fn notes(payload: &Value) -> String {
    answers(payload)
        .or_else(|| first_of(payload, MESSAGE))
        .or_else(|| scan_for_message(payload))
        .unwrap_or_else(|| NO_NOTES.to_string())
}

/// Question/answer entries rendered as `label: value`, separated by a blank line.
fn answers(payload: &Value) -> Option<String> {
    let entries = ANSWERS
        .iter()
        .filter_map(|path| lookup(payload, path))
        .filter_map(Value::as_array)
        .find(|entries| !entries.is_empty())?;

    let rendered: Vec<String> = entries
        .iter()
        .filter_map(|entry| match (first_key(entry, ANSWER_LABEL), first_key(entry, ANSWER_VALUE)) {
            (None, None) => None,
            (label, value) => Some(format!(
                "{}: {}",
                label.unwrap_or_default(),
                value.unwrap_or_default()
            )),
        })
        .collect();

    if rendered.is_empty() {
        None
    } else {
        Some(rendered.join("\n\n"))
    }
}

/// Last resort: the first string value anywhere in the serialized payload whose
/// key is named like a free-text note. Not a parser; only exact key names match.
fn scan_for_message(payload: &Value) -> Option<String> {
    lazy_static! {
        static ref MESSAGE_KEY_REGEX: Regex = Regex::new(
            r#"(?i)"(?:message|memo|note|comment)"\s*:\s*("(?:[^"\\]|\\.)+")"#
        )
        .unwrap();
    }

    let text = serde_json::to_string(payload).ok()?;
    MESSAGE_KEY_REGEX
        .captures_iter(&text)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| serde_json::from_str::<String>(m.as_str()).ok())
        .find(|s| !s.trim().is_empty())
}
