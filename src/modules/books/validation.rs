//! Field rules for book payloads.

use anyhow::Context;
use bookshelf_http::{AppError, FieldErrors};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use super::models::BookPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Unbounded,
    AtMostCurrentYear,
}

struct FieldRule {
    field: &'static str,
    label: &'static str,
    required: bool,
    kind: Kind,
    bound: Bound,
}

const fn rule(field: &'static str, label: &'static str, required: bool, kind: Kind) -> FieldRule {
    FieldRule {
        field,
        label,
        required,
        kind,
        bound: Bound::Unbounded,
    }
}

const RULES: &[FieldRule] = &[
    rule("title", "title", true, Kind::Text),
    rule("description", "description", false, Kind::Text),
    rule("author", "author", true, Kind::Text),
    rule("genre", "genre", true, Kind::Text),
    FieldRule {
        bound: Bound::AtMostCurrentYear,
        ..rule("publication_year", "publication year", true, Kind::Integer)
    },
    rule("pages", "pages", false, Kind::Integer),
    rule("publisher", "publisher", false, Kind::Text),
];

/// The calendar year right now, in UTC.
pub fn current_year() -> i64 {
    i64::from(OffsetDateTime::now_utc().year())
}

/// Check `body` against the book rules and build the payload.
///
/// Every field is checked so that all failures are reported at once. Unknown
/// keys are ignored.
pub fn validate(body: &Map<String, Value>, current_year: i64) -> Result<BookPayload, AppError> {
    let mut errors = FieldErrors::new();
    let mut normalized = Map::new();

    for rule in RULES {
        match rule.check(body.get(rule.field), current_year) {
            Ok(Some(value)) => {
                normalized.insert(rule.field.to_string(), value);
            }
            Ok(None) => {}
            Err(message) => {
                errors
                    .entry(rule.field.to_string())
                    .or_default()
                    .push(message);
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let payload = serde_json::from_value(Value::Object(normalized))
        .context("validated book payload did not deserialize")?;
    Ok(payload)
}

impl FieldRule {
    /// `Ok(None)` means the field is absent and allowed to be.
    fn check(&self, value: Option<&Value>, current_year: i64) -> Result<Option<Value>, String> {
        let value = match value {
            Some(value) if !is_missing(value) => value,
            _ if self.required => return Err(format!("The {} is required.", self.label)),
            _ => return Ok(None),
        };

        let normalized = match self.kind {
            Kind::Text => match value {
                Value::String(text) => Value::String(text.trim().to_string()),
                _ => return Err(format!("The {} must be a string.", self.label)),
            },
            Kind::Integer => match as_integer(value) {
                Some(number) => {
                    if self.bound == Bound::AtMostCurrentYear && number > current_year {
                        return Err(format!(
                            "The {} must be less than or equal to the current year.",
                            self.label
                        ));
                    }
                    Value::from(number)
                }
                None => return Err(format!("The {} must be an integer.", self.label)),
            },
        };

        Ok(Some(normalized))
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// JSON integers and base-10 integer strings.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
