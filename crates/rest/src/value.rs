//! Field value coercion between wire JSON and typed values.
//!
//! Coercion is deliberately total: malformed wire values resolve to `Null`
//! (or an empty picklist) rather than failing a whole record, because one
//! bad value must never make a retrieved record unusable.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

use crate::schema::FieldType;

/// Wire format for datetime values: millisecond precision, numeric offset
/// without a colon.
const DATETIME_WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Separator between selections in a multipicklist wire string.
const MULTIPICKLIST_SEPARATOR: char = ';';

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Number(serde_json::Number),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    /// Ordered multipicklist selections.
    Picklist(Vec<String>),
    /// Passed-through value of a type outside the coercer's closed set.
    Other(Value),
}

impl FieldValue {
    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The text content, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean content, if this is a `Boolean` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render this value in its wire form.
    pub fn to_wire(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => {
                Value::String(dt.format(DATETIME_WIRE_FORMAT).to_string())
            }
            FieldValue::Picklist(items) => {
                Value::String(items.join(&MULTIPICKLIST_SEPARATOR.to_string()))
            }
            FieldValue::Other(v) => v.clone(),
        }
    }
}

/// Parse a wire datetime. Accepts both the colon-offset ISO-8601 form the
/// remote returns and the compact `+HHMM` form the writer emits.
fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Coerce a raw wire value into its typed form for the given field type.
/// Never errors; anything unparsable becomes `Null` (multipicklists become
/// an empty selection).
pub fn coerce_from_wire(field_type: &FieldType, raw: &Value) -> FieldValue {
    if raw.is_null() {
        return match field_type {
            FieldType::Multipicklist => FieldValue::Picklist(vec![]),
            _ => FieldValue::Null,
        };
    }

    match field_type {
        FieldType::Boolean => raw
            .as_bool()
            .map(FieldValue::Boolean)
            .unwrap_or(FieldValue::Null),

        FieldType::Date => raw
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null),

        FieldType::DateTime => raw
            .as_str()
            .and_then(parse_datetime)
            .map(FieldValue::DateTime)
            .unwrap_or(FieldValue::Null),

        FieldType::Currency | FieldType::Percent => match raw {
            Value::Number(n) => FieldValue::Number(n.clone()),
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Null),
            _ => FieldValue::Null,
        },

        FieldType::Multipicklist => {
            let items = raw
                .as_str()
                .map(|s| {
                    if s.is_empty() {
                        vec![]
                    } else {
                        s.split(MULTIPICKLIST_SEPARATOR)
                            .map(str::to_string)
                            .collect()
                    }
                })
                .unwrap_or_default();
            FieldValue::Picklist(items)
        }

        FieldType::Text | FieldType::Id | FieldType::Reference | FieldType::Picklist => raw
            .as_str()
            .map(|s| FieldValue::Text(s.to_string()))
            .unwrap_or(FieldValue::Null),

        FieldType::Other(_) => FieldValue::Other(raw.clone()),
    }
}

/// Coerce a caller-supplied JSON attribute value into its wire form for
/// the given field type.
///
/// Datetime strings are reformatted to the wire format; unparsable ones
/// pass through unchanged and are left for the remote to validate. Date
/// strings pass through as-is. Multipicklist arrays are joined.
pub fn coerce_to_wire(field_type: &FieldType, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }

    match field_type {
        FieldType::Multipicklist => match value {
            Value::Array(items) => {
                let joined: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Value::String(joined.join(&MULTIPICKLIST_SEPARATOR.to_string()))
            }
            other => other.clone(),
        },

        FieldType::DateTime => match value {
            Value::String(s) => match parse_datetime(s) {
                Some(dt) => Value::String(dt.format(DATETIME_WIRE_FORMAT).to_string()),
                None => value.clone(),
            },
            other => other.clone(),
        },

        _ => value.clone(),
    }
}
