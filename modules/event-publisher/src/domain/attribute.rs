//! Tagged attribute decoding
//!
//! Change images arrive with every value wrapped in a one-key object naming
//! its type, e.g. `{"S": "EMAIL"}` or `{"M": {"proofs": {"M": {..}}}}`. This
//! module unwraps them into plain JSON so the rest of the pipeline never sees
//! the wire encoding.

use crate::error::DecodeError;
use crate::models::AttributeMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// A single tagged value. Exactly one tag per value; serde rejects objects
/// with zero or several keys, and unknown tags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    /// base64 text on the JSON wire
    #[serde(rename = "B")]
    Binary(String),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "BS")]
    BinarySet(Vec<String>),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Unwrap into a plain JSON value. `path` names the attribute in errors.
    pub fn into_value(self, path: &str) -> Result<Value, DecodeError> {
        match self {
            AttributeValue::String(s) => Ok(Value::String(s)),
            AttributeValue::Number(n) => parse_number(path, &n),
            AttributeValue::Bool(b) => Ok(Value::Bool(b)),
            AttributeValue::Null(_) => Ok(Value::Null),
            AttributeValue::Binary(b) => decode_binary(path, &b),
            AttributeValue::StringSet(set) => {
                Ok(Value::Array(set.into_iter().map(Value::String).collect()))
            }
            AttributeValue::NumberSet(set) => set
                .iter()
                .map(|n| parse_number(path, n))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            AttributeValue::BinarySet(set) => set
                .iter()
                .map(|b| decode_binary(path, b))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            AttributeValue::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| item.into_value(&format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            AttributeValue::Map(entries) => entries
                .into_iter()
                .map(|(key, item)| -> Result<(String, Value), DecodeError> {
                    let value = item.into_value(&format!("{path}.{key}"))?;
                    Ok((key, value))
                })
                .collect::<Result<Map<_, _>, _>>()
                .map(Value::Object),
        }
    }
}

/// Decode a whole change image into a plain JSON object.
///
/// Purely structural; whether the result looks like a template is decided by
/// the snapshot validator.
pub fn decode(raw: &AttributeMap) -> Result<Map<String, Value>, DecodeError> {
    raw.iter()
        .map(|(name, tagged)| -> Result<(String, Value), DecodeError> {
            let attribute = AttributeValue::deserialize(tagged).map_err(|source| {
                DecodeError::MalformedAttribute {
                    name: name.clone(),
                    source,
                }
            })?;
            Ok((name.clone(), attribute.into_value(name)?))
        })
        .collect()
}

fn parse_number(path: &str, raw: &str) -> Result<Value, DecodeError> {
    let trimmed = raw.trim();

    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(Value::from(i));
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Ok(Value::from(u));
    }

    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| DecodeError::InvalidNumber {
            name: path.to_string(),
            value: raw.to_string(),
        })
}

fn decode_binary(path: &str, encoded: &str) -> Result<Value, DecodeError> {
    STANDARD
        .decode(encoded)
        .map(Value::from)
        .map_err(|source| DecodeError::InvalidBinary {
            name: path.to_string(),
            source,
        })
}
