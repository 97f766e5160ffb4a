//! Decoding of change records emitted by the upstream event table.
//!
//! A change record wraps the newly written row in the storage engine's
//! native attribute encoding:
//!
//! ```json
//! {
//!   "source": "warehouse.events",
//!   "detail-type": "INSERT",
//!   "detail": { "dynamodb": { "NewImage": { "eventName": { "S": "..." } } } }
//! }
//! ```
//!
//! [`normalize`] unwraps the image into plain JSON and validates it as a
//! [`SkuRestocked`] event.

use std::collections::BTreeMap;

use common::{ValidationError, ValidationReason, validation};
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::events::SkuRestocked;

const IMAGE_FIELD: &str = "detail.dynamodb.NewImage";

/// One attribute in the engine's native encoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(BTreeMap<String, AttributeValue>),
    L(Vec<AttributeValue>),
    SS(Vec<String>),
    NS(Vec<String>),
    BS(Vec<String>),
}

impl AttributeValue {
    /// Converts the attribute into plain JSON. Binary values stay in their
    /// base64 text form.
    pub fn into_json(self) -> Result<Value, String> {
        Ok(match self {
            AttributeValue::S(s) | AttributeValue::B(s) => Value::String(s),
            AttributeValue::N(n) => Value::Number(parse_number(&n)?),
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::M(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| v.into_json().map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::L(list) => Value::Array(
                list.into_iter()
                    .map(AttributeValue::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::SS(set) | AttributeValue::BS(set) => {
                Value::Array(set.into_iter().map(Value::String).collect())
            }
            AttributeValue::NS(set) => Value::Array(
                set.iter()
                    .map(|n| parse_number(n).map(Value::Number))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn parse_number(raw: &str) -> Result<Number, String> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Number::from(n));
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(Number::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| format!("`{raw}` is not a number"))
}

/// A change record with its image decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub source: String,
    pub detail_type: String,
    pub new_image: BTreeMap<String, AttributeValue>,
}

impl ChangeRecord {
    /// Reads the envelope of a change record. `source` and `detail-type` are
    /// only required to be present strings.
    pub fn parse(record: &Value) -> Result<Self, ValidationError> {
        let envelope = validation::object("record", Some(record))?;
        let source = present_string("source", envelope.get("source"))?;
        let detail_type = present_string("detail-type", envelope.get("detail-type"))?;

        let detail = validation::object("detail", envelope.get("detail"))?;
        let stream = validation::object("detail.dynamodb", detail.get("dynamodb"))?;
        let image = validation::object(IMAGE_FIELD, stream.get("NewImage"))?;

        let new_image = image
            .iter()
            .map(|(name, raw)| {
                AttributeValue::deserialize(raw)
                    .map(|value| (name.clone(), value))
                    .map_err(|e| {
                        ValidationError::malformed(format!("{IMAGE_FIELD}.{name}"), e.to_string())
                    })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            source,
            detail_type,
            new_image,
        })
    }

    /// Returns the image as plain JSON.
    pub fn image_json(&self) -> Result<Value, ValidationError> {
        self.new_image
            .iter()
            .map(|(name, value)| {
                value
                    .clone()
                    .into_json()
                    .map(|json| (name.clone(), json))
                    .map_err(|message| {
                        ValidationError::malformed(format!("{IMAGE_FIELD}.{name}"), message)
                    })
            })
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(Value::Object)
    }
}

fn present_string(field: &str, raw: Option<&Value>) -> Result<String, ValidationError> {
    match raw {
        None => Err(ValidationError::missing(field)),
        Some(Value::Null) => Err(ValidationError::new(field, ValidationReason::Null)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ValidationError::new(
            field,
            ValidationReason::WrongType {
                expected: "string",
                found: validation::json_kind(other),
            },
        )),
    }
}

/// Decodes a change record and validates it as a restock event.
pub fn normalize(record: &Value) -> Result<SkuRestocked, ValidationError> {
    let record = ChangeRecord::parse(record)?;
    let payload = record.image_json()?;
    SkuRestocked::from_payload(&payload)
}

/// Same as [`normalize`] for a record that has not been parsed yet.
pub fn normalize_str(raw: &str) -> Result<SkuRestocked, ValidationError> {
    let record: Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::malformed("record", e.to_string()))?;
    normalize(&record)
}
