use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, ValidationError};

/// Stock keeping unit identifier.
///
/// Always trimmed and at least four characters long.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    /// Validates and wraps a SKU.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::validate_identifier("sku", raw).map(Self)
    }

    /// Validates a SKU held in a JSON field.
    pub fn from_field(field: &str, raw: Option<&Value>) -> Result<Self, ValidationError> {
        validation::identifier(field, raw).map(Self)
    }

    /// Returns the SKU as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Sku {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Sku {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self {
        sku.0
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a physical restock batch.
///
/// A lot can be recorded at most once per SKU.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LotId(String);

impl LotId {
    /// Validates and wraps a lot identifier.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::validate_identifier("lotId", raw).map(Self)
    }

    /// Validates a lot identifier held in a JSON field.
    pub fn from_field(field: &str, raw: Option<&Value>) -> Result<Self, ValidationError> {
        validation::identifier(field, raw).map(Self)
    }

    /// Returns the lot identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LotId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LotId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LotId> for String {
    fn from(lot_id: LotId) -> Self {
        lot_id.0
    }
}

impl AsRef<str> for LotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A positive number of stock units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Units(u32);

impl Units {
    /// Validates a unit count (must be at least 1).
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        validation::validate_units("units", value).map(Self)
    }

    /// Validates a unit count held in a JSON field.
    pub fn from_field(field: &str, raw: Option<&Value>) -> Result<Self, ValidationError> {
        validation::units(field, raw).map(Self)
    }

    /// Returns the raw count.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Returns the count widened for storage arithmetic.
    pub fn as_i64(&self) -> i64 {
        i64::from(self.0)
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Units {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Units> for i64 {
    fn from(units: Units) -> Self {
        units.as_i64()
    }
}

/// A point in time as carried on events, commands and stored items.
///
/// Kept in its textual form: stored timestamps double as ordering keys, so
/// they must compare lexicographically. Timestamps produced here are RFC 3339
/// in UTC with millisecond precision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Returns the current time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Formats a UTC time, e.g. `2024-03-01T12:00:00.000Z`.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Validates a textual timestamp.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::validate_timestamp("timestamp", raw).map(Self)
    }

    /// Validates a timestamp held in a JSON field.
    pub fn from_field(field: &str, raw: Option<&Value>) -> Result<Self, ValidationError> {
        validation::timestamp(field, raw).map(Self)
    }

    /// Returns the timestamp text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}
