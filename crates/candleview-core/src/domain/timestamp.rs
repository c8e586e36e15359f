use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::error::TimestampError;

/// Absolute point in time, pinned to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    /// Interpret a Unix epoch-milliseconds value.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, TimestampError> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map(Self)
            .map_err(|_| TimestampError::Unparseable {
                value: millis.to_string(),
            })
    }

    /// Parse a textual date-time. Accepted forms, tried in order:
    /// RFC3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (assumed UTC),
    /// `YYYY-MM-DD` (midnight UTC), and all-digit epoch-milliseconds text.
    pub fn parse_text(input: &str) -> Result<Self, TimestampError> {
        let trimmed = input.trim();

        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self(parsed.to_offset(time::UtcOffset::UTC)));
        }

        let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, spaced) {
            return Ok(Self(parsed.assume_utc()));
        }

        let tee = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, tee) {
            return Ok(Self(parsed.assume_utc()));
        }

        let date_only = format_description!("[year]-[month]-[day]");
        if let Ok(parsed) = Date::parse(trimmed, date_only) {
            return Ok(Self(parsed.midnight().assume_utc()));
        }

        // Some exports store epoch milliseconds in a TEXT column.
        if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            if let Ok(millis) = trimmed.parse::<i64>() {
                return Self::from_epoch_millis(millis);
            }
        }

        Err(TimestampError::Unparseable {
            value: input.to_owned(),
        })
    }

    pub fn unix_millis(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .expect("UtcDateTime must be RFC3339 formattable")
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse_text(&value).map_err(D::Error::custom)
    }
}

/// Raw timestamp as stored in the database. The source data observed both
/// encodings across versions, so consumers must detect per row, never assume
/// a deployment-wide encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTimestamp {
    EpochMillis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Classify a SQLite cell by its storage class.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, TimestampError> {
        match value {
            serde_json::Value::Number(number) => {
                if let Some(millis) = number.as_i64() {
                    return Ok(Self::EpochMillis(millis));
                }
                // REAL-typed epoch columns show up in some exports.
                match number.as_f64() {
                    Some(float) if float.is_finite() => Ok(Self::EpochMillis(float as i64)),
                    _ => Err(TimestampError::Unparseable {
                        value: number.to_string(),
                    }),
                }
            }
            serde_json::Value::String(text) => Ok(Self::Text(text.clone())),
            other => Err(TimestampError::Unparseable {
                value: other.to_string(),
            }),
        }
    }

    /// Normalize either encoding into the canonical UTC type.
    pub fn normalize(&self) -> Result<UtcDateTime, TimestampError> {
        match self {
            Self::EpochMillis(millis) => UtcDateTime::from_epoch_millis(*millis),
            Self::Text(text) => UtcDateTime::parse_text(text),
        }
    }
}

/// Detect and normalize a raw cell in one step.
pub fn normalize_value(value: &serde_json::Value) -> Result<UtcDateTime, TimestampError> {
    RawTimestamp::from_value(value)?.normalize()
}
