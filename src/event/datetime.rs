//! Date-time codec between the backend's wire layout and the internal one.
//!
//! The backend speaks `dd-mm-yyyy hh:mm AM/PM`; stores, payloads, and the
//! validator use `YYYY-MM-DDTHH:MM`. Conversion happens at the HTTP edge
//! only, so everything inside the wizard sorts and compares naturally.

use chrono::NaiveDateTime;

pub use crate::schema::validate::{parse_internal_datetime, INTERNAL_DATETIME_FORMAT};

pub const WIRE_DATETIME_FORMAT: &str = "%d-%m-%Y %I:%M %p";

pub fn parse_wire(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), WIRE_DATETIME_FORMAT).ok()
}

pub fn format_wire(value: NaiveDateTime) -> String {
    value.format(WIRE_DATETIME_FORMAT).to_string()
}

pub fn parse_internal(raw: &str) -> Option<NaiveDateTime> {
    parse_internal_datetime(raw)
}

pub fn format_internal(value: NaiveDateTime) -> String {
    value.format(INTERNAL_DATETIME_FORMAT).to_string()
}

/// Serde adapter for entity fields that carry wire-format date-times.
pub mod wire_serde {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_wire, parse_wire, WIRE_DATETIME_FORMAT};

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_wire(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wire(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "expected a `{WIRE_DATETIME_FORMAT}` date-time, got `{raw}`"
            ))
        })
    }
}
