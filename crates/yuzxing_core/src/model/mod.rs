//! Record model for the notes store.
//!
//! # Responsibility
//! - Define the `Note`, `Folder` and `Tag` records plus their write inputs.
//! - Define the export snapshot wire shape.
//!
//! # Invariants
//! - Record ids are assigned by the store and never reused.
//! - Note deletion is a soft-delete flag until the note is purged.
//! - Timestamps are UTC with millisecond precision.

pub mod folder;
pub mod note;
pub mod snapshot;
pub mod tag;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// UTC timestamp used on every record.
pub type Timestamp = DateTime<Utc>;

/// Returns the current time truncated to the precision the store persists.
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3)
}

/// Formats a timestamp as the ISO-8601 text stored in SQLite.
pub fn format_timestamp(value: &Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses ISO-8601 text produced by [`format_timestamp`] (or any RFC 3339 value).
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Serde adapter that writes timestamps in the stored millisecond form.
///
/// Use with `#[serde(with = "crate::model::timestamp_text")]`.
pub(crate) mod timestamp_text {
    use super::{format_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        Timestamp::deserialize(deserializer)
    }

    /// Same as the parent module for `Option<Timestamp>` fields.
    pub mod option {
        use super::super::{format_timestamp, Timestamp};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_some(&format_timestamp(value)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            Option::<Timestamp>::deserialize(deserializer)
        }
    }
}
