// crates/attestguard-core/src/time.rs
// ============================================================================
// Module: Attestguard Timestamps
// Description: Wire-stable ISO-8601 UTC timestamp helpers.
// Purpose: Give every persisted row and report a single timestamp representation.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Every timestamp on the wire and in the store is an ISO-8601 string in UTC
//! with second precision, produced by [`Timestamp::now`] and parsed back by
//! [`Timestamp::parse`]. Keeping one representation avoids the drift between
//! a numeric epoch and a formatted string that a hand-rolled mix would invite.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// An ISO-8601 UTC timestamp, serialized as its RFC 3339 string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "rfc3339_seconds")] OffsetDateTime);

impl Timestamp {
    /// Returns the current instant, truncated to whole seconds.
    #[must_use]
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        Self(now.replace_nanosecond(0).unwrap_or(now))
    }

    /// Wraps an existing offset date-time, normalizing it to UTC.
    #[must_use]
    pub fn from_offset(value: OffsetDateTime) -> Self {
        Self(value.to_offset(time::UtcOffset::UTC))
    }

    /// Parses an RFC 3339 string into a timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not valid RFC 3339.
    pub fn parse(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).map(Self::from_offset)
    }

    /// Renders the canonical RFC 3339 string form.
    #[must_use]
    pub fn to_rfc3339(self) -> String {
        self.0.format(&Rfc3339).unwrap_or_default()
    }

    /// Returns the underlying offset date-time.
    #[must_use]
    pub const fn as_offset(self) -> OffsetDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

mod rfc3339_seconds {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub(super) fn serialize<S: Serializer>(
        value: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let rendered = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&rendered)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn round_trips_through_rfc3339() {
        let now = Timestamp::now();
        let rendered = now.to_rfc3339();
        let parsed = Timestamp::parse(&rendered).expect("parse");
        assert_eq!(now, parsed);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Timestamp::parse("not-a-timestamp").is_err());
    }
}
