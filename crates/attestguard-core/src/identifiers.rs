// crates/attestguard-core/src/identifiers.rs
// ============================================================================
// Module: Attestguard Identifiers
// Description: Canonical opaque identifiers for the measurement graph and task model.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers here are opaque and serialize as strings on the wire. The
//! data-object identifier is drawn from a closed enumeration; construction
//! validates membership rather than accepting arbitrary strings.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Dstack application identifier (primary key of [`crate::app::Application`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Creates a new application identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Surrogate task identifier (a UUID, represented as its canonical string form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task identifier from an existing UUID string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile surrogate identifier (a UUID, represented as its canonical string form).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRowId(String);

impl ProfileRowId {
    /// Creates a profile row identifier from an existing UUID string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Kind discriminant for data objects and profile entities.
///
/// # Invariants
/// - Serializes as a stable lowercase string for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataObjectKind {
    /// Key-management service object.
    Kms,
    /// Gateway object.
    Gateway,
    /// Application object.
    App,
}

impl DataObjectKind {
    /// Returns the wire-stable prefix used in data-object identifiers.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Kms => "kms",
            Self::Gateway => "gateway",
            Self::App => "app",
        }
    }
}

impl fmt::Display for DataObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The field component of a data-object identifier.
///
/// # Invariants
/// - `EventLogsImr` indices are always in `0..=3`.
/// - `Gpu` and `GpuQuote` are only constructible for [`DataObjectKind::App`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataObjectField {
    /// Top-level identity object (`*-main`).
    Main,
    /// Operating-system measurement object (`*-os`).
    Os,
    /// Source-code / compose object (`*-code`).
    Code,
    /// Hardware/CPU description object (`*-cpu`).
    Cpu,
    /// Decoded attestation quote object (`*-quote`).
    Quote,
    /// Event-log replay object for one RTMR index (`*-event-logs-imr{0..3}`).
    EventLogsImr(u8),
    /// Reproducible-build linkage object (`*-os-code`).
    OsCode,
    /// GPU description object (app-only, `app-gpu`).
    Gpu,
    /// GPU attestation quote object (app-only, `app-gpu-quote`).
    GpuQuote,
}

/// Error raised when a data-object identifier cannot be constructed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataObjectIdError {
    /// The event-log RTMR index was out of the valid `0..=3` range.
    #[error("rtmr index {0} out of range 0..=3")]
    ImrIndexOutOfRange(u8),
    /// `Gpu`/`GpuQuote` fields were requested for a non-app kind.
    #[error("field {field} is only valid for kind app, got {kind}")]
    FieldKindMismatch {
        /// Offending field name.
        field: &'static str,
        /// Offending kind.
        kind: DataObjectKind,
    },
    /// The identifier string did not match any closed-enumeration member.
    #[error("unrecognized data object identifier: {0}")]
    Unrecognized(String),
}

/// Closed-enumeration identifier for a data object in the measurement graph.
///
/// # Invariants
/// - Every valid value round-trips through [`Self::as_string`] / [`Self::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataObjectId {
    kind: DataObjectKind,
    field: DataObjectField,
}

impl DataObjectId {
    /// Constructs a data-object identifier, validating kind/field combinations.
    ///
    /// # Errors
    ///
    /// Returns [`DataObjectIdError`] when the index is out of range or the
    /// field is not valid for the given kind.
    pub fn new(kind: DataObjectKind, field: DataObjectField) -> Result<Self, DataObjectIdError> {
        if let DataObjectField::EventLogsImr(index) = field
            && index > 3
        {
            return Err(DataObjectIdError::ImrIndexOutOfRange(index));
        }
        if matches!(field, DataObjectField::Gpu | DataObjectField::GpuQuote)
            && kind != DataObjectKind::App
        {
            let name = if matches!(field, DataObjectField::Gpu) { "gpu" } else { "gpu-quote" };
            return Err(DataObjectIdError::FieldKindMismatch { field: name, kind });
        }
        Ok(Self { kind, field })
    }

    /// Returns the object kind.
    #[must_use]
    pub const fn kind(self) -> DataObjectKind {
        self.kind
    }

    /// Returns the object field.
    #[must_use]
    pub const fn field(self) -> DataObjectField {
        self.field
    }

    /// Renders the canonical wire string, e.g. `kms-event-logs-imr0`.
    #[must_use]
    pub fn as_string(self) -> String {
        let prefix = self.kind.prefix();
        match self.field {
            DataObjectField::Main => format!("{prefix}-main"),
            DataObjectField::Os => format!("{prefix}-os"),
            DataObjectField::Code => format!("{prefix}-code"),
            DataObjectField::Cpu => format!("{prefix}-cpu"),
            DataObjectField::Quote => format!("{prefix}-quote"),
            DataObjectField::EventLogsImr(index) => format!("{prefix}-event-logs-imr{index}"),
            DataObjectField::OsCode => format!("{prefix}-os-code"),
            DataObjectField::Gpu => "app-gpu".to_string(),
            DataObjectField::GpuQuote => "app-gpu-quote".to_string(),
        }
    }

    /// Parses a canonical wire string into a data-object identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DataObjectIdError::Unrecognized`] when the string does not
    /// match any closed-enumeration member.
    pub fn parse(value: &str) -> Result<Self, DataObjectIdError> {
        for kind in [DataObjectKind::Kms, DataObjectKind::Gateway, DataObjectKind::App] {
            let prefix = kind.prefix();
            let Some(rest) = value.strip_prefix(prefix).and_then(|r| r.strip_prefix('-')) else {
                continue;
            };
            let field = match rest {
                "main" => DataObjectField::Main,
                "os" => DataObjectField::Os,
                "code" => DataObjectField::Code,
                "cpu" => DataObjectField::Cpu,
                "quote" => DataObjectField::Quote,
                "os-code" => DataObjectField::OsCode,
                "gpu" => DataObjectField::Gpu,
                "gpu-quote" => DataObjectField::GpuQuote,
                other => {
                    if let Some(index) = other.strip_prefix("event-logs-imr") {
                        let parsed = index
                            .parse::<u8>()
                            .map_err(|_| DataObjectIdError::Unrecognized(value.to_string()))?;
                        DataObjectField::EventLogsImr(parsed)
                    } else {
                        return Err(DataObjectIdError::Unrecognized(value.to_string()));
                    }
                }
            };
            return Self::new(kind, field);
        }
        Err(DataObjectIdError::Unrecognized(value.to_string()))
    }
}

impl fmt::Display for DataObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl TryFrom<String> for DataObjectId {
    type Error = DataObjectIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DataObjectId> for String {
    fn from(value: DataObjectId) -> Self {
        value.as_string()
    }
}

#[cfg(test)]
mod tests {
    use super::DataObjectField;
    use super::DataObjectId;
    use super::DataObjectIdError;
    use super::DataObjectKind;

    #[test]
    fn round_trips_main_objects() {
        for kind in [DataObjectKind::Kms, DataObjectKind::Gateway, DataObjectKind::App] {
            let id = DataObjectId::new(kind, DataObjectField::Main).expect("construct");
            let rendered = id.as_string();
            assert_eq!(DataObjectId::parse(&rendered).expect("parse"), id);
        }
    }

    #[test]
    fn round_trips_event_log_imr() {
        let id = DataObjectId::new(DataObjectKind::Kms, DataObjectField::EventLogsImr(2))
            .expect("construct");
        assert_eq!(id.as_string(), "kms-event-logs-imr2");
    }

    #[test]
    fn rejects_out_of_range_imr() {
        let result = DataObjectId::new(DataObjectKind::App, DataObjectField::EventLogsImr(7));
        assert_eq!(result, Err(DataObjectIdError::ImrIndexOutOfRange(7)));
    }

    #[test]
    fn rejects_gpu_for_non_app_kind() {
        let result = DataObjectId::new(DataObjectKind::Kms, DataObjectField::Gpu);
        assert!(matches!(result, Err(DataObjectIdError::FieldKindMismatch { .. })));
    }

    #[test]
    fn gpu_objects_are_app_prefixed() {
        let id =
            DataObjectId::new(DataObjectKind::App, DataObjectField::GpuQuote).expect("construct");
        assert_eq!(id.as_string(), "app-gpu-quote");
    }

    #[test]
    fn parse_rejects_unknown_string() {
        assert_eq!(
            DataObjectId::parse("kms-nonsense"),
            Err(DataObjectIdError::Unrecognized("kms-nonsense".to_string()))
        );
    }
}
