// crates/attestguard-core/src/data_object.rs
// ============================================================================
// Module: Attestguard Data Objects
// Description: The measurement-graph node type and its calculations/back-references.
// Purpose: Give every verifier a common, open-keyed artifact shape to publish into.
// Dependencies: serde_json, crate::identifiers
// ============================================================================

//! ## Overview
//! A [`DataObject`] is the unit of the measurement graph (spec.md §3). Fields
//! are an open-keyed map of heterogeneous values; `calculations` name the
//! derivation a reader can replay; `measured_by` links this object to the
//! objects whose evidence measures it.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::DataObjectId;

/// A heterogeneous value held in a data object's `fields` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A UTF-8 string value.
    Text(String),
    /// A hex-encoded byte blob.
    Hex(String),
    /// A URL value.
    Url(String),
    /// Arbitrary structured JSON.
    Json(serde_json::Value),
}

impl FieldValue {
    /// Returns the value as a string slice when it is a text, hex, or URL variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Hex(value) | Self::Url(value) => Some(value),
            Self::Json(_) => None,
        }
    }
}

/// The named function applied by a [`Calculation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationFunction {
    /// SHA-256 digest of the concatenated input fields.
    Sha256,
    /// SHA-384 digest of the concatenated input fields.
    Sha384,
    /// Replays an RTMR register from an ordered event log.
    ReplayRtmr,
    /// Compares a reproducible build's source to its published artifacts.
    ReproducibleBuild,
}

/// A named derivation from input fields to output fields, replayable by a reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    /// Field names (on this object) feeding the calculation.
    pub inputs: Vec<String>,
    /// The named function applied to the inputs.
    pub function: CalculationFunction,
    /// Field names (on this object, or a linked sibling) produced by the calculation.
    pub outputs: Vec<String>,
}

/// A field-level or object-level link naming an input to a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasuredByLink {
    /// The link names a field on the source object.
    SourceField,
    /// The link names a field on this (destination) object.
    SelfField,
    /// The link names a calculation output on the source object.
    SourceCalcOutput,
    /// The link names a calculation output on this (destination) object.
    SelfCalcOutput,
}

/// A back-reference recording that `src` measures this object, optionally
/// naming the field or calculation output the reference is scoped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredBy {
    /// The data object that measures this one.
    pub src: DataObjectId,
    /// The kind of link, when the reference names a specific field.
    pub link: Option<MeasuredByLink>,
    /// The field name the link refers to, when `link` is set.
    pub field: Option<String>,
}

/// A node in the measurement graph (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    /// Closed-enumeration identifier.
    pub id: DataObjectId,
    /// Human-readable name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Kind discriminant (kms / gateway / app), mirrored from `id.kind()`.
    pub kind: crate::identifiers::DataObjectKind,
    /// Open-keyed field map.
    pub fields: BTreeMap<String, FieldValue>,
    /// Calculations replayable from this object's fields.
    pub calculations: Vec<Calculation>,
    /// Back-references to the objects that measure this one.
    pub measured_by: Vec<MeasuredBy>,
    /// True when this entry exists only to hold placeholder fields (no
    /// verification has actually run against it yet).
    pub placeholder_only: bool,
}

impl DataObject {
    /// Builds a new, empty data object for the given identifier.
    #[must_use]
    pub fn new(id: DataObjectId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: id.kind(),
            id,
            name: name.into(),
            description: description.into(),
            fields: BTreeMap::new(),
            calculations: Vec::new(),
            measured_by: Vec::new(),
            placeholder_only: false,
        }
    }

    /// Sets a field value, returning `self` for chained construction.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Appends a calculation, returning `self` for chained construction.
    #[must_use]
    pub fn with_calculation(mut self, calculation: Calculation) -> Self {
        self.calculations.push(calculation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Calculation;
    use super::CalculationFunction;
    use super::DataObject;
    use super::FieldValue;
    use crate::identifiers::DataObjectField;
    use crate::identifiers::DataObjectId;
    use crate::identifiers::DataObjectKind;

    #[test]
    fn builder_chains_populate_fields_and_calculations() {
        let id = DataObjectId::new(DataObjectKind::Kms, DataObjectField::Main).expect("id");
        let object = DataObject::new(id, "KMS", "KMS identity")
            .with_field("gateway_app_id", FieldValue::Text("app-1".to_string()))
            .with_calculation(Calculation {
                inputs: vec!["compose_file".to_string()],
                function: CalculationFunction::Sha256,
                outputs: vec!["compose_hash".to_string()],
            });
        assert_eq!(object.fields.len(), 1);
        assert_eq!(object.calculations.len(), 1);
        assert_eq!(object.kind, DataObjectKind::Kms);
    }
}
