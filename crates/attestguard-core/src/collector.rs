// crates/attestguard-core/src/collector.rs
// ============================================================================
// Module: Data-Object Collector
// Description: Per-run registry of data objects and their measured-by links (C1).
// Purpose: Let verifiers publish artifacts without sharing process-global state.
// Dependencies: crate::data_object, crate::identifiers
// ============================================================================

//! ## Overview
//! [`DataObjectCollector`] is owned per verification run and threaded by
//! `&mut` through the verifier chain, mirroring how the teacher's runtime
//! threads a run-scoped state through evaluation without a global
//! (`decision-gate-core::runtime`). It is never a process-wide singleton:
//! concurrent workers each get their own instance.

use std::collections::BTreeMap;

use crate::data_object::Calculation;
use crate::data_object::DataObject;
use crate::data_object::FieldValue;
use crate::data_object::MeasuredBy;
use crate::data_object::MeasuredByLink;
use crate::identifiers::DataObjectId;

/// A batch relationship to wire after a verifier chain completes, naming the
/// source and destination objects and, optionally, the specific fields on
/// each side of the link.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierRelationship {
    /// The data object that measures `dst`.
    pub src: DataObjectId,
    /// The data object being measured.
    pub dst: DataObjectId,
    /// The kind of link, when the relationship is field-scoped.
    pub link: Option<MeasuredByLink>,
    /// The field name on the side the link refers to.
    pub field: Option<String>,
}

/// Per-run registry of data objects, exclusively owned by one verification run.
#[derive(Debug, Default, Clone)]
pub struct DataObjectCollector {
    objects: BTreeMap<DataObjectId, DataObject>,
    order: Vec<DataObjectId>,
}

impl DataObjectCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically creates or merges a data object.
    ///
    /// If an object already exists for `payload.id`, its `fields` map is
    /// merged key-by-key (new entries overwrite old ones for the same key);
    /// every other attribute (name, description, calculations, measured_by,
    /// placeholder_only) is replaced wholesale by the newer payload, matching
    /// the merge policy in spec.md §4.1.
    pub fn register(&mut self, payload: DataObject) {
        let id = payload.id;
        match self.objects.get_mut(&id) {
            Some(existing) => {
                for (key, value) in payload.fields {
                    existing.fields.insert(key, value);
                }
                existing.name = payload.name;
                existing.description = payload.description;
                existing.calculations = payload.calculations;
                existing.measured_by = payload.measured_by;
                existing.placeholder_only = payload.placeholder_only;
            }
            None => {
                self.order.push(id);
                self.objects.insert(id, payload);
            }
        }
    }

    /// Sets a single field on an existing (or newly created placeholder)
    /// object, merging by key per the register merge policy.
    pub fn set_field(&mut self, id: DataObjectId, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.objects.get_mut(&id) {
            Some(existing) => {
                existing.fields.insert(key, value);
            }
            None => {
                self.order.push(id);
                let mut object = DataObject::new(id, id.to_string(), String::new());
                object.placeholder_only = true;
                object.fields.insert(key, value);
                self.objects.insert(id, object);
            }
        }
    }

    /// Appends a calculation to an existing object, if present.
    pub fn add_calculation(&mut self, id: DataObjectId, calculation: Calculation) {
        if let Some(existing) = self.objects.get_mut(&id) {
            existing.calculations.push(calculation);
        }
    }

    /// Appends a `measured-by` entry on `dst` pointing to `src`.
    pub fn link_measured_by(
        &mut self,
        src: DataObjectId,
        dst: DataObjectId,
        link: Option<MeasuredByLink>,
        field: Option<String>,
    ) {
        match self.objects.get_mut(&dst) {
            Some(existing) => {
                existing.measured_by.push(MeasuredBy {
                    src,
                    link,
                    field,
                });
            }
            None => {
                self.order.push(dst);
                let mut object = DataObject::new(dst, dst.to_string(), String::new());
                object.placeholder_only = true;
                object.measured_by.push(MeasuredBy {
                    src,
                    link,
                    field,
                });
                self.objects.insert(dst, object);
            }
        }
    }

    /// Applies a batch of relationships (used post-chain to wire KMS→Gateway
    /// and KMS→App relationships, per spec.md §4.5).
    pub fn configure_verifier_relationships(&mut self, relationships: &[VerifierRelationship]) {
        for relationship in relationships {
            self.link_measured_by(
                relationship.src,
                relationship.dst,
                relationship.link,
                relationship.field.clone(),
            );
        }
    }

    /// Returns the full set of data objects in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<DataObject> {
        self.order.iter().filter_map(|id| self.objects.get(id).cloned()).collect()
    }

    /// Returns true when every `measured-by` reference in the collector
    /// resolves to an object also present in the collector (spec.md §3
    /// closed-graph invariant).
    #[must_use]
    pub fn is_closed_graph(&self) -> bool {
        self.objects
            .values()
            .all(|object| object.measured_by.iter().all(|link| self.objects.contains_key(&link.src)))
    }

    /// Resets the registry, discarding all objects. Used between runs when a
    /// collector instance is reused rather than freshly constructed.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.order.clear();
    }

    /// Returns true when no objects have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Looks up a single object by identifier.
    #[must_use]
    pub fn get(&self, id: &DataObjectId) -> Option<&DataObject> {
        self.objects.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::DataObjectCollector;
    use crate::data_object::DataObject;
    use crate::data_object::FieldValue;
    use crate::identifiers::DataObjectField;
    use crate::identifiers::DataObjectId;
    use crate::identifiers::DataObjectKind;

    fn id(kind: DataObjectKind, field: DataObjectField) -> DataObjectId {
        DataObjectId::new(kind, field).expect("valid id")
    }

    #[test]
    fn register_merges_fields_by_key() {
        let mut collector = DataObjectCollector::new();
        let kms_main = id(DataObjectKind::Kms, DataObjectField::Main);
        collector.register(
            DataObject::new(kms_main, "KMS", "desc")
                .with_field("a", FieldValue::Text("1".to_string())),
        );
        collector.register(
            DataObject::new(kms_main, "KMS", "desc2")
                .with_field("b", FieldValue::Text("2".to_string())),
        );
        let object = collector.get(&kms_main).expect("present");
        assert_eq!(object.fields.len(), 2);
        assert_eq!(object.description, "desc2");
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let mut collector = DataObjectCollector::new();
        let first = id(DataObjectKind::Kms, DataObjectField::Main);
        let second = id(DataObjectKind::Gateway, DataObjectField::Main);
        collector.register(DataObject::new(second, "Gateway", String::new()));
        collector.register(DataObject::new(first, "KMS", String::new()));
        let snapshot = collector.snapshot();
        assert_eq!(snapshot[0].id, second);
        assert_eq!(snapshot[1].id, first);
    }

    #[test]
    fn closed_graph_detects_dangling_reference() {
        let mut collector = DataObjectCollector::new();
        let kms_main = id(DataObjectKind::Kms, DataObjectField::Main);
        let gateway_main = id(DataObjectKind::Gateway, DataObjectField::Main);
        collector.register(DataObject::new(gateway_main, "Gateway", String::new()));
        collector.link_measured_by(kms_main, gateway_main, None, None);
        assert!(!collector.is_closed_graph());
        collector.register(DataObject::new(kms_main, "KMS", String::new()));
        assert!(collector.is_closed_graph());
    }

    #[test]
    fn clear_resets_state() {
        let mut collector = DataObjectCollector::new();
        collector.register(DataObject::new(
            id(DataObjectKind::App, DataObjectField::Main),
            "App",
            String::new(),
        ));
        collector.clear();
        assert!(collector.is_empty());
        assert!(collector.snapshot().is_empty());
    }
}
