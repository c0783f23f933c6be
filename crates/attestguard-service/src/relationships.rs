// crates/attestguard-service/src/relationships.rs
// ============================================================================
// Module: Cross-Verifier Relationships
// Description: Fixed KMS -> Gateway -> App measured-by wiring (spec.md §4.5).
// Purpose: Link each main identity object to the KMS identity that attests it.
// Dependencies: attestguard-core
// ============================================================================

//! ## Overview
//! Once every verifier in a chain has run, three fixed relationships are
//! wired onto the collector (spec.md §4.5): the KMS's gateway-app pointer
//! measures the gateway's own id, and the KMS's certificate measures both
//! the gateway's and the app's presented certificate. The current on-chain
//! registry shape names the exact field on each side; the legacy shape only
//! asserts object-level measurement (spec.md §9 "Legacy KMS shape").

use attestguard_core::DataObjectCollector;
use attestguard_core::DataObjectField;
use attestguard_core::DataObjectId;
use attestguard_core::DataObjectKind;
use attestguard_core::MeasuredByLink;
use attestguard_core::VerifierRelationship;

fn main_id(kind: DataObjectKind) -> DataObjectId {
    DataObjectId::new(kind, DataObjectField::Main).unwrap_or_else(|_| unreachable!("{{kind, Main}} is always valid"))
}

fn field_relationship(src: DataObjectId, dst: DataObjectId, field: &str) -> VerifierRelationship {
    VerifierRelationship {
        src,
        dst,
        link: Some(MeasuredByLink::SourceField),
        field: Some(field.to_string()),
    }
}

fn object_relationship(src: DataObjectId, dst: DataObjectId) -> VerifierRelationship {
    VerifierRelationship { src, dst, link: None, field: None }
}

/// Appends the fixed KMS -> Gateway -> App relationships to `collector`.
///
/// When `legacy` is true, relationships degrade to plain object-level
/// `measured_by` links with no field name, since the legacy on-chain
/// registry shape does not expose per-field KMS identity.
pub fn wire_cross_verifier_relationships(collector: &mut DataObjectCollector, legacy: bool) {
    let kms_main = main_id(DataObjectKind::Kms);
    let gateway_main = main_id(DataObjectKind::Gateway);
    let app_main = main_id(DataObjectKind::App);

    let relationships = if legacy {
        vec![object_relationship(kms_main, gateway_main), object_relationship(kms_main, app_main)]
    } else {
        vec![
            field_relationship(kms_main, gateway_main, "gateway_app_id"),
            field_relationship(kms_main, gateway_main, "cert_pubkey"),
            field_relationship(kms_main, app_main, "cert_pubkey"),
        ]
    };
    collector.configure_verifier_relationships(&relationships);
}

#[cfg(test)]
mod tests {
    use attestguard_core::DataObject;
    use attestguard_core::DataObjectCollector;
    use attestguard_core::DataObjectField;
    use attestguard_core::DataObjectId;
    use attestguard_core::DataObjectKind;

    use super::wire_cross_verifier_relationships;

    fn register_mains(collector: &mut DataObjectCollector) {
        for kind in [DataObjectKind::Kms, DataObjectKind::Gateway, DataObjectKind::App] {
            let id = DataObjectId::new(kind, DataObjectField::Main).expect("valid id");
            collector.register(DataObject::new(id, format!("{}-main", kind.prefix()), String::new()));
        }
    }

    #[test]
    fn current_shape_produces_three_field_scoped_links() {
        let mut collector = DataObjectCollector::new();
        register_mains(&mut collector);
        wire_cross_verifier_relationships(&mut collector, false);

        let gateway_main = DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Main).expect("valid id");
        let app_main = DataObjectId::new(DataObjectKind::App, DataObjectField::Main).expect("valid id");
        assert_eq!(collector.get(&gateway_main).expect("present").measured_by.len(), 2);
        assert_eq!(collector.get(&app_main).expect("present").measured_by.len(), 1);
        assert!(collector.is_closed_graph());
    }

    #[test]
    fn legacy_shape_produces_object_level_links_only() {
        let mut collector = DataObjectCollector::new();
        register_mains(&mut collector);
        wire_cross_verifier_relationships(&mut collector, true);

        let gateway_main = DataObjectId::new(DataObjectKind::Gateway, DataObjectField::Main).expect("valid id");
        let link = &collector.get(&gateway_main).expect("present").measured_by[0];
        assert!(link.link.is_none());
        assert!(link.field.is_none());
    }
}
