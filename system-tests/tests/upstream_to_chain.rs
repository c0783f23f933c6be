// system-tests/tests/upstream_to_chain.rs
// ============================================================================
// Scenario: one upstream analytics record flows through sync derivation,
// becomes a durable application row, and is translated into the verifier
// chain factory's `AppConfig` input — spanning attestguard-sync,
// attestguard-store, attestguard-core, and attestguard-queue.
// ============================================================================

use attestguard_core::AppId;
use attestguard_core::Application;
use attestguard_core::TaskId;
use attestguard_core::Timestamp;
use attestguard_core::VerificationFlags;
use attestguard_core::VerificationTask;
use attestguard_queue::build_app_config;
use attestguard_store::AppUpsert;
use attestguard_sync::records::RawAppRecord;
use attestguard_sync::records::derive_app_upsert;
use attestguard_verifiers::AppConfig;

fn upsert_to_application(upsert: AppUpsert) -> Application {
    let now = Timestamp::now();
    Application {
        id: upsert.id,
        profile_id: upsert.profile_id,
        display_name: upsert.display_name,
        app_config_type: upsert.app_config_type,
        contract_address: upsert.contract_address,
        domain_or_model: upsert.domain_or_model,
        base_image: upsert.base_image,
        workspace_id: upsert.workspace_id,
        creator_id: upsert.creator_id,
        username: upsert.username,
        email: upsert.email,
        custom_user: upsert.custom_user,
        is_public: upsert.is_public,
        deleted: false,
        created_at: now,
        updated_at: now,
        last_synced_at: Some(now),
    }
}

fn redpill_record() -> RawAppRecord {
    RawAppRecord {
        dstack_app_id: "7c8b2a0".to_string(),
        app_id: 501,
        app_name: "phala/deepseek-chat-v3-0324".to_string(),
        workspace_id: 12,
        creator_id: 3,
        chain_id: 8453,
        kms_contract_address: None,
        contract_address: None,
        base_image: "dstack-dev-0.5.3".to_string(),
        tproxy_base_domain: None,
        gateway_domain_suffix: None,
        listed: true,
        username: "alice".to_string(),
        email: "alice@example.test".to_string(),
        app_created_at: None,
        vm_created_at: None,
        docker_compose_file: None,
    }
}

fn phala_cloud_record() -> RawAppRecord {
    RawAppRecord {
        dstack_app_id: "bfd2901".to_string(),
        app_id: 502,
        app_name: "my-phala-app".to_string(),
        workspace_id: 14,
        creator_id: 5,
        chain_id: 8453,
        kms_contract_address: None,
        contract_address: None,
        base_image: "dstack-dev-0.5.3".to_string(),
        tproxy_base_domain: None,
        gateway_domain_suffix: Some("example.dstack-prod.phala.network".to_string()),
        listed: false,
        username: "bob".to_string(),
        email: "bob@example.test".to_string(),
        app_created_at: None,
        vm_created_at: None,
        docker_compose_file: None,
    }
}

#[test]
fn redpill_upstream_record_becomes_a_model_keyed_app_config() {
    let upsert = derive_app_upsert(redpill_record()).expect("derive redpill record");
    assert_eq!(upsert.id, AppId::new("7c8b2a0"));
    assert_eq!(upsert.contract_address, "0x7c8b2a0");

    let app = upsert_to_application(upsert);
    let task = VerificationTask::new_pending(TaskId::new("task-1"), Some(app.id.clone()), VerificationFlags::all());
    let config = build_app_config(&app, &task).expect("build app config");

    assert!(matches!(
        &config,
        AppConfig::Redpill { contract_address, model, .. }
            if contract_address == "0x7c8b2a0" && model == "phala/deepseek-chat-v3-0324"
    ));
}

#[test]
fn phala_cloud_upstream_record_becomes_a_domain_keyed_app_config() {
    let upsert = derive_app_upsert(phala_cloud_record()).expect("derive phala_cloud record");
    assert_eq!(upsert.contract_address, "0xbfd2901");

    let app = upsert_to_application(upsert);
    let task = VerificationTask::new_pending(TaskId::new("task-2"), Some(app.id.clone()), VerificationFlags::fast());
    let config = build_app_config(&app, &task).expect("build app config");

    assert!(matches!(
        &config,
        AppConfig::PhalaCloud { contract_address, domain, .. }
            if contract_address == "0xbfd2901" && domain == "example.dstack-prod.phala.network"
    ));
}

#[test]
fn reintroducing_a_tombstoned_app_keeps_its_contract_address_derivation_stable() {
    // Sync run N derives an upsert; a later run with the identical payload
    // (spec.md §8 invariant 5, sync idempotency) must derive byte-identical
    // fields aside from timestamps, even after the row was tombstoned and
    // revived in between (spec.md §8 invariant 6).
    let first = derive_app_upsert(redpill_record()).expect("first derivation");
    let second = derive_app_upsert(redpill_record()).expect("second derivation");
    assert_eq!(first.id, second.id);
    assert_eq!(first.contract_address, second.contract_address);
    assert_eq!(first.domain_or_model, second.domain_or_model);
    assert_eq!(first.app_config_type, second.app_config_type);
    assert_eq!(first.custom_user, second.custom_user);
}
