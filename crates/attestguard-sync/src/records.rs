// crates/attestguard-sync/src/records.rs
// ============================================================================
// Module: Analytics Record Shapes and Derivation
// Description: Raw upstream payload shapes plus the field-derivation rules
//              of spec.md §4.9 steps 1-4.
// Purpose: Turn one analytics response row into a store `*Upsert` value.
// Dependencies: serde, attestguard-core, attestguard-store, crate::version
// ============================================================================

use attestguard_core::AppConfigType;
use attestguard_core::AppId;
use attestguard_core::ProfileEntityType;
use attestguard_store::AppUpsert;
use attestguard_store::ProfileUpsert;
use serde::Deserialize;

use crate::error::SyncError;
use crate::version::DstackVersion;

/// Minimum `base_image` version at which the contract address is derived
/// directly from `dstack_app_id` and the domain field switches to
/// `gateway_domain_suffix` (spec.md §4.9 step 2/3).
const CONTRACT_FROM_APP_ID_SINCE: DstackVersion = DstackVersion { major: 0, minor: 5, patch: 3, build: 0 };
/// Minimum version at which `contract_address` is populated at all
/// (spec.md §4.9 step 2: below this, the field is skipped/empty).
const CONTRACT_FIELD_SINCE: DstackVersion = DstackVersion { major: 0, minor: 5, patch: 1, build: 0 };

/// One raw profile record returned by the analytics endpoint
/// (spec.md §4.9 "Profile sync").
#[derive(Debug, Clone, Deserialize)]
pub struct RawProfileRecord {
    /// Entity kind as a wire string (`"app"`, `"user"`, `"workspace"`).
    pub entity_type: String,
    /// Upstream numeric entity id.
    pub entity_id: i64,
    /// Display name.
    pub display_name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Custom domain.
    pub custom_domain: Option<String>,
}

/// One raw app record returned by the analytics endpoint
/// (spec.md §4.9 "App sync"). Field names mirror the upstream payload
/// verbatim, not this crate's internal naming.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAppRecord {
    /// Dstack application id; becomes [`Application::id`](attestguard_core::Application::id).
    pub dstack_app_id: String,
    /// Upstream numeric application id; the unique per-app id the app's
    /// `profile_id` is derived from (`workspace_id` is shared by every app
    /// in a workspace and cannot serve as a unique key, see
    /// [`derive_app_upsert`]).
    pub app_id: i64,
    /// Application display name, and the `redpill` model name when the app
    /// carries no domain fields (see [`derive_app_upsert`]).
    pub app_name: String,
    /// Numeric upstream workspace id.
    pub workspace_id: i64,
    /// Numeric upstream creator id.
    pub creator_id: i64,
    /// On-chain RPC chain id (unused by sync derivation; consumed by C3/C4).
    #[allow(dead_code, reason = "present on the wire, consumed elsewhere in the pipeline")]
    pub chain_id: i64,
    /// Legacy contract address field, superseded by `contract_address` at 0.5.1+.
    #[allow(dead_code, reason = "kms contract is resolved via SystemInfo at verify time")]
    pub kms_contract_address: Option<String>,
    /// Contract address as reported upstream (used only for 0.5.1 ≤ version < 0.5.3).
    pub contract_address: Option<String>,
    /// Base image string encoding the dstack version.
    pub base_image: String,
    /// Gateway proxy base domain (used below version 0.5.3).
    pub tproxy_base_domain: Option<String>,
    /// Gateway domain suffix (used at version 0.5.3 and above).
    pub gateway_domain_suffix: Option<String>,
    /// Public-listing flag.
    pub listed: bool,
    /// Upstream username.
    pub username: String,
    /// Upstream email.
    pub email: String,
    /// App creation time (unused by derivation; informational).
    #[allow(dead_code, reason = "informational upstream timestamp, not persisted")]
    pub app_created_at: Option<String>,
    /// VM creation time (unused by derivation; informational).
    #[allow(dead_code, reason = "informational upstream timestamp, not persisted")]
    pub vm_created_at: Option<String>,
    /// Raw compose file contents (not used during sync; read during verification).
    #[allow(dead_code, reason = "consumed by the OS verifier, not by sync")]
    pub docker_compose_file: Option<String>,
}

/// Converts a raw profile record into a validated [`ProfileUpsert`].
///
/// # Errors
///
/// Returns [`SyncError::InvalidPayload`] when `entity_type` is not one of
/// `"app"`, `"user"`, `"workspace"`.
pub fn derive_profile_upsert(record: RawProfileRecord) -> Result<ProfileUpsert, SyncError> {
    let entity_type = match record.entity_type.as_str() {
        "app" => ProfileEntityType::App,
        "user" => ProfileEntityType::User,
        "workspace" => ProfileEntityType::Workspace,
        other => return Err(SyncError::InvalidPayload(format!("unknown entity_type {other}"))),
    };
    Ok(ProfileUpsert {
        entity_type,
        entity_id: record.entity_id,
        display_name: record.display_name,
        avatar_url: record.avatar_url,
        description: record.description,
        custom_domain: record.custom_domain,
    })
}

/// Converts a raw app record into a validated [`AppUpsert`], applying the
/// version-gated derivation rules of spec.md §4.9 steps 1-4.
///
/// The upstream payload (spec.md §4.9) carries no explicit "is this a
/// redpill or phala_cloud app" flag; step 1's phrasing ("the record model
/// implies a domain-based app; a model record implies redpill") is resolved
/// here against the fields that actually distinguish the two families: an
/// app with a non-empty gateway/tproxy domain is `phala_cloud`, using that
/// domain; an app with neither is `redpill`, using `app_name` as the model
/// (see DESIGN.md Open Question decisions).
///
/// `custom_user` has no derivation rule in spec.md; this implementation
/// formats it as `"<username> <<email>>"`, matching the only place the
/// upstream schema ties an account to both fields (see DESIGN.md).
///
/// `profile_id` is derived from the record's own `app_id`, not
/// `workspace_id`: `apps.profile_id` is declared unique (spec.md §4.6), but
/// `workspace_id` is shared by every app created in the same workspace, so
/// a second app in a workspace would collide with the first on
/// `idx_apps_profile_id` (see DESIGN.md).
///
/// # Errors
///
/// Returns [`SyncError::Derivation`] when `base_image` carries no parseable
/// dstack version.
pub fn derive_app_upsert(record: RawAppRecord) -> Result<AppUpsert, SyncError> {
    let version = DstackVersion::parse(&record.base_image)
        .ok_or_else(|| SyncError::Derivation(format!("unparseable base_image {:?}", record.base_image)))?;

    let domain = record
        .gateway_domain_suffix
        .filter(|value| !value.is_empty())
        .or_else(|| record.tproxy_base_domain.filter(|value| !value.is_empty()));

    let (app_config_type, domain_or_model) = match domain {
        Some(domain) => (AppConfigType::PhalaCloud, domain),
        None => (AppConfigType::Redpill, record.app_name.clone()),
    };

    let contract_address = if version >= CONTRACT_FROM_APP_ID_SINCE {
        format!("0x{}", record.dstack_app_id)
    } else if version >= CONTRACT_FIELD_SINCE {
        record.contract_address.unwrap_or_default()
    } else {
        String::new()
    };

    Ok(AppUpsert {
        id: AppId::new(record.dstack_app_id),
        profile_id: record.app_id,
        display_name: record.app_name,
        app_config_type,
        contract_address,
        domain_or_model,
        base_image: record.base_image,
        workspace_id: record.workspace_id,
        creator_id: record.creator_id,
        username: record.username.clone(),
        email: record.email.clone(),
        custom_user: format!("{} <{}>", record.username, record.email),
        is_public: record.listed,
    })
}

#[cfg(test)]
mod tests {
    use super::RawAppRecord;
    use super::derive_app_upsert;
    use attestguard_core::AppConfigType;

    fn base_record() -> RawAppRecord {
        RawAppRecord {
            dstack_app_id: "abc123".to_string(),
            app_id: 1,
            app_name: "phala/deepseek-chat-v3-0324".to_string(),
            workspace_id: 7,
            creator_id: 9,
            chain_id: 8453,
            kms_contract_address: None,
            contract_address: None,
            base_image: "dstack-dev-0.5.3".to_string(),
            tproxy_base_domain: None,
            gateway_domain_suffix: None,
            listed: true,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            app_created_at: None,
            vm_created_at: None,
            docker_compose_file: None,
        }
    }

    #[test]
    fn derives_contract_address_from_app_id_at_0_5_3() {
        let upsert = derive_app_upsert(base_record()).expect("derives");
        assert_eq!(upsert.contract_address, "0xabc123");
        assert_eq!(upsert.app_config_type, AppConfigType::Redpill);
        assert_eq!(upsert.domain_or_model, "phala/deepseek-chat-v3-0324");
    }

    #[test]
    fn derives_phala_cloud_from_gateway_domain() {
        let mut record = base_record();
        record.gateway_domain_suffix = Some("example.dstack-prod.phala.network".to_string());
        let upsert = derive_app_upsert(record).expect("derives");
        assert_eq!(upsert.app_config_type, AppConfigType::PhalaCloud);
        assert_eq!(upsert.domain_or_model, "example.dstack-prod.phala.network");
    }

    #[test]
    fn uses_legacy_contract_field_between_0_5_1_and_0_5_3() {
        let mut record = base_record();
        record.base_image = "dstack-dev-0.5.1".to_string();
        record.contract_address = Some("0xlegacy".to_string());
        let upsert = derive_app_upsert(record).expect("derives");
        assert_eq!(upsert.contract_address, "0xlegacy");
    }

    #[test]
    fn empty_contract_address_below_0_5_1() {
        let mut record = base_record();
        record.base_image = "dstack-dev-0.4.9".to_string();
        let upsert = derive_app_upsert(record).expect("derives");
        assert_eq!(upsert.contract_address, "");
    }

    #[test]
    fn profile_id_is_unique_per_app_not_per_workspace() {
        let mut first = base_record();
        first.dstack_app_id = "app-one".to_string();
        first.app_id = 501;
        let mut second = base_record();
        second.dstack_app_id = "app-two".to_string();
        second.app_id = 502;
        // Both apps share a workspace; profile_id must still differ.
        assert_eq!(first.workspace_id, second.workspace_id);

        let first_upsert = derive_app_upsert(first).expect("derives");
        let second_upsert = derive_app_upsert(second).expect("derives");
        assert_eq!(first_upsert.profile_id, 501);
        assert_eq!(second_upsert.profile_id, 502);
        assert_ne!(first_upsert.profile_id, second_upsert.profile_id);
    }

    #[test]
    fn rejects_unparseable_base_image() {
        let mut record = base_record();
        record.base_image = "not-a-version".to_string();
        assert!(derive_app_upsert(record).is_err());
    }
}
