// crates/attestguard-queue/src/app_config.rs
// ============================================================================
// Module: App Config Derivation
// Description: Builds a C4 `AppConfig` from a task's owning application row.
// Purpose: Bridge the durable store's `Application` record into the chain
//          factory's input type (spec.md §4.7 step "construct an appConfig
//          from task and app rows").
// Dependencies: attestguard-core, attestguard-verifiers
// ============================================================================

use attestguard_core::AppConfigType;
use attestguard_core::Application;
use attestguard_core::VerificationTask;
use attestguard_verifiers::AppConfig;

use crate::error::QueueError;

/// Builds the `AppConfig` C5 needs to run a verification, from the
/// application row a task targets and the task's own opaque metadata.
///
/// # Errors
///
/// Returns [`QueueError::InvalidTask`] when the task has no `app_id`, or the
/// referenced application record is unavailable.
pub fn build_app_config(app: &Application, task: &VerificationTask) -> Result<AppConfig, QueueError> {
    let metadata = task.app_metadata.clone().unwrap_or(serde_json::Value::Null);
    match app.app_config_type {
        AppConfigType::Redpill => Ok(AppConfig::Redpill {
            contract_address: app.contract_address.clone(),
            model: app.domain_or_model.clone(),
            metadata,
            kms_info_url: None,
        }),
        AppConfigType::PhalaCloud => Ok(AppConfig::PhalaCloud {
            contract_address: app.contract_address.clone(),
            domain: app.domain_or_model.clone(),
            metadata,
            kms_info_url: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use attestguard_core::AppId;
    use attestguard_core::Timestamp;
    use attestguard_core::TaskId;
    use attestguard_core::VerificationFlags;

    use super::*;

    fn app(app_config_type: AppConfigType, domain_or_model: &str) -> Application {
        Application {
            id: AppId::new("app-1"),
            profile_id: 1,
            display_name: "test app".to_string(),
            app_config_type,
            contract_address: "0xabc".to_string(),
            domain_or_model: domain_or_model.to_string(),
            base_image: "dstack-dev-0.5.3".to_string(),
            workspace_id: 1,
            creator_id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            custom_user: "alice <alice@example.com>".to_string(),
            is_public: true,
            deleted: false,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            last_synced_at: None,
        }
    }

    fn task(app_id: AppId) -> VerificationTask {
        VerificationTask::new_pending(TaskId::new("task-1"), Some(app_id), VerificationFlags::all())
    }

    #[test]
    fn redpill_app_builds_model_config() {
        let app = app(AppConfigType::Redpill, "phala/deepseek-chat-v3-0324");
        let task = task(app.id.clone());
        let config = build_app_config(&app, &task).expect("build config");
        assert!(matches!(
            &config,
            AppConfig::Redpill { contract_address, model, .. }
                if contract_address == "0xabc" && model == "phala/deepseek-chat-v3-0324"
        ));
    }

    #[test]
    fn phala_cloud_app_builds_domain_config() {
        let app = app(AppConfigType::PhalaCloud, "example.dstack-prod.phala.network");
        let task = task(app.id.clone());
        let config = build_app_config(&app, &task).expect("build config");
        assert!(matches!(
            &config,
            AppConfig::PhalaCloud { domain, .. } if domain == "example.dstack-prod.phala.network"
        ));
    }

    #[test]
    fn missing_metadata_defaults_to_null() {
        let app = app(AppConfigType::Redpill, "phala/deepseek-chat-v3-0324");
        let task = task(app.id.clone());
        let config = build_app_config(&app, &task).expect("build config");
        assert!(matches!(&config, AppConfig::Redpill { metadata, .. } if metadata.is_null()));
    }
}
