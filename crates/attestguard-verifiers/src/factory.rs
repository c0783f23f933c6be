// crates/attestguard-verifiers/src/factory.rs
// ============================================================================
// Module: Verifier-Chain Factory (C4)
// Description: Builds the ordered KMS -> Gateway -> App verifier chain.
// Purpose: Turn an app config + discovered SystemInfo into a runnable chain.
// Dependencies: attestguard-clients, attestguard-core
// ============================================================================

//! ## Overview
//! Given an app config variant and a discovered [`SystemInfo`], builds the
//! ordered chain `[RedpillKms, Gateway, RedpillApp]` or `[PhalaCloudKms,
//! Gateway, PhalaCloudApp]` (spec.md §4.4); the KMS sub-variant is chosen by
//! `SystemInfo.kms_info.version` (legacy vs current — spec.md §9 "Legacy
//! KMS shape"). There is no separately discoverable KMS info endpoint in
//! the upstream contract, so the KMS's own attestation is served from the
//! same `gateway_app_url` host unless `kms_info_url` overrides it — a
//! documented assumption, not a spec requirement (see DESIGN.md).

use attestguard_clients::ChainRegistryShape;
use attestguard_clients::SystemInfo;
use attestguard_core::DataObjectKind;

use crate::chain::VerifierUnit;
use crate::checks::Subject;
use crate::clients::VerifierClients;
use crate::gateway::GatewayDomainConfig;
use crate::gateway::GatewayVerifier;
use crate::kms::KmsVerifier;
use crate::phala_cloud::PhalaCloudVerifier;
use crate::redpill::RedpillVerifier;

/// One of the two app-config variants the caller supplies (spec.md §4.4).
pub enum AppConfig {
    /// A redpill-hosted app, keyed by model name.
    Redpill {
        /// Smart-contract address governing this deployment.
        contract_address: String,
        /// Model name the app serves.
        model: String,
        /// Opaque metadata to carry into every verifier in the chain.
        metadata: serde_json::Value,
        /// Override for the KMS's own attestation endpoint, when known.
        kms_info_url: Option<String>,
    },
    /// A phala-cloud-hosted app, keyed by domain.
    PhalaCloud {
        /// Smart-contract address governing this deployment.
        contract_address: String,
        /// Domain the app is served under.
        domain: String,
        /// Opaque metadata to carry into every verifier in the chain.
        metadata: serde_json::Value,
        /// Override for the KMS's own attestation endpoint, when known.
        kms_info_url: Option<String>,
    },
}

impl AppConfig {
    fn contract_address(&self) -> &str {
        match self {
            Self::Redpill { contract_address, .. } | Self::PhalaCloud { contract_address, .. } => contract_address,
        }
    }

    fn metadata(&self) -> serde_json::Value {
        match self {
            Self::Redpill { metadata, .. } | Self::PhalaCloud { metadata, .. } => metadata.clone(),
        }
    }

    fn kms_info_url(&self) -> Option<&str> {
        match self {
            Self::Redpill { kms_info_url, .. } | Self::PhalaCloud { kms_info_url, .. } => kms_info_url.as_deref(),
        }
    }
}

fn registry_shape(system_info: &SystemInfo) -> ChainRegistryShape {
    if system_info.kms_info.is_legacy() {
        ChainRegistryShape::Legacy
    } else {
        ChainRegistryShape::Current
    }
}

fn domain_from_url(url: &str) -> String {
    url.trim_start_matches("https://").trim_start_matches("http://").split('/').next().unwrap_or(url).to_string()
}

/// Builds the ordered verifier chain for `config` given discovered `system_info`.
///
/// The static `getSystemInfo` call that produces `system_info` is the
/// caller's responsibility (spec.md §4.3 "Static discovery" via
/// [`crate::redpill::RedpillVerifier::get_system_info`] /
/// [`crate::phala_cloud::PhalaCloudVerifier::get_system_info`]), since its
/// failure is the one case that aborts a whole run before any chain exists
/// (spec.md §9 "Propagation policy").
#[must_use]
pub fn build_chain(clients: &VerifierClients, config: &AppConfig, system_info: &SystemInfo) -> Vec<VerifierUnit> {
    let shape = registry_shape(system_info);
    let chain_id = system_info.kms_info.chain_id;
    let metadata = config.metadata();

    let kms_info_url = config
        .kms_info_url()
        .map(str::to_string)
        .unwrap_or_else(|| system_info.kms_info.gateway_app_url.clone());
    let kms_subject = Subject {
        kind: DataObjectKind::Kms,
        info_url: kms_info_url,
        contract_address: system_info.kms_info.contract_address.clone(),
        chain_id,
        registry_shape: shape,
        has_gpu: false,
    };
    let kms = VerifierUnit::Kms(KmsVerifier::new(clients.clone(), kms_subject, metadata.clone()));

    let gateway_domain = domain_from_url(&system_info.kms_info.gateway_app_url);
    let gateway_subject = Subject {
        kind: DataObjectKind::Gateway,
        info_url: system_info.kms_info.gateway_app_url.clone(),
        contract_address: config.contract_address().to_string(),
        chain_id,
        registry_shape: shape,
        has_gpu: false,
    };
    let domain_config = GatewayDomainConfig {
        domain: gateway_domain,
        expected_caa_issuer: String::new(),
        expected_caa_account: String::new(),
        trusted_ct_issuers: Vec::new(),
    };
    let gateway = VerifierUnit::Gateway(GatewayVerifier::new(clients.clone(), gateway_subject, metadata.clone(), domain_config));

    let app = match config {
        AppConfig::Redpill { contract_address, model, .. } => {
            let subject = Subject {
                kind: DataObjectKind::App,
                info_url: system_info.kms_info.gateway_app_url.clone(),
                contract_address: contract_address.clone(),
                chain_id,
                registry_shape: shape,
                has_gpu: true,
            };
            VerifierUnit::Redpill(RedpillVerifier::new(clients.clone(), subject, metadata, model.clone()))
        }
        AppConfig::PhalaCloud { contract_address, domain, .. } => {
            let subject = Subject {
                kind: DataObjectKind::App,
                info_url: format!("https://{domain}"),
                contract_address: contract_address.clone(),
                chain_id,
                registry_shape: shape,
                has_gpu: false,
            };
            VerifierUnit::PhalaCloud(PhalaCloudVerifier::new(clients.clone(), subject, metadata, domain.clone()))
        }
    };

    vec![kms, gateway, app]
}

#[cfg(test)]
mod tests {
    use super::domain_from_url;

    #[test]
    fn domain_from_url_strips_scheme_and_path() {
        assert_eq!(domain_from_url("https://gateway.example.com/path"), "gateway.example.com");
        assert_eq!(domain_from_url("gateway.example.com"), "gateway.example.com");
    }
}
