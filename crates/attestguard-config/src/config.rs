// crates/attestguard-config/src/config.rs
// ============================================================================
// Module: Attestguard Configuration
// Description: Environment-variable configuration loading and validation
//              for the full attestguard deployment (spec.md §6).
// Purpose: One `AttestguardConfig::from_env()` entry point for C10/the CLI.
// Dependencies: attestguard-blob, attestguard-queue, attestguard-store,
//              attestguard-sync, crate::env
// ============================================================================

//! ## Overview
//! Configuration here is sourced entirely from the process environment
//! (spec.md §6's variable table), not a file: each nested section loads
//! itself with a `from_env()` constructor and a `validate()` pass, mirroring
//! `decision-gate-config`'s per-section load-then-validate shape without its
//! TOML-file framing (this deployment's configuration surface is
//! environment variables end to end — see DESIGN.md).

use attestguard_blob::S3BlobStoreConfig;
use attestguard_core::VerificationFlags;
use attestguard_queue::QueueConfig;
use attestguard_store::PostgresStoreConfig;
use attestguard_sync::SyncConfig;

use crate::env;
use crate::error::ConfigError;

/// HTTP server bind/runtime settings (`PORT`, `HOST`, `NODE_ENV`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port the HTTP surface binds to.
    pub port: u16,
    /// Bind host.
    pub host: String,
    /// Deployment environment label (`"development"`, `"production"`, ...).
    pub node_env: String,
}

impl ServerConfig {
    /// Loads server settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `PORT` is set but not a valid
    /// `u16`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env::parse_or("PORT", 8080u16)?,
            host: env::optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            node_env: env::optional("NODE_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }

    /// Validates server settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `host` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("HOST must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Cron-trigger authorisation (`CRON_API_KEY`, required and non-empty per spec.md §6).
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key demanded on cron-trigger endpoints.
    pub cron_api_key: String,
}

impl AuthConfig {
    /// Loads auth settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `CRON_API_KEY` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cron_api_key: env::required("CRON_API_KEY")?,
        })
    }

    /// Validates auth settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `cron_api_key` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cron_api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("CRON_API_KEY must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// On-chain RPC endpoints, keyed by chain (`BASE_RPC_URL`, `ETHEREUM_RPC_URL`).
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC endpoint for Base-chain registries.
    pub base_rpc_url: Option<String>,
    /// RPC endpoint for Ethereum-mainnet registries.
    pub ethereum_rpc_url: Option<String>,
}

impl RpcConfig {
    /// Loads RPC settings from the environment. Both fields are optional;
    /// an application whose chain id resolves to an unconfigured RPC fails
    /// at verification time (`ConfigInvalid`), not at startup.
    pub fn from_env() -> Self {
        Self {
            base_rpc_url: env::optional("BASE_RPC_URL"),
            ethereum_rpc_url: env::optional("ETHEREUM_RPC_URL"),
        }
    }
}

/// Construction settings for the C2 attestation adapters (spec.md §6
/// "Outbound attestation endpoints"). The NVIDIA and CT-log endpoints are
/// fixed upstream conventions, not deployment-specific, so only their
/// request timeout is configurable here; the quote tool's binary path and
/// the gateway system-info URL template are genuinely deployment-specific
/// (**expansion**: spec.md names neither an env var, only "a configured
/// path"/"a model- or domain-derived URL" — see the Open Question entry
/// in DESIGN.md).
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Path to the local TDX quote decode/verify binary.
    pub quote_tool_path: String,
    /// URL template for gateway system-info discovery, with `{target}`
    /// substituted for a redpill model name or phala-cloud domain.
    pub system_info_url_template: String,
    /// Request timeout applied to every outbound C2 adapter call.
    pub timeout_ms: u64,
}

impl AdapterConfig {
    /// Loads adapter settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `ATTESTGUARD_ADAPTER_TIMEOUT_MS`
    /// is set but not a valid `u64`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            quote_tool_path: env::optional("QUOTE_TOOL_PATH")
                .unwrap_or_else(|| "attestguard-quote-tool".to_string()),
            system_info_url_template: env::optional("SYSTEM_INFO_URL_TEMPLATE")
                .unwrap_or_else(|| "https://{target}/prpc/Info".to_string()),
            timeout_ms: env::parse_or("ATTESTGUARD_ADAPTER_TIMEOUT_MS", 10_000u64)?,
        })
    }
}

/// Full configuration for a running attestguard deployment.
#[derive(Debug, Clone)]
pub struct AttestguardConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Blob-store settings.
    pub blob: S3BlobStoreConfig,
    /// Task-store (Postgres) settings.
    pub database: PostgresStoreConfig,
    /// Worker-pool settings.
    pub queue: QueueConfig,
    /// Analytics-sync settings.
    pub sync: SyncConfig,
    /// Cron-trigger auth settings.
    pub auth: AuthConfig,
    /// On-chain RPC settings.
    pub rpc: RpcConfig,
    /// C2 attestation-adapter construction settings.
    pub adapters: AdapterConfig,
    /// Default verification flags (`VERIFICATION_FLAGS`).
    pub default_flags: VerificationFlags,
    /// `tracing-subscriber` `EnvFilter` directive (`RUST_LOG`).
    pub rust_log: String,
}

impl AttestguardConfig {
    /// Loads and validates the full configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or any
    /// section fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let server = ServerConfig::from_env()?;
        server.validate()?;

        let blob = S3BlobStoreConfig {
            bucket: env::required("S3_BUCKET")?,
            endpoint: env::optional("S3_ENDPOINT"),
            access_key_id: env::required("S3_ACCESS_KEY_ID")?,
            secret_access_key: env::required("S3_SECRET_ACCESS_KEY")?,
            region: env::optional("S3_REGION"),
            force_path_style: env::parse_or("S3_FORCE_PATH_STYLE", false)?,
        };

        let database = PostgresStoreConfig {
            connection: env::required("DATABASE_URL")?,
            ..PostgresStoreConfig::default()
        };

        let queue = QueueConfig {
            concurrency: env::parse_or("QUEUE_CONCURRENCY", QueueConfig::default().concurrency)?,
            max_attempts: env::parse_or("QUEUE_MAX_ATTEMPTS", QueueConfig::default().max_attempts)?,
            backoff_delay_ms: env::parse_or(
                "QUEUE_BACKOFF_DELAY",
                QueueConfig::default().backoff_delay_ms,
            )?,
            ..QueueConfig::default()
        };

        let sync = SyncConfig {
            profile_query_url: env::required("METABASE_PROFILE_QUERY")?,
            app_query_url: env::required("METABASE_APP_QUERY")?,
            api_key: env::required("METABASE_API_KEY")?,
            timeout_ms: env::parse_or("ATTESTGUARD_SYNC_TIMEOUT_MS", 10_000u64)?,
            profile_interval_ms: env::parse_or("ATTESTGUARD_PROFILE_SYNC_INTERVAL_MS", 60_000u64)?,
            app_interval_ms: env::parse_or("ATTESTGUARD_APP_SYNC_INTERVAL_MS", 300_000u64)?,
            allowed_dstack_versions: env::csv("ATTESTGUARD_QUEUE_ALLOWED_DSTACK_VERSIONS"),
        };

        let auth = AuthConfig::from_env()?;
        auth.validate()?;

        let rpc = RpcConfig::from_env();
        let adapters = AdapterConfig::from_env()?;

        let default_flags = match env::optional("VERIFICATION_FLAGS").as_deref() {
            None | Some("all") => VerificationFlags::all(),
            Some("fast") => VerificationFlags::fast(),
            Some(csv) => VerificationFlags::from_csv(csv),
        };

        let rust_log = env::optional("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server,
            blob,
            database,
            queue,
            sync,
            auth,
            rpc,
            adapters,
            default_flags,
            rust_log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;

    #[test]
    fn server_validate_rejects_empty_host() {
        let config = ServerConfig {
            port: 8080,
            host: String::new(),
            node_env: "test".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
