// crates/attestguard-config/src/lib.rs
// ============================================================================
// Module: Attestguard Config Library
// Description: Public API surface for environment-variable configuration.
// Purpose: Expose the canonical config model plus its error type.
// Dependencies: crate::{config, env, error}
// ============================================================================

//! ## Overview
//! One entry point, [`AttestguardConfig::from_env`], loads every C6-C9
//! dependency's configuration from the process environment per spec.md §6.

mod env;

pub mod config;
pub mod error;

pub use config::AdapterConfig;
pub use config::AttestguardConfig;
pub use config::AuthConfig;
pub use config::RpcConfig;
pub use config::ServerConfig;
pub use error::ConfigError;
