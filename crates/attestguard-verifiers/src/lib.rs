// crates/attestguard-verifiers/src/lib.rs
// ============================================================================
// Crate: attestguard-verifiers
// Description: Polymorphic verifier units, their shared checks, and the
//              chain factory that assembles KMS -> Gateway -> App chains.
// ============================================================================

//! ## Overview
//! This crate is C3 and C4 of the verification pipeline. [`capability`]
//! defines the narrow capability traits every verifier variant satisfies;
//! [`kms`], [`gateway`], [`redpill`], and [`phala_cloud`] are the closed set
//! of variants; [`chain`] wraps them in one tagged enum; [`factory`] builds
//! the ordered chain from an app config and a discovered `SystemInfo`.

pub mod capability;
pub mod chain;
pub mod checks;
pub mod clients;
pub mod factory;
pub mod gateway;
pub mod gateway_checks;
pub mod kms;
pub mod phala_cloud;
pub mod redpill;

pub use capability::GatewayCapabilities;
pub use capability::Verifier;
pub use chain::VerifierUnit;
pub use checks::Subject;
pub use clients::VerifierClients;
pub use factory::AppConfig;
pub use factory::build_chain;
pub use gateway::GatewayDomainConfig;
pub use gateway::GatewayVerifier;
pub use kms::KmsVerifier;
pub use phala_cloud::PhalaCloudVerifier;
pub use redpill::RedpillVerifier;
