// crates/attestguard-queue/src/lib.rs
// ============================================================================
// Module: Attestguard Queue Library
// Description: Public API surface for the bounded worker-pool task queue (C7).
// Purpose: Expose the pool handle plus its config/error types.
// Dependencies: crate::{app_config, config, error, pool, worker}
// ============================================================================

//! ## Overview
//! `attestguard-queue` is the dispatch layer between C6 (the durable store)
//! and C5 (the verification service): [`TaskQueue`] polls
//! `verification_tasks.status` for pending rows, runs each claimed task
//! through `attestguard_service::verify`, and uploads its report through
//! `attestguard-blob`. Postgres is the queue of record; there is no
//! separate broker process (spec.md §9, resolved as an Open Question in
//! DESIGN.md).

mod worker;

pub mod app_config;
pub mod config;
pub mod error;
pub mod pool;

pub use app_config::build_app_config;
pub use config::QueueConfig;
pub use error::QueueError;
pub use pool::TaskQueue;
