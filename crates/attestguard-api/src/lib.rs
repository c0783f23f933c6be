// crates/attestguard-api/src/lib.rs
// ============================================================================
// Module: Attestguard API Library
// Description: Public API surface for the HTTP task API (C10).
// Purpose: Expose the router builder plus shared state and error types.
// Dependencies: crate::{error, routes, state}
// ============================================================================

//! ## Overview
//! `attestguard-api` is C10's HTTP surface: task CRUD/retry, read-only
//! app/task/widget queries, and bearer-gated cron-trigger routes for C9's
//! sync ticks and C7's reaper. Built on `axum`/`axum-server`, grounded on
//! `decision-gate-mcp`'s HTTP transport — the only crate in the retrieved
//! pack combining `axum`, `axum-server`, and a durable store behind one
//! `Arc<State>` (spec.md §4.10).

mod routes;
mod serve;
mod state;

pub mod error;

pub use error::ApiError;
pub use routes::build_router;
pub use serve::serve;
pub use state::ApiState;
