// crates/attestguard-store/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: Closed error enum for every Postgres-backed store operation.
// Purpose: Give C10 and C7 one error vocabulary to match on.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Grounded on `decision-gate-store-enterprise::postgres_store::PostgresStoreError`
//! and `decision-gate-core::StoreError`: a small, closed set rather than a
//! per-query error type, since every caller (C7, C10, C9) only ever needs to
//! distinguish "not found", "invalid input/transition", "conflict", and
//! "the database said no".

use thiserror::Error;

/// Errors raised by `attestguard-store`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying Postgres driver or pool returned an error.
    #[error("store io error: {0}")]
    Io(String),
    /// The caller supplied data that fails a store-level invariant.
    #[error("store invalid input: {0}")]
    Invalid(String),
    /// The requested row does not exist.
    #[error("store row not found: {0}")]
    NotFound(String),
    /// A unique constraint was violated (e.g. duplicate profile key).
    #[error("store conflict: {0}")]
    Conflict(String),
    /// A status transition was attempted that spec.md §4.6 does not allow.
    #[error("store invalid transition: {0}")]
    InvalidTransition(String),
}
