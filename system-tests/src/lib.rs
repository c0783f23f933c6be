// system-tests/src/lib.rs
// ============================================================================
// Module: Attestguard System Tests Library
// Description: Marker crate hosting cross-component end-to-end scenarios.
// Purpose: Let `tests/` exercise multiple workspace crates together without
//          any one component crate depending on its siblings' test fixtures.
// Dependencies: none
// ============================================================================

//! This crate has no runtime surface of its own; its `tests/` directory
//! holds the spec.md §8 seed scenarios that span more than one crate.
