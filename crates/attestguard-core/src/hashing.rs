// crates/attestguard-core/src/hashing.rs
// ============================================================================
// Module: Attestguard Hashing
// Description: SHA-256/384 digests and RTMR event-log replay, shared across verifiers.
// Purpose: Give every verifier and test the same primitives for compose hashes and register replay.
// Dependencies: hex, sha2
// Grounded on: decision-gate-core::core::hashing (HashAlgorithm/HashDigest/hash_bytes shape)
// ============================================================================

//! ## Overview
//! The OS check (spec.md §4.3) reproduces MRTD/RTMR0..3 from event-log
//! entries and compares them to the quote's registers; the source-code check
//! computes `sha256(compose_file)`. Both live here so the computation is
//! identical whether called from a verifier, the service's invariant tests,
//! or a standalone reproducibility check.

use sha2::Digest;
use sha2::Sha256;
use sha2::Sha384;

/// One event-log entry contributing to an RTMR replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogEntry {
    /// RTMR index this entry extends (0..=3).
    pub imr: u8,
    /// Raw event digest bytes (already hashed by the producer).
    pub digest: Vec<u8>,
}

/// Returns the lowercase hex-encoded SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Returns the lowercase hex-encoded SHA-384 digest of `bytes`.
#[must_use]
pub fn sha384_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha384::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Returns the SHA-256 digest of the concatenation of `parts`, matching the
/// `sha256` calculation function's "concatenated input fields" semantics.
#[must_use]
pub fn sha256_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Returns the SHA-384 digest of the concatenation of `parts`.
#[must_use]
pub fn sha384_concat(parts: &[&[u8]]) -> String {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// Replays one RTMR register from its ordered event-log entries.
///
/// A TDX RTMR extend is `rtmr' = sha384(rtmr || digest)`, starting from a
/// 48-byte zero register, applied in event-log order. Only entries whose
/// `imr` matches `index` are folded in.
#[must_use]
pub fn replay_rtmr(index: u8, events: &[EventLogEntry]) -> String {
    let mut register = [0_u8; 48];
    for event in events.iter().filter(|event| event.imr == index) {
        let mut hasher = Sha384::new();
        hasher.update(register);
        hasher.update(&event.digest);
        register.copy_from_slice(&hasher.finalize());
    }
    hex::encode(register)
}

#[cfg(test)]
mod tests {
    use super::EventLogEntry;
    use super::replay_rtmr;
    use super::sha256_concat;
    use super::sha256_hex;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_concat_equals_sha256_of_joined_bytes() {
        let joined = sha256_hex(b"ab");
        let concat = sha256_concat(&[b"a", b"b"]);
        assert_eq!(joined, concat);
    }

    #[test]
    fn replay_rtmr_is_deterministic_and_order_sensitive() {
        let events = vec![
            EventLogEntry {
                imr: 0,
                digest: vec![1; 48],
            },
            EventLogEntry {
                imr: 1,
                digest: vec![2; 48],
            },
            EventLogEntry {
                imr: 0,
                digest: vec![3; 48],
            },
        ];
        let replayed = replay_rtmr(0, &events);
        let reordered = vec![events[2].clone(), events[0].clone()];
        let replayed_reordered = replay_rtmr(0, &reordered);
        assert_ne!(replayed, replayed_reordered);
        assert_eq!(replay_rtmr(0, &events), replayed);
    }

    #[test]
    fn replay_rtmr_ignores_other_indices() {
        let events = vec![EventLogEntry {
            imr: 2,
            digest: vec![9; 48],
        }];
        assert_eq!(replay_rtmr(0, &events), hex::encode([0_u8; 48]));
    }
}
