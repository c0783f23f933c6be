// system-tests/tests/flags_monotonicity.rs
// ============================================================================
// Scenario: spec.md §8 invariant 2 — disabling a flag is monotone: the set
// of enabled steps only shrinks, never grows, and no flag combination
// escapes that ordering.
// ============================================================================

use attestguard_core::VerificationFlags;

fn all_flag_combinations() -> Vec<VerificationFlags> {
    let mut combos = Vec::with_capacity(128);
    for mask in 0u8 .. 128 {
        combos.push(VerificationFlags {
            hardware: mask & 0b0000001 != 0,
            os: mask & 0b0000010 != 0,
            source_code: mask & 0b0000100 != 0,
            tee_controlled_key: mask & 0b0001000 != 0,
            certificate_key: mask & 0b0010000 != 0,
            dns_caa: mask & 0b0100000 != 0,
            ct_log: mask & 0b1000000 != 0,
        });
    }
    combos
}

#[test]
fn every_flag_set_is_a_subset_of_all_enabled() {
    for flags in all_flag_combinations() {
        assert!(flags.is_subset_of(VerificationFlags::all()));
    }
}

#[test]
fn fast_profile_is_a_strict_subset_of_all() {
    let fast = VerificationFlags::fast();
    let all = VerificationFlags::all();
    assert!(fast.is_subset_of(all));
    assert_ne!(fast, all);
}

#[test]
fn is_subset_of_is_reflexive_and_transitive_over_the_lattice() {
    let combos = all_flag_combinations();
    for flags in &combos {
        assert!(flags.is_subset_of(*flags));
    }
    // Transitivity: if a <= b and b <= all, then a <= all (spot-checked
    // against the fast profile as the middle element).
    let fast = VerificationFlags::fast();
    for flags in &combos {
        if flags.is_subset_of(fast) {
            assert!(flags.is_subset_of(VerificationFlags::all()));
        }
    }
}
