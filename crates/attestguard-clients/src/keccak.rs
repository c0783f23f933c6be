// crates/attestguard-clients/src/keccak.rs
// ============================================================================
// Module: Keccak-256
// Description: Self-contained Keccak-f[1600] permutation for Solidity ABI selectors.
// Purpose: Derive 4-byte function selectors without a blockchain SDK dependency.
// Dependencies: none (pure bit manipulation over the standard library)
// ============================================================================

//! ## Overview
//! The on-chain registry adapter needs the Keccak-256 (not NIST SHA3-256)
//! hash of a function's canonical signature to build its 4-byte selector.
//! No crate in this workspace's stack provides Keccak, and a full blockchain
//! SDK is out of proportion to "hash one short ASCII string", so the
//! permutation is implemented directly here.

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

const ROTATION_OFFSETS: [[u32; 5]; 5] = [
    [0, 36, 3, 41, 18],
    [1, 44, 10, 45, 2],
    [62, 6, 43, 15, 61],
    [28, 55, 25, 21, 56],
    [27, 20, 39, 8, 14],
];

fn keccak_f(state: &mut [u64; 25]) {
    for round_constant in ROUND_CONSTANTS {
        // Theta
        let mut c = [0_u64; 5];
        for (x, slot) in c.iter_mut().enumerate() {
            *slot = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        let mut d = [0_u64; 5];
        for x in 0..5 {
            d[x] = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
        }
        for x in 0..5 {
            for y in 0..5 {
                state[x + 5 * y] ^= d[x];
            }
        }

        // Rho and Pi
        let mut b = [0_u64; 25];
        for x in 0..5 {
            for y in 0..5 {
                let new_x = y;
                let new_y = (2 * x + 3 * y) % 5;
                b[new_x + 5 * new_y] = state[x + 5 * y].rotate_left(ROTATION_OFFSETS[x][y]);
            }
        }

        // Chi
        for x in 0..5 {
            for y in 0..5 {
                state[x + 5 * y] =
                    b[x + 5 * y] ^ ((!b[(x + 1) % 5 + 5 * y]) & b[(x + 2) % 5 + 5 * y]);
            }
        }

        // Iota
        state[0] ^= round_constant;
    }
}

/// Computes the Keccak-256 digest of `input` (the Ethereum/Solidity variant,
/// which uses the original `0x01` padding rather than NIST SHA3's `0x06`).
#[must_use]
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    const RATE_BYTES: usize = 136; // 1088 bits for Keccak-256 (capacity = 512 bits)

    let mut state = [0_u64; 25];
    let mut chunks = input.chunks_exact(RATE_BYTES);
    for chunk in chunks.by_ref() {
        absorb(&mut state, chunk);
        keccak_f(&mut state);
    }
    let remainder = chunks.remainder();
    let mut last_block = vec![0_u8; RATE_BYTES];
    last_block[..remainder.len()].copy_from_slice(remainder);
    last_block[remainder.len()] ^= 0x01;
    last_block[RATE_BYTES - 1] ^= 0x80;
    absorb(&mut state, &last_block);
    keccak_f(&mut state);

    let mut output = [0_u8; 32];
    for (index, word) in state.iter().take(4).enumerate() {
        output[index * 8..index * 8 + 8].copy_from_slice(&word.to_le_bytes());
    }
    output
}

fn absorb(state: &mut [u64; 25], block: &[u8]) {
    for (index, word_bytes) in block.chunks_exact(8).enumerate() {
        let mut word_array = [0_u8; 8];
        word_array.copy_from_slice(word_bytes);
        state[index] ^= u64::from_le_bytes(word_array);
    }
}

/// Computes the 4-byte Solidity function selector for a canonical signature
/// such as `"allowedComposeHashes(bytes32)"`.
#[must_use]
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

#[cfg(test)]
mod tests {
    use super::function_selector;
    use super::keccak256;

    #[test]
    fn keccak256_empty_input_matches_known_vector() {
        let digest = keccak256(b"");
        assert_eq!(
            hex::encode(digest),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a47d"
        );
    }

    #[test]
    fn keccak256_abc_matches_known_vector() {
        let digest = keccak256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn function_selector_is_four_bytes_and_deterministic() {
        let first = function_selector("allowedComposeHashes(bytes32)");
        let second = function_selector("allowedComposeHashes(bytes32)");
        assert_eq!(first, second);
        assert_ne!(first, function_selector("allowedKmsId()"));
    }
}
