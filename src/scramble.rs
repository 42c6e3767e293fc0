//! Multiplicative hash scrambling.
//!
//! Caller-supplied hashes are often low quality — identity hashes of small
//! integers, pointer values with aligned low bits, sequential IDs. Mapping
//! such a hash straight to a bucket index clusters everything into a few
//! chains. The fix is Fibonacci hashing: multiply by an odd constant close
//! to `2^W / φ` before truncating to an index, which spreads consecutive
//! inputs across the whole output range.
//!
//! [`HashTable`](crate::HashTable) applies [`mix64`] internally before every
//! bucket-index computation, so callers never need to call these functions
//! to use the table. They are exported for callers that want the same
//! scrambling at other widths (e.g., to fold a 32-bit hash into a bitmap
//! index) or in their own probing schemes.

/// Fibonacci multiplier for 16-bit hashes, an odd constant near `2^16 / φ`.
pub const MULT16: u16 = 0x9e3b;

/// Fibonacci multiplier for 32-bit hashes, an odd constant near `2^32 / φ`.
pub const MULT32: u32 = 0x9e37_79b1;

/// Fibonacci multiplier for 64-bit hashes, an odd constant near `2^64 / φ`.
pub const MULT64: u64 = 0x9e37_79b9_7f4a_7c55;

/// Scrambles a 16-bit hash.
///
/// Pure and deterministic. The multiplier is odd, so this is a bijection on
/// `u16`: scrambling never merges two distinct hashes.
#[inline(always)]
pub const fn mix16(hash: u16) -> u16 {
    hash.wrapping_mul(MULT16)
}

/// Scrambles a 32-bit hash.
///
/// Pure and deterministic. The multiplier is odd, so this is a bijection on
/// `u32`.
#[inline(always)]
pub const fn mix32(hash: u32) -> u32 {
    hash.wrapping_mul(MULT32)
}

/// Scrambles a 64-bit hash.
///
/// Pure and deterministic. The multiplier is odd, so this is a bijection on
/// `u64`. This is the mix the table itself uses; after it, the *top* bits of
/// the product are the well-distributed ones, which is why the power-of-two
/// indexing policy keeps top bits rather than masking low ones.
#[inline(always)]
pub const fn mix64(hash: u64) -> u64 {
    hash.wrapping_mul(MULT64)
}

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")] {
        /// Scrambles a pointer-width hash with the matching multiplier.
        #[inline(always)]
        pub const fn mix(hash: usize) -> usize {
            mix64(hash as u64) as usize
        }
    } else if #[cfg(target_pointer_width = "32")] {
        /// Scrambles a pointer-width hash with the matching multiplier.
        #[inline(always)]
        pub const fn mix(hash: usize) -> usize {
            mix32(hash as u32) as usize
        }
    } else {
        /// Scrambles a pointer-width hash with the matching multiplier.
        #[inline(always)]
        pub const fn mix(hash: usize) -> usize {
            mix16(hash as u16) as usize
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn multipliers_are_odd() {
        assert_eq!(MULT16 & 1, 1);
        assert_eq!(MULT32 & 1, 1);
        assert_eq!(MULT64 & 1, 1);
    }

    #[test]
    fn mix_is_deterministic() {
        for h in [0u64, 1, 81, u64::MAX, 0xdead_beef] {
            assert_eq!(mix64(h), mix64(h));
        }
        assert_eq!(mix32(7), mix32(7));
        assert_eq!(mix16(7), mix16(7));
    }

    #[test]
    fn mix_is_injective_on_samples() {
        let mut seen = BTreeSet::new();
        for h in 0..10_000u64 {
            assert!(seen.insert(mix64(h)), "collision at {h}");
        }
    }

    #[test]
    fn pointer_width_mix_matches_its_width_constant() {
        #[cfg(target_pointer_width = "64")]
        assert_eq!(mix(81), mix64(81) as usize);
        #[cfg(target_pointer_width = "32")]
        assert_eq!(mix(81), mix32(81) as usize);
    }

    #[test]
    fn sequential_hashes_spread_across_top_bits() {
        // Identity hashes 0..256 all share zeroed high bits; after mixing,
        // their top bytes should cover most of the 256 possible values.
        let mut tops = BTreeSet::new();
        for h in 0..256u64 {
            tops.insert((mix64(h) >> 56) as u8);
        }
        assert!(tops.len() > 200, "only {} distinct top bytes", tops.len());
    }
}
