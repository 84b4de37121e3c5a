//! Fixed-point arithmetic used by all damage and stat modifiers.
//!
//! Modifiers are integers out of 4096. Every step truncates, so applying modifiers one at a time
//! gives different results than multiplying them together first. Chained modifiers round at each
//! link instead.

use apogee_data::Fraction;

/// The identity modifier.
pub const MODIFIER_BASE: u32 = 4096;

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Chains `num / den` onto an existing modifier, rounding half up.
pub fn chain_modify(modifier: u32, num: u32, den: u32) -> u32 {
    let next = (num as u64 * MODIFIER_BASE as u64) / den.max(1) as u64;
    saturate((modifier as u64 * next + 2048) >> 12)
}

/// Applies a modifier to a value, rounding half down.
pub fn modify(value: u32, modifier: u32) -> u32 {
    saturate((value as u64 * modifier as u64 + 2047) / MODIFIER_BASE as u64)
}

/// Applies a fraction to a value, by way of a modifier.
pub fn modify_fraction(value: u32, fraction: Fraction) -> u32 {
    modify(value, fraction.to_4096())
}

/// Truncates the value to the given number of bits.
///
/// Emulates overflow of the fixed-width integers the games use.
pub fn trunc(value: u32, bits: u32) -> u32 {
    if bits == 0 || bits >= u32::BITS {
        value
    } else {
        value & ((1 << bits) - 1)
    }
}

#[cfg(test)]
mod modifier_test {
    use apogee_data::Fraction;
    use pretty_assertions::assert_eq;

    use crate::common::{
        MODIFIER_BASE,
        chain_modify,
        modify,
        modify_fraction,
        trunc,
    };

    #[test]
    fn chains_modifiers_with_rounding() {
        assert_eq!(chain_modify(MODIFIER_BASE, 3, 2), 6144);
        assert_eq!(chain_modify(6144, 3, 2), 9216);
        assert_eq!(chain_modify(MODIFIER_BASE, 1, 2), 2048);
        assert_eq!(chain_modify(MODIFIER_BASE, 2, 3), 2730);
        assert_eq!(chain_modify(6144, 1, 2), 3072);
    }

    #[test]
    fn modifies_rounding_half_down() {
        assert_eq!(modify(100, 6144), 150);
        // 151.5 rounds down.
        assert_eq!(modify(101, 6144), 151);
        // 42.75 rounds up.
        assert_eq!(modify(57, 3072), 43);
        assert_eq!(modify(10, 2048), 5);
        assert_eq!(modify(1, 2048), 0);
        assert_eq!(modify(77, MODIFIER_BASE), 77);
    }

    #[test]
    fn modifies_by_fraction() {
        assert_eq!(modify_fraction(200, Fraction::new(1, 2)), 100);
        assert_eq!(modify_fraction(90, Fraction::new(3, 2)), 135);
    }

    #[test]
    fn truncates_to_bit_width() {
        assert_eq!(trunc(70000, 16), 4464);
        assert_eq!(trunc(65535, 16), 65535);
        assert_eq!(trunc(12345, 0), 12345);
        assert_eq!(trunc(10000 - 300, 13), 1508);
    }
}
