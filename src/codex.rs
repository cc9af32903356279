//! Derivation code tables.
//!
//! Three disjoint tables enumerate the derivation codes a [`crate::matter::CryMat`]
//! may carry, plus a selector table that names the one two-char prefix in use.
//! Tables are closed sets: membership is checked against a static lookup,
//! never inferred from syntax, so an unregistered code is always rejected
//! even if it happens to be well-formed.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// One-char codes: raw length implies 1 Base64 pad byte.
pub mod one {
    pub const ED25519N: &str = "A";
    pub const X25519: &str = "B";
    pub const ED25519: &str = "C";
    pub const BLAKE3_256: &str = "D";
    pub const BLAKE2B_256: &str = "E";
    pub const BLAKE2S_256: &str = "F";
    pub const ECDSA_256K1N: &str = "G";
    pub const ECDSA_256K1: &str = "H";
    pub const SHA3_256: &str = "I";
    pub const SHA2_256: &str = "J";

    pub const ALL: &[&str] = &[
        ED25519N,
        X25519,
        ED25519,
        BLAKE3_256,
        BLAKE2B_256,
        BLAKE2S_256,
        ECDSA_256K1N,
        ECDSA_256K1,
        SHA3_256,
        SHA2_256,
    ];
}

/// Two-char codes: begin with the [`select::TWO`] selector, raw length
/// implies 2 Base64 pad bytes.
pub mod two {
    pub const ED25519: &str = "0A";
    pub const ECDSA_256K1: &str = "0B";

    pub const ALL: &[&str] = &[ED25519, ECDSA_256K1];
}

/// Four-char codes: raw length implies 0 Base64 pad bytes. Currently empty,
/// but kept as a first-class table so a parser never mistakes a 4-char
/// prefix for something else.
pub mod four {
    pub const ALL: &[&str] = &[];
}

/// Selector prefixes: a code of this single character means "the real code
/// is two characters, read one more".
pub mod select {
    pub const TWO: &str = "0";
}

static ONE_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| one::ALL.iter().copied().collect());
static TWO_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| two::ALL.iter().copied().collect());
static FOUR_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| four::ALL.iter().copied().collect());

/// Is `code` a member of the one-char table?
pub fn is_one(code: &str) -> bool {
    ONE_SET.contains(code)
}

/// Is `code` a member of the two-char table?
pub fn is_two(code: &str) -> bool {
    TWO_SET.contains(code)
}

/// Is `code` a member of the four-char table?
pub fn is_four(code: &str) -> bool {
    FOUR_SET.contains(code)
}

/// Is `code` the two-char selector?
pub fn is_select(code: &str) -> bool {
    code == select::TWO
}

/// Pad class implied by a code's length: 1-char -> 1, 2-char -> 2, 4-char -> 0.
pub fn pad_of_code_len(len: usize) -> usize {
    len % 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        assert_eq!(select::TWO, "0");
        assert!(is_select("0"));
        assert!(!is_select("A"));
    }

    #[test]
    fn test_one_membership() {
        for code in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"] {
            assert!(is_one(code));
        }
        assert!(!is_one("0"));
    }

    #[test]
    fn test_one_letters() {
        assert_eq!(one::ED25519N, "A");
        assert_eq!(one::X25519, "B");
        assert_eq!(one::ED25519, "C");
        assert_eq!(one::BLAKE3_256, "D");
        assert_eq!(one::BLAKE2B_256, "E");
        assert_eq!(one::BLAKE2S_256, "F");
        assert_eq!(one::ECDSA_256K1N, "G");
        assert_eq!(one::ECDSA_256K1, "H");
        assert_eq!(one::SHA3_256, "I");
        assert_eq!(one::SHA2_256, "J");
    }

    #[test]
    fn test_two_membership() {
        for code in ["0A", "0B"] {
            assert!(is_two(code));
        }
        assert!(!is_two("A"));
    }

    #[test]
    fn test_four_is_empty() {
        assert!(four::ALL.is_empty());
        assert!(!is_four("0"));
        assert!(!is_four("A"));
        assert!(!is_four("0A"));
    }

    #[test]
    fn test_pad_of_code_len() {
        assert_eq!(pad_of_code_len(1), 1);
        assert_eq!(pad_of_code_len(2), 2);
        assert_eq!(pad_of_code_len(4), 0);
    }
}
