//! Content hashing
//!
//! Class names, custom property names and theme identities are all derived
//! from a hash of normalized content, so independently compiled files agree
//! on names without any shared registry.

use sha2::{Digest, Sha256};

use crate::condition::Condition;

const HASH_BYTES: usize = 5;

/// SHA-256 of `input`, truncated to 40 bits and written in base 36.
pub fn hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut n: u64 = 0;
    for byte in digest.iter().take(HASH_BYTES) {
        n = (n << 8) | u64::from(*byte);
    }
    to_base36(n)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Atomic class name for a `(property, canonical value, canonical path)`
/// triple. The path must already be in canonical order.
pub fn class_name(prefix: &str, property: &str, value: &str, path: &[Condition]) -> String {
    let modifiers: String = path
        .iter()
        .filter(|c| **c != Condition::Default)
        .map(Condition::as_str)
        .collect();
    format!("{}{}", prefix, hash(&format!("<>{}{}{}", property, value, modifiers)))
}

/// Identity of a token group, stable for a given export location.
pub fn group_identity(prefix: &str, export_id: &str) -> String {
    format!("{}{}", prefix, hash(export_id))
}

/// Custom property name (without the leading `--`) for one token.
pub fn var_name(prefix: &str, group_identity: &str, token: &str) -> String {
    format!("{}{}", prefix, hash(&format!("{}.{}", group_identity, token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable_and_short() {
        let a = hash("<>colorred");
        assert_eq!(a, hash("<>colorred"));
        assert!(a.len() <= 8);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, hash("<>colorblue"));
    }

    #[test]
    fn test_class_name_depends_on_path() {
        let hover = vec![Condition::parse(":hover").unwrap()];
        let base = class_name("x", "color", "red", &[]);
        assert!(base.starts_with('x'));
        assert_ne!(base, class_name("x", "color", "red", &hover));
        assert_eq!(base, class_name("x", "color", "red", &[Condition::Default]));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
