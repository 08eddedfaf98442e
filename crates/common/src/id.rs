//! ID generation utilities.

use rand::Rng;
use ulid::Ulid;
use uuid::Uuid;

/// Prefix of every public report reference id.
pub const REFERENCE_PREFIX: &str = "REF-";

/// Number of random decimal digits after [`REFERENCE_PREFIX`].
pub const REFERENCE_DIGITS: usize = 6;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// Used as the internal primary key of reports, comments and profiles.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a public reference id of the form `REF-######`.
    ///
    /// The keyspace is only one million values; callers must check for
    /// collisions against the store before using it.
    #[must_use]
    pub fn generate_reference_id(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        format!("{REFERENCE_PREFIX}{n}")
    }

    /// Generate the 8-digit numeric user id shown to account holders.
    #[must_use]
    pub fn generate_display_user_id(&self) -> String {
        let n: u32 = rand::thread_rng().gen_range(10_000_000..100_000_000);
        n.to_string()
    }

    /// Generate a cryptographically secure random token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }
}

/// Returns whether `value` has the `REF-######` shape.
#[must_use]
pub fn is_reference_id(value: &str) -> bool {
    value
        .strip_prefix(REFERENCE_PREFIX)
        .is_some_and(|digits| {
            digits.len() == REFERENCE_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
        })
}

/// Returns whether `value` looks like an 8-digit display user id.
#[must_use]
pub fn is_display_user_id(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_reference_id_format() {
        let id_gen = IdGenerator::new();
        for _ in 0..200 {
            let reference = id_gen.generate_reference_id();
            assert!(is_reference_id(&reference), "bad reference id {reference}");
        }
    }

    #[test]
    fn test_display_user_id_format() {
        let id_gen = IdGenerator::new();
        for _ in 0..200 {
            let id = id_gen.generate_display_user_id();
            assert!(is_display_user_id(&id));
            assert!(!id.starts_with('0'));
        }
    }

    #[test]
    fn test_is_reference_id_rejects_malformed() {
        assert!(!is_reference_id("REF-12345"));
        assert!(!is_reference_id("REF-1234567"));
        assert!(!is_reference_id("ref-123456"));
        assert!(!is_reference_id("REF-12a456"));
        assert!(is_reference_id("REF-000123"));
    }

    #[test]
    fn test_generate_token() {
        let token = IdGenerator::new().generate_token();
        assert_eq!(token.len(), 32);
    }
}
