//! Field redaction
//!
//! A [`Hasher`] turns a sensitive value into a stable, non-reversible token.
//! The same input always yields the same token, so records about one patient
//! or account can still be correlated without the raw value reaching the log.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Produces the redacted representation of a value
pub trait Hasher: Send + Sync {
    fn hash(&self, value: &Value) -> String;
}

impl<F> Hasher for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn hash(&self, value: &Value) -> String {
        self(value)
    }
}

/// SHA-256 hasher emitting the first 8 digest bytes as base64.
///
/// Strings are hashed by their raw bytes, everything else by its JSON text.
#[derive(Debug, Clone, Default)]
pub struct Sha256Hasher {
    salt: Vec<u8>,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Salted digests keep tokens from being matched across deployments.
    pub fn with_salt(salt: impl Into<Vec<u8>>) -> Self {
        Self { salt: salt.into() }
    }
}

impl Hasher for Sha256Hasher {
    fn hash(&self, value: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.salt);
        match value {
            Value::String(s) => hasher.update(s.as_bytes()),
            other => hasher.update(other.to_string().as_bytes()),
        }
        let digest = hasher.finalize();
        general_purpose::STANDARD.encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sha256_hasher_is_deterministic() {
        let hasher = Sha256Hasher::new();
        let first = hasher.hash(&json!("john.doe@example.com"));
        let second = hasher.hash(&json!("john.doe@example.com"));

        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
        assert!(!first.contains("john"));
    }

    #[test]
    fn test_sha256_hasher_salt_changes_output() {
        let value = json!("MRN123456");
        let plain = Sha256Hasher::new().hash(&value);
        let salted = Sha256Hasher::with_salt("ward-7").hash(&value);
        assert_ne!(plain, salted);
    }

    #[test]
    fn test_non_string_values_hash() {
        let hasher = Sha256Hasher::new();
        assert_ne!(hasher.hash(&json!(42)), hasher.hash(&json!("43")));
        assert_eq!(hasher.hash(&json!({"a": 1})), hasher.hash(&json!({"a": 1})));
    }

    #[test]
    fn test_closure_hasher() {
        let hasher = |value: &Value| format!("len:{}", value.to_string().len());
        assert_eq!(Hasher::hash(&hasher, &json!("abc")), "len:5");
    }
}
