//! Password handling.
//!
//! - [`Password`]: a plaintext password, zeroized on drop
//! - [`PasswordHash`]: an Argon2id hash in PHC string form

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// A plaintext password, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// Wraps a plaintext password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Returns the plaintext.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the password is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

/// An Argon2id password hash with its salt and parameters, in PHC form.
#[derive(Clone)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PasswordHashing`] if Argon2 rejects the input.
    pub fn new(password: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::PasswordHashing {
                reason: e.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Verifies that a plaintext password matches this hash.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PhcHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn password_hash_verify() {
        let hash = PasswordHash::new("password123").unwrap();
        assert!(hash.verify("password123"));
        assert!(!hash.verify("password124"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn password_hash_is_argon2id_and_salted() {
        let a = PasswordHash::new("password123").unwrap();
        let b = PasswordHash::new("password123").unwrap();
        assert!(a.0.starts_with("$argon2id$"));
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn corrupt_hash_never_verifies() {
        let hash = PasswordHash("not-a-phc-string".to_string());
        assert!(!hash.verify("not-a-phc-string"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn debug_output_is_redacted() {
        let hash = PasswordHash::new("password123").unwrap();
        let debug = format!("{hash:?}");
        assert!(!debug.contains("password123"));
        assert!(!debug.contains("argon2"));

        let password = Password::new("password123");
        assert_eq!(format!("{password:?}"), "Password([REDACTED])");
    }

    #[test]
    fn password_deserializes_from_string() {
        let password: Password = serde_json::from_str("\"hunter2hunter2\"").unwrap();
        assert_eq!(password.expose(), "hunter2hunter2");
        assert_eq!(password.len(), 14);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn prop_hash_roundtrip(password in ".{0,64}") {
            let hash = PasswordHash::new(&password).unwrap();
            prop_assert!(hash.verify(&password));
        }
    }
}
