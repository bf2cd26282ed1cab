//! One-way credential hashing.

use std::fmt::Debug;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

/// Turns a plaintext password into an opaque hash before it is stored.
pub trait CredentialHasher: Debug + Send + Sync {
    fn hash(&self, plaintext: &str) -> ResultEngine<String>;
}

/// Argon2id with a random salt; hashes are PHC strings (`$argon2id$...`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> ResultEngine<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| EngineError::Hashing(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use argon2::{PasswordHash, PasswordVerifier};

    use super::*;

    fn matches(plaintext: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn hash_is_salted_and_verifiable() {
        let hasher = Argon2Hasher;
        let first = hasher.hash("correct horse").unwrap();
        let second = hasher.hash("correct horse").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(matches("correct horse", &first));
        assert!(!matches("battery staple", &first));
    }
}
