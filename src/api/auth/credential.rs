//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so verification
//! never needs the codec's current cost settings.

use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use thiserror::Error;

use crate::api::error::ApiError;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid argon2 parameters: {0}")]
    Params(argon2::Error),
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        Self::internal(err)
    }
}

#[derive(Clone, Debug)]
pub struct CredentialCodec {
    params: Params,
    /// Hash of a throwaway password, verified against when no account matches
    /// so a login costs the same whether or not the email exists.
    decoy: OnceLock<Option<String>>,
}

impl Default for CredentialCodec {
    fn default() -> Self {
        Self {
            params: Params::default(),
            decoy: OnceLock::new(),
        }
    }
}

impl CredentialCodec {
    /// Build a codec with explicit Argon2id costs (memory in KiB, iterations, lanes).
    ///
    /// # Errors
    /// Returns an error if the parameters are out of range.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(m_cost, t_cost, p_cost, None).map_err(CredentialError::Params)?;
        Ok(Self {
            params,
            decoy: OnceLock::new(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error only if the hasher itself fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(CredentialError::Hash)?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed hashes verify as `false`.
    #[must_use]
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        // Parameters come from the PHC string, not from `self.params`.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Check a password against the stored hash of a looked-up account.
    ///
    /// `None` means no account matched; a decoy hash is verified anyway and the
    /// result is always `false`.
    #[must_use]
    pub fn verify_account(&self, plaintext: &str, hash: Option<&str>) -> bool {
        if let Some(hash) = hash {
            return self.verify(plaintext, hash);
        }
        if let Some(decoy) = self.decoy() {
            let _ = self.verify(plaintext, decoy);
        }
        false
    }

    fn decoy(&self) -> Option<&str> {
        self.decoy
            .get_or_init(|| self.hash("decoy").ok())
            .as_deref()
    }
}
