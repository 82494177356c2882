//! Stored credential handling.
//!
//! Passwords are hashed with argon2 into PHC strings. Rows created before
//! hashing was introduced still hold the plaintext password; those are
//! recognised by the missing `$argon2` prefix and compared literally, then
//! upgraded on the first successful login (see
//! [`Engine::authenticate_user`](crate::Engine::authenticate_user)).

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

const PHC_PREFIX: &str = "$argon2";

#[derive(Debug)]
pub(crate) enum StoredPassword<'a> {
    Hashed(&'a str),
    Legacy(&'a str),
}

impl<'a> StoredPassword<'a> {
    pub(crate) fn parse(stored: &'a str) -> Self {
        if stored.starts_with(PHC_PREFIX) {
            Self::Hashed(stored)
        } else {
            Self::Legacy(stored)
        }
    }

    /// Check `candidate` against the stored credential.
    ///
    /// A malformed PHC string is an infrastructure failure, not a login
    /// failure, and surfaces as [`EngineError::PasswordHash`].
    pub(crate) fn verify(&self, candidate: &str) -> ResultEngine<bool> {
        match self {
            Self::Hashed(phc) => {
                let parsed = PasswordHash::new(phc)
                    .map_err(|err| EngineError::PasswordHash(err.to_string()))?;
                Ok(Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok())
            }
            Self::Legacy(stored) => Ok(*stored == candidate),
        }
    }

    pub(crate) fn needs_rehash(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

pub(crate) fn hash(plain: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}
