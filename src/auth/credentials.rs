// src/auth/credentials.rs

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// Shortest password accepted before hashing.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Argon2 variant used for new hashes. Stored hashes are self-describing (PHC format),
/// so verification works regardless of which scheme produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashScheme {
    #[default]
    Argon2id,
    Argon2i,
    Argon2d,
}

impl HashScheme {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "argon2id" => Some(HashScheme::Argon2id),
            "argon2i" => Some(HashScheme::Argon2i),
            "argon2d" => Some(HashScheme::Argon2d),
            _ => None,
        }
    }

    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown password hashing scheme '{}', falling back to argon2id",
                name
            );
            HashScheme::default()
        })
    }

    fn algorithm(self) -> Algorithm {
        match self {
            HashScheme::Argon2id => Algorithm::Argon2id,
            HashScheme::Argon2i => Algorithm::Argon2i,
            HashScheme::Argon2d => Algorithm::Argon2d,
        }
    }

    fn hasher(self) -> Argon2<'static> {
        Argon2::new(self.algorithm(), Version::V0x13, Params::default())
    }
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn check_password_policy(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub fn hash_password(password: &str, scheme: HashScheme) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = scheme
        .hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .to_string();

    Ok(password_hash)
}

/// Never fails: a mismatch and an unreadable stored hash both yield `false`.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
