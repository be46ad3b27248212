use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use secrecy::{ExposeSecret, Secret};

/// A user password, either as submitted or as its PHC-formatted Argon2 hash.
#[derive(Debug, Clone)]
pub enum Password {
    Plain(Secret<String>),
    Hashed(Secret<String>),
}

impl Password {
    pub fn is_hashed(&self) -> bool {
        matches!(self, Password::Hashed(_))
    }
}

pub fn compute_password_hash(password: &Secret<String>) -> Result<Secret<String>, anyhow::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let params = Params::new(15000, 2, 1, None)
        .context("Invalid Argon2 parameters")?;
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .context("Failed to hash password")?
        .to_string();
    Ok(Secret::new(password_hash))
}

/// Whether `candidate` hashes to `password_hash`.
#[cfg(test)]
pub(crate) fn password_matches(password_hash: &Secret<String>, candidate: &str) -> bool {
    use argon2::{PasswordHash, PasswordVerifier};

    PasswordHash::new(password_hash.expose_secret())
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
