use secrecy::Secret;
use uuid::Uuid;

use crate::domain::{compute_password_hash, Password, UserEmail, UserName};

/// A user account as it travels from the registration form to storage.
///
/// `conf_password` only exists while the submitted form is being checked and
/// must be unset before the entity is handed to a repository. `id` and
/// `verification_token` are filled in by the repository on first save.
#[derive(Debug, Clone)]
pub struct UserEntity {
    pub id: Option<Uuid>,
    pub email: UserEmail,
    pub first_name: UserName,
    pub last_name: UserName,
    pub password: Password,
    pub conf_password: Option<Secret<String>>,
    pub verification_token: Option<Secret<String>>,
    pub verified: bool,
}

impl UserEntity {
    pub const PRIMARY_KEY: &'static str = "id";

    pub fn new(
        email: UserEmail,
        first_name: UserName,
        last_name: UserName,
        password: Secret<String>,
        conf_password: Secret<String>,
    ) -> Self {
        Self {
            id: None,
            email,
            first_name,
            last_name,
            password: Password::Plain(password),
            conf_password: Some(conf_password),
            verification_token: None,
            verified: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn unset_conf_password(&mut self) {
        self.conf_password = None;
    }

    /// Replace a plain password with its Argon2 hash. Already hashed
    /// passwords are left untouched.
    pub fn hash_password(&mut self) -> Result<(), anyhow::Error> {
        let password_hash = match &self.password {
            Password::Plain(password) => compute_password_hash(password)?,
            Password::Hashed(_) => return Ok(()),
        };
        self.password = Password::Hashed(password_hash);
        Ok(())
    }
}
