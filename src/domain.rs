mod password;
mod user_email;
mod user_entity;
mod user_name;
mod verification_token;

pub use password::{compute_password_hash, Password};
#[cfg(test)]
pub(crate) use password::password_matches;
pub use user_email::UserEmail;
pub use user_entity::UserEntity;
pub use user_name::UserName;
pub use verification_token::{generate_verification_token, hash_verification_token};
