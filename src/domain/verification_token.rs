use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use secrecy::Secret;
use sha2::{Digest, Sha256};

/// Generate a random 25-characters-long case-sensitive verification token.
pub fn generate_verification_token() -> Secret<String> {
    let mut rng = thread_rng();
    let token = std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(25)
        .collect();
    Secret::new(token)
}

/// Hex-encoded SHA-256 digest; the only form of a token that gets stored.
pub fn hash_verification_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
