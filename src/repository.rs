mod in_memory;
mod postgres;

pub use in_memory::InMemoryUserRepository;
pub use postgres::PostgresUserRepository;

use uuid::Uuid;

use crate::domain::UserEntity;

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("`{0}` is not a supported primary key")]
    UnsupportedPrimaryKey(String),
    #[error("A user with this email address already exists")]
    DuplicateEmail,
    #[error("No user with id {0}")]
    NotFound(Uuid),
    #[error("Refusing to store a password that has not been hashed")]
    PlaintextPassword,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A stored account, as read back from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub verified: bool,
}

/// Storage for user accounts.
///
/// `save` inserts entities without an id, assigning one together with a fresh
/// verification token that is returned in clear exactly once. Entities with
/// an id are updated in place. Only the token's digest is ever stored.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: UserEntity, primary_key: &str) -> Result<UserEntity, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError>;

    /// Mark the account verified if `token` belongs to it. Returns `false`
    /// for unknown ids, wrong tokens and accounts that are already verified.
    async fn verify_account(&self, id: Uuid, token: &str) -> Result<bool, RepositoryError>;
}

fn check_savable(user: &UserEntity, primary_key: &str) -> Result<(), RepositoryError> {
    if primary_key != UserEntity::PRIMARY_KEY {
        return Err(RepositoryError::UnsupportedPrimaryKey(primary_key.to_string()));
    }
    if !user.password.is_hashed() {
        return Err(RepositoryError::PlaintextPassword);
    }
    Ok(())
}
