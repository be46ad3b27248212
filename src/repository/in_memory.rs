use secrecy::ExposeSecret;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_savable, RepositoryError, UserAccount, UserRepository};
use crate::domain::{generate_verification_token, hash_verification_token, UserEntity};

struct StoredUser {
    entity: UserEntity,
    verification_token_hash: Option<String>,
}

impl StoredUser {
    fn account(&self, id: Uuid) -> UserAccount {
        UserAccount {
            id,
            email: self.entity.email.as_ref().to_string(),
            first_name: self.entity.first_name.as_ref().to_string(),
            last_name: self.entity.last_name.as_ref().to_string(),
            verified: self.entity.verified,
        }
    }
}

/// Process-local repository, keeps every entity exactly as it was saved.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<StoredUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored entities, in insertion order.
    pub async fn users(&self) -> Vec<UserEntity> {
        self.users
            .read()
            .await
            .iter()
            .map(|stored| stored.entity.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    #[tracing::instrument(name = "Saving user in memory", skip(self, user))]
    async fn save(&self, mut user: UserEntity, primary_key: &str) -> Result<UserEntity, RepositoryError> {
        check_savable(&user, primary_key)?;
        let mut users = self.users.write().await;

        match user.id {
            Some(id) => {
                let stored = users
                    .iter_mut()
                    .find(|stored| stored.entity.id == Some(id))
                    .ok_or(RepositoryError::NotFound(id))?;
                let mut entity = user.clone();
                entity.verification_token = None;
                stored.entity = entity;
            }
            None => {
                let taken = users
                    .iter()
                    .any(|stored| stored.entity.email.as_ref() == user.email.as_ref());
                if taken {
                    return Err(RepositoryError::DuplicateEmail);
                }
                let token = generate_verification_token();
                user.id = Some(Uuid::new_v4());
                let mut entity = user.clone();
                entity.verification_token = None;
                users.push(StoredUser {
                    entity,
                    verification_token_hash: Some(hash_verification_token(token.expose_secret())),
                });
                user.verification_token = Some(token);
            }
        }
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|stored| stored.entity.id == Some(id))
            .map(|stored| stored.account(id)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .filter(|stored| stored.entity.email.as_ref() == email)
            .find_map(|stored| stored.entity.id.map(|id| stored.account(id))))
    }

    #[tracing::instrument(name = "Verifying user in memory", skip(self, token))]
    async fn verify_account(&self, id: Uuid, token: &str) -> Result<bool, RepositoryError> {
        let token_hash = hash_verification_token(token);
        let mut users = self.users.write().await;
        let stored = users.iter_mut().find(|stored| {
            stored.entity.id == Some(id)
                && !stored.entity.verified
                && stored.verification_token_hash.as_deref() == Some(token_hash.as_str())
        });
        match stored {
            Some(stored) => {
                stored.entity.verified = true;
                stored.verification_token_hash = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
