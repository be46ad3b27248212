use chrono::Utc;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use uuid::Uuid;

use super::{check_savable, RepositoryError, UserAccount, UserRepository};
use crate::domain::{generate_verification_token, hash_verification_token, Password, UserEntity};

#[derive(sqlx::FromRow)]
struct UserAccountRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    verified: bool,
}

impl From<UserAccountRow> for UserAccount {
    fn from(row: UserAccountRow) -> Self {
        UserAccount {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            verified: row.verified,
        }
    }
}

pub struct PostgresUserRepository {
    database: PgPool,
}

impl PostgresUserRepository {
    pub fn new(database: PgPool) -> Self {
        Self { database }
    }
}

fn password_hash(user: &UserEntity) -> Result<&str, RepositoryError> {
    match &user.password {
        Password::Hashed(hash) => Ok(hash.expose_secret()),
        Password::Plain(_) => Err(RepositoryError::PlaintextPassword),
    }
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::DuplicateEmail
        }
        _ => {
            tracing::error!("Failed to execute query: {:?}", e);
            RepositoryError::Database(e)
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(name = "Saving user in the database", skip(self, user))]
    async fn save(&self, mut user: UserEntity, primary_key: &str) -> Result<UserEntity, RepositoryError> {
        check_savable(&user, primary_key)?;
        let password_hash = password_hash(&user)?.to_string();

        match user.id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE users
                    SET email = $2, first_name = $3, last_name = $4, password_hash = $5, verified = $6
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(user.email.to_string())
                .bind(user.first_name.to_string())
                .bind(user.last_name.to_string())
                .bind(&password_hash)
                .bind(user.verified)
                .execute(&self.database)
                .await
                .map_err(map_unique_violation)?;
                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound(id));
                }
            }
            None => {
                let id = Uuid::new_v4();
                let token = generate_verification_token();
                sqlx::query(
                    r#"
                    INSERT INTO users (
                        id, email, first_name, last_name, password_hash,
                        verification_token_hash, verified, created_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    "#,
                )
                .bind(id)
                .bind(user.email.to_string())
                .bind(user.first_name.to_string())
                .bind(user.last_name.to_string())
                .bind(&password_hash)
                .bind(hash_verification_token(token.expose_secret()))
                .bind(user.verified)
                .bind(Utc::now())
                .execute(&self.database)
                .await
                .map_err(map_unique_violation)?;
                user.id = Some(id);
                user.verification_token = Some(token);
            }
        }
        Ok(user)
    }

    #[tracing::instrument(name = "Retrieving user by id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAccountRow>(
            r#"
            SELECT id, email, first_name, last_name, verified
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.database)
        .await?;
        Ok(row.map(UserAccount::from))
    }

    #[tracing::instrument(name = "Retrieving user by email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAccountRow>(
            r#"
            SELECT id, email, first_name, last_name, verified
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.database)
        .await?;
        Ok(row.map(UserAccount::from))
    }

    #[tracing::instrument(name = "Verifying user in the database", skip(self, token))]
    async fn verify_account(&self, id: Uuid, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verified = TRUE, verification_token_hash = NULL
            WHERE id = $1 AND verification_token_hash = $2 AND verified = FALSE
            "#,
        )
        .bind(id)
        .bind(hash_verification_token(token))
        .execute(&self.database)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
