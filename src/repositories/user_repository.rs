use async_trait::async_trait;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::user::User;

/// Trait defining user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user with an already hashed password
    async fn create(&self, name: &str, password_hash: &str) -> Result<User, RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, RepositoryError>;

    /// List all users ordered by ID
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, name: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO "user" (name, password_hash)
            VALUES ($1, $2)
            RETURNING user_id, name, password_hash
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, password_hash
            FROM "user"
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, password_hash
            FROM "user"
            ORDER BY user_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
