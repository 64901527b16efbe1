use async_trait::async_trait;
use bcrypt::hash;
use std::sync::Arc;

use crate::models::user::{CreateUserRequest, CreatedUser, UserSummary};
use crate::repositories::{RepositoryError, UserRepository};
use crate::services::ownership_service::{OwnershipResolver, ResolveError};

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found.")]
    UserNotFound,

    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ResolveError> for UserError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UserNotFound => UserError::UserNotFound,
            ResolveError::CategoryNotFound => {
                UserError::DatabaseError("Unexpected category lookup".to_string())
            }
            ResolveError::DatabaseError(msg) => UserError::DatabaseError(msg),
        }
    }
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => UserError::UserNotFound,
            RepositoryError::DatabaseError(msg) => UserError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => UserError::DatabaseError(msg),
        }
    }
}

/// Trait defining user directory operations
#[async_trait]
pub trait UserService: Send + Sync {
    /// List every user
    async fn list_users(&self) -> Result<Vec<UserSummary>, UserError>;

    /// Get a single user
    async fn get_user(&self, user_id: i64) -> Result<UserSummary, UserError>;

    /// Create a user, storing only a bcrypt hash of the password
    async fn create_user(&self, request: CreateUserRequest) -> Result<CreatedUser, UserError>;
}

/// Implementation of UserService
pub struct UserServiceImpl {
    resolver: Arc<dyn OwnershipResolver>,
    user_repository: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl UserServiceImpl {
    pub fn new(
        resolver: Arc<dyn OwnershipResolver>,
        user_repository: Arc<dyn UserRepository>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            resolver,
            user_repository,
            bcrypt_cost,
        }
    }

    /// Hash a password using bcrypt off the async executor
    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| UserError::PasswordHashing(e.to_string()))?
            .map_err(|e| UserError::PasswordHashing(e.to_string()))
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list_users(&self) -> Result<Vec<UserSummary>, UserError> {
        let users = self.user_repository.list().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    async fn get_user(&self, user_id: i64) -> Result<UserSummary, UserError> {
        let user = self.resolver.resolve_user(user_id).await?;
        Ok(UserSummary::from(user))
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<CreatedUser, UserError> {
        let password_hash = self.hash_password(request.password).await?;

        let user = self
            .user_repository
            .create(&request.name, &password_hash)
            .await?;

        tracing::info!(user_id = user.user_id, "user created");

        Ok(CreatedUser {
            user_id: user.user_id,
            user_name: user.name,
        })
    }
}
