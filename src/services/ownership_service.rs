use async_trait::async_trait;
use std::sync::Arc;

use crate::models::category::Category;
use crate::models::user::User;
use crate::repositories::{CategoryRepository, RepositoryError, UserRepository};

/// Ownership resolution errors
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("user not found.")]
    UserNotFound,

    /// Also returned when the category exists but belongs to someone else
    #[error("budget category not found.")]
    CategoryNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for ResolveError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ResolveError::UserNotFound,
            RepositoryError::DatabaseError(msg) => ResolveError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => ResolveError::DatabaseError(msg),
        }
    }
}

/// Trait defining ownership checks shared by every user-scoped operation
#[async_trait]
pub trait OwnershipResolver: Send + Sync {
    /// Load a user, failing if it does not exist
    async fn resolve_user(&self, user_id: i64) -> Result<User, ResolveError>;

    /// Load a category owned by `user_id`. Existence and ownership are one
    /// check, so another user's category looks exactly like a missing one.
    async fn resolve_category(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<Category, ResolveError>;
}

/// Implementation of OwnershipResolver
pub struct OwnershipResolverImpl {
    user_repository: Arc<dyn UserRepository>,
    category_repository: Arc<dyn CategoryRepository>,
}

impl OwnershipResolverImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        category_repository: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            user_repository,
            category_repository,
        }
    }
}

#[async_trait]
impl OwnershipResolver for OwnershipResolverImpl {
    async fn resolve_user(&self, user_id: i64) -> Result<User, ResolveError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(ResolveError::UserNotFound)
    }

    async fn resolve_category(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<Category, ResolveError> {
        self.category_repository
            .find_owned(user_id, category_id)
            .await?
            .ok_or(ResolveError::CategoryNotFound)
    }
}
