use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::category::{Category, UpsertOutcome};

/// Trait defining category repository operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category by ID, only if it is owned by `user_id`
    async fn find_owned(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<Option<Category>, RepositoryError>;

    /// Find all categories owned by a user
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Category>, RepositoryError>;

    /// Create the (user, name) category with `ceiling`, or replace the ceiling
    /// of the existing one. Atomic with respect to concurrent upserts of the
    /// same pair. Fails with `NotFound` if the user does not exist.
    async fn upsert_budget(
        &self,
        user_id: i64,
        name: &str,
        ceiling: Decimal,
    ) -> Result<(Category, UpsertOutcome), RepositoryError>;
}

/// PostgreSQL implementation of CategoryRepository
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UpsertedCategoryRow {
    #[sqlx(flatten)]
    category: Category,
    inserted: bool,
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_owned(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT category_id, category_name, user_id, monthly_budget
            FROM category
            WHERE category_id = $1 AND user_id = $2
            "#,
        )
        .bind(category_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT category_id, category_name, user_id, monthly_budget
            FROM category
            WHERE user_id = $1
            ORDER BY category_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn upsert_budget(
        &self,
        user_id: i64,
        name: &str,
        ceiling: Decimal,
    ) -> Result<(Category, UpsertOutcome), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Hold the owner row so it cannot vanish between the check and the write
        let owner = sqlx::query_scalar::<_, i64>(
            r#"SELECT user_id FROM "user" WHERE user_id = $1 FOR KEY SHARE"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owner.is_none() {
            return Err(RepositoryError::NotFound);
        }

        // xmax = 0 only for a freshly inserted tuple
        let row = sqlx::query_as::<_, UpsertedCategoryRow>(
            r#"
            INSERT INTO category (user_id, category_name, monthly_budget)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, category_name)
            DO UPDATE SET monthly_budget = EXCLUDED.monthly_budget
            RETURNING category_id, category_name, user_id, monthly_budget,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(ceiling)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let outcome = if row.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };

        Ok((row.category, outcome))
    }
}
