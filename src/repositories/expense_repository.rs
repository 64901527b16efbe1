use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::expense::{CategorizedExpense, Expense, NewExpense};

/// Trait defining expense repository operations
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Record a new expense under its category
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError>;

    /// All expenses filed under any of the given categories, ordered by
    /// timestamp then ID
    async fn find_by_categories(
        &self,
        category_ids: &[i64],
    ) -> Result<Vec<Expense>, RepositoryError>;

    /// Find an expense by ID, only if its category is owned by `user_id`
    async fn find_owned(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<Option<CategorizedExpense>, RepositoryError>;

    /// A user's expenses with `start <= date_time <= end`, ordered by
    /// timestamp then ID
    async fn find_in_window(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CategorizedExpense>, RepositoryError>;
}

/// PostgreSQL implementation of ExpenseRepository
pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError> {
        let created = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expense (category_id, date_time, cost, description)
            VALUES ($1, $2, $3, $4)
            RETURNING expense_id, category_id, date_time, cost, description
            "#,
        )
        .bind(expense.category_id)
        .bind(expense.date_time)
        .bind(expense.cost)
        .bind(&expense.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_categories(
        &self,
        category_ids: &[i64],
    ) -> Result<Vec<Expense>, RepositoryError> {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT expense_id, category_id, date_time, cost, description
            FROM expense
            WHERE category_id = ANY($1)
            ORDER BY date_time ASC, expense_id ASC
            "#,
        )
        .bind(category_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    async fn find_owned(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<Option<CategorizedExpense>, RepositoryError> {
        let expense = sqlx::query_as::<_, CategorizedExpense>(
            r#"
            SELECT e.expense_id, e.category_id, c.category_name,
                   e.date_time, e.cost, e.description
            FROM expense e
            JOIN category c ON c.category_id = e.category_id
            WHERE e.expense_id = $1 AND c.user_id = $2
            "#,
        )
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn find_in_window(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CategorizedExpense>, RepositoryError> {
        let expenses = sqlx::query_as::<_, CategorizedExpense>(
            r#"
            SELECT e.expense_id, e.category_id, c.category_name,
                   e.date_time, e.cost, e.description
            FROM expense e
            JOIN category c ON c.category_id = e.category_id
            WHERE c.user_id = $1
                AND e.date_time BETWEEN $2 AND $3
            ORDER BY e.date_time ASC, e.expense_id ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }
}
