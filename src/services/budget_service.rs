use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::budget::BudgetView;
use crate::models::category::{Category, UpsertOutcome};
use crate::models::expense::Expense;
use crate::repositories::{CategoryRepository, ExpenseRepository, RepositoryError};
use crate::services::ownership_service::{OwnershipResolver, ResolveError};

/// Budget service errors
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("user not found.")]
    UserNotFound,

    #[error("budget category not found.")]
    CategoryNotFound,

    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("spending in category {category_id} exceeds the representable amount range.")]
    AmountOverflow { category_id: i64 },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ResolveError> for BudgetError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UserNotFound => BudgetError::UserNotFound,
            ResolveError::CategoryNotFound => BudgetError::CategoryNotFound,
            ResolveError::DatabaseError(msg) => BudgetError::DatabaseError(msg),
        }
    }
}

impl From<RepositoryError> for BudgetError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => BudgetError::UserNotFound,
            RepositoryError::DatabaseError(msg) => BudgetError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => BudgetError::DatabaseError(msg),
        }
    }
}

/// Trait defining budget operations
#[async_trait]
pub trait BudgetService: Send + Sync {
    /// Spend-versus-budget views for one category, or for every category the
    /// user owns when `category_id` is `None`
    async fn get_budget_view(
        &self,
        user_id: i64,
        category_id: Option<i64>,
    ) -> Result<Vec<BudgetView>, BudgetError>;

    /// Create the named category with `ceiling`, or replace the ceiling of the
    /// user's existing category with that name
    async fn upsert_budget(
        &self,
        user_id: i64,
        category_name: &str,
        ceiling: Decimal,
    ) -> Result<Category, BudgetError>;
}

/// Implementation of BudgetService
pub struct BudgetServiceImpl {
    resolver: Arc<dyn OwnershipResolver>,
    category_repository: Arc<dyn CategoryRepository>,
    expense_repository: Arc<dyn ExpenseRepository>,
}

impl BudgetServiceImpl {
    pub fn new(
        resolver: Arc<dyn OwnershipResolver>,
        category_repository: Arc<dyn CategoryRepository>,
        expense_repository: Arc<dyn ExpenseRepository>,
    ) -> Self {
        Self {
            resolver,
            category_repository,
            expense_repository,
        }
    }

    /// Pair each category with its expenses, keeping category order
    fn assemble(
        categories: Vec<Category>,
        expenses: Vec<Expense>,
    ) -> Result<Vec<BudgetView>, BudgetError> {
        let mut by_category: HashMap<i64, Vec<Expense>> = HashMap::new();
        for expense in expenses {
            by_category
                .entry(expense.category_id)
                .or_default()
                .push(expense);
        }

        categories
            .into_iter()
            .map(|category| {
                let category_id = category.category_id;
                let expenses = by_category.remove(&category_id).unwrap_or_default();
                BudgetView::from_category(category, expenses)
                    .ok_or(BudgetError::AmountOverflow { category_id })
            })
            .collect()
    }
}

#[async_trait]
impl BudgetService for BudgetServiceImpl {
    async fn get_budget_view(
        &self,
        user_id: i64,
        category_id: Option<i64>,
    ) -> Result<Vec<BudgetView>, BudgetError> {
        let user = self.resolver.resolve_user(user_id).await?;

        let categories = match category_id {
            Some(category_id) => vec![
                self.resolver
                    .resolve_category(user.user_id, category_id)
                    .await?,
            ],
            None => self.category_repository.find_by_user(user.user_id).await?,
        };

        let category_ids: Vec<i64> = categories.iter().map(|c| c.category_id).collect();
        let expenses = self
            .expense_repository
            .find_by_categories(&category_ids)
            .await?;

        tracing::debug!(
            user_id,
            categories = categories.len(),
            expenses = expenses.len(),
            "aggregated budget view"
        );

        Self::assemble(categories, expenses)
    }

    async fn upsert_budget(
        &self,
        user_id: i64,
        category_name: &str,
        ceiling: Decimal,
    ) -> Result<Category, BudgetError> {
        if category_name.trim().is_empty() {
            return Err(BudgetError::InvalidBudget(
                "category name must not be blank".to_string(),
            ));
        }
        if ceiling < Decimal::ZERO {
            return Err(BudgetError::InvalidBudget(
                "budget must not be negative".to_string(),
            ));
        }

        let user = self.resolver.resolve_user(user_id).await?;

        let (category, outcome) = self
            .category_repository
            .upsert_budget(user.user_id, category_name, ceiling)
            .await?;

        tracing::info!(
            user_id,
            category_id = category.category_id,
            created = outcome == UpsertOutcome::Created,
            "budget upserted"
        );

        Ok(category)
    }
}
