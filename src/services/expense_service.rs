use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::models::expense::{
    CreateExpenseRequest, CreatedExpense, ExpenseDetail, ExpenseListItem, NewExpense,
};
use crate::models::timestamp::{parse_window_bound, truncate_to_seconds};
use crate::repositories::{ExpenseRepository, RepositoryError};
use crate::services::ownership_service::{OwnershipResolver, ResolveError};

/// Width of the listing window when a bound is omitted
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Expense service errors
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("user not found.")]
    UserNotFound,

    #[error("budget category not found.")]
    CategoryNotFound,

    #[error("expense not found.")]
    ExpenseNotFound,

    #[error("{0}")]
    InvalidTimestamp(String),

    #[error("start_date must not be after end_date, and the window must fit the supported date range")]
    InvalidWindow,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ResolveError> for ExpenseError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UserNotFound => ExpenseError::UserNotFound,
            ResolveError::CategoryNotFound => ExpenseError::CategoryNotFound,
            ResolveError::DatabaseError(msg) => ExpenseError::DatabaseError(msg),
        }
    }
}

impl From<RepositoryError> for ExpenseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ExpenseError::ExpenseNotFound,
            RepositoryError::DatabaseError(msg) => ExpenseError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => ExpenseError::DatabaseError(msg),
        }
    }
}

/// Inclusive time window for listing expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ExpenseWindow {
    /// Resolve optional textual bounds against `now`.
    ///
    /// A missing end is `now`; a missing start is seven days before the end.
    /// With only a start, the end is seven days after it.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ExpenseError> {
        let parse = |raw: &str| {
            parse_window_bound(raw).map_err(|e| ExpenseError::InvalidTimestamp(e.to_string()))
        };
        let width = Duration::days(DEFAULT_WINDOW_DAYS);

        // Bounds near the ends of the calendar leave no room for the default width
        let before = |end: DateTime<Utc>| {
            end.checked_sub_signed(width)
                .ok_or(ExpenseError::InvalidWindow)
        };
        let after = |start: DateTime<Utc>| {
            start
                .checked_add_signed(width)
                .ok_or(ExpenseError::InvalidWindow)
        };

        let (start, end) = match (start.map(parse).transpose()?, end.map(parse).transpose()?) {
            (Some(start), Some(end)) => (start, end),
            (Some(start), None) => (start, after(start)?),
            (None, Some(end)) => (before(end)?, end),
            (None, None) => {
                let end = truncate_to_seconds(now);
                (before(end)?, end)
            }
        };

        if start > end {
            return Err(ExpenseError::InvalidWindow);
        }

        Ok(Self { start, end })
    }
}

/// Trait defining expense operations
#[async_trait]
pub trait ExpenseService: Send + Sync {
    /// Record an expense under a category the user owns
    async fn add_expense(
        &self,
        user_id: i64,
        request: CreateExpenseRequest,
    ) -> Result<CreatedExpense, ExpenseError>;

    /// Fetch one of the user's expenses
    async fn get_expense(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<ExpenseDetail, ExpenseError>;

    /// List the user's expenses inside an inclusive window
    async fn list_expenses(
        &self,
        user_id: i64,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<ExpenseListItem>, ExpenseError>;
}

/// Implementation of ExpenseService
pub struct ExpenseServiceImpl {
    resolver: Arc<dyn OwnershipResolver>,
    expense_repository: Arc<dyn ExpenseRepository>,
}

impl ExpenseServiceImpl {
    pub fn new(
        resolver: Arc<dyn OwnershipResolver>,
        expense_repository: Arc<dyn ExpenseRepository>,
    ) -> Self {
        Self {
            resolver,
            expense_repository,
        }
    }
}

#[async_trait]
impl ExpenseService for ExpenseServiceImpl {
    async fn add_expense(
        &self,
        user_id: i64,
        request: CreateExpenseRequest,
    ) -> Result<CreatedExpense, ExpenseError> {
        let category = self
            .resolver
            .resolve_category(user_id, request.category_id)
            .await?;

        let expense = self
            .expense_repository
            .create(NewExpense {
                category_id: category.category_id,
                date_time: truncate_to_seconds(request.date_time),
                cost: request.cost,
                description: request.description,
            })
            .await?;

        tracing::info!(
            user_id,
            category_id = expense.category_id,
            expense_id = expense.expense_id,
            "expense recorded"
        );

        Ok(CreatedExpense::from(expense))
    }

    async fn get_expense(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<ExpenseDetail, ExpenseError> {
        let user = self.resolver.resolve_user(user_id).await?;

        self.expense_repository
            .find_owned(user.user_id, expense_id)
            .await?
            .map(ExpenseDetail::from)
            .ok_or(ExpenseError::ExpenseNotFound)
    }

    async fn list_expenses(
        &self,
        user_id: i64,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<ExpenseListItem>, ExpenseError> {
        let user = self.resolver.resolve_user(user_id).await?;
        let window = ExpenseWindow::resolve(start_date, end_date, Utc::now())?;

        let expenses = self
            .expense_repository
            .find_in_window(user.user_id, window.start, window.end)
            .await?;

        Ok(expenses.into_iter().map(ExpenseListItem::from).collect())
    }
}
