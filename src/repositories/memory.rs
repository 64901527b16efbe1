//! In-memory record store.
//!
//! Implements every repository trait over a single mutex-guarded state, so a
//! lookup followed by a write is atomic just like the PostgreSQL upsert. Used
//! by the test suites and handy for running the API without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::category_repository::CategoryRepository;
use super::expense_repository::ExpenseRepository;
use super::user_repository::UserRepository;
use super::RepositoryError;
use crate::models::category::{Category, UpsertOutcome};
use crate::models::expense::{CategorizedExpense, Expense, NewExpense};
use crate::models::user::User;

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    expenses: BTreeMap<i64, Expense>,
    next_user_id: i64,
    next_category_id: i64,
    next_expense_id: i64,
}

impl MemoryState {
    fn categorize(&self, expense: &Expense) -> Option<CategorizedExpense> {
        self.categories
            .get(&expense.category_id)
            .map(|category| CategorizedExpense {
                expense_id: expense.expense_id,
                category_id: expense.category_id,
                category_name: category.category_name.clone(),
                date_time: expense.date_time,
                cost: expense.cost,
                description: expense.description.clone(),
            })
    }

    fn owner_of(&self, category_id: i64) -> Option<i64> {
        self.categories.get(&category_id).map(|c| c.user_id)
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn sorted_by_time<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (DateTime<Utc>, i64),
{
    rows.sort_by_key(|row| key(row));
    rows
}

/// Record store kept entirely in process memory
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
    should_fail: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with a database error
    pub fn with_failure() -> Self {
        let store = Self::default();
        store.set_failure(true);
        store
    }

    /// Toggle simulated database failures
    pub fn set_failure(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::DatabaseError(
                "Database connection failed".to_string(),
            ));
        }

        self.state
            .lock()
            .map_err(|_| RepositoryError::DatabaseError("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, name: &str, password_hash: &str) -> Result<User, RepositoryError> {
        let mut state = self.state()?;
        let user = User {
            user_id: next_id(&mut state.next_user_id),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
        };
        state.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, RepositoryError> {
        let state = self.state()?;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.state()?;
        Ok(state.users.values().cloned().collect())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_owned(
        &self,
        user_id: i64,
        category_id: i64,
    ) -> Result<Option<Category>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .categories
            .get(&category_id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Category>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_budget(
        &self,
        user_id: i64,
        name: &str,
        ceiling: Decimal,
    ) -> Result<(Category, UpsertOutcome), RepositoryError> {
        let mut state = self.state()?;

        if !state.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound);
        }

        let existing = state
            .categories
            .values_mut()
            .find(|c| c.user_id == user_id && c.category_name == name);

        if let Some(category) = existing {
            category.monthly_budget = ceiling;
            return Ok((category.clone(), UpsertOutcome::Updated));
        }

        let category = Category {
            category_id: next_id(&mut state.next_category_id),
            category_name: name.to_string(),
            user_id,
            monthly_budget: ceiling,
        };
        state.categories.insert(category.category_id, category.clone());
        Ok((category, UpsertOutcome::Created))
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryStore {
    async fn create(&self, expense: NewExpense) -> Result<Expense, RepositoryError> {
        let mut state = self.state()?;

        if !state.categories.contains_key(&expense.category_id) {
            return Err(RepositoryError::ConstraintViolation(
                "expense category does not exist".to_string(),
            ));
        }

        let created = Expense {
            expense_id: next_id(&mut state.next_expense_id),
            category_id: expense.category_id,
            date_time: expense.date_time,
            cost: expense.cost,
            description: expense.description,
        };
        state.expenses.insert(created.expense_id, created.clone());
        Ok(created)
    }

    async fn find_by_categories(
        &self,
        category_ids: &[i64],
    ) -> Result<Vec<Expense>, RepositoryError> {
        let state = self.state()?;
        let matching: Vec<Expense> = state
            .expenses
            .values()
            .filter(|e| category_ids.contains(&e.category_id))
            .cloned()
            .collect();
        Ok(sorted_by_time(matching, |e: &Expense| (e.date_time, e.expense_id)))
    }

    async fn find_owned(
        &self,
        user_id: i64,
        expense_id: i64,
    ) -> Result<Option<CategorizedExpense>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .expenses
            .get(&expense_id)
            .filter(|e| state.owner_of(e.category_id) == Some(user_id))
            .and_then(|e| state.categorize(e)))
    }

    async fn find_in_window(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CategorizedExpense>, RepositoryError> {
        let state = self.state()?;
        let matching: Vec<CategorizedExpense> = state
            .expenses
            .values()
            .filter(|e| state.owner_of(e.category_id) == Some(user_id))
            .filter(|e| start <= e.date_time && e.date_time <= end)
            .filter_map(|e| state.categorize(e))
            .collect();
        Ok(sorted_by_time(matching, |e: &CategorizedExpense| {
            (e.date_time, e.expense_id)
        }))
    }
}
