use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::category::Category;
use crate::models::expense::Expense;

/// Expense as it appears inside a budget view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BudgetExpense {
    #[serde(with = "crate::models::timestamp::canonical")]
    #[schema(value_type = String, example = "2023-05-08 14:19:45+00:00")]
    pub date_time: DateTime<Utc>,
    #[schema(value_type = String, example = "25")]
    pub cost: Decimal,
    pub item_description: String,
}

impl From<Expense> for BudgetExpense {
    fn from(expense: Expense) -> Self {
        Self {
            date_time: expense.date_time,
            cost: expense.cost,
            item_description: expense.description,
        }
    }
}

/// Spend-versus-budget summary for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BudgetView {
    pub category_id: i64,
    pub category_name: String,
    #[schema(value_type = String, example = "500")]
    pub budget_ceiling: Decimal,
    pub expenses: Vec<BudgetExpense>,
    /// Ceiling minus total spent; negative when over budget
    #[schema(value_type = String, example = "380")]
    pub budget_delta: Decimal,
}

impl BudgetView {
    /// Build the view for a category from all of its expenses.
    ///
    /// The sum is exact decimal arithmetic; an empty expense list leaves the
    /// delta equal to the ceiling. Returns `None` when the total or the delta
    /// falls outside the range `Decimal` can represent.
    pub fn from_category(category: Category, expenses: Vec<Expense>) -> Option<Self> {
        let total_spent = expenses
            .iter()
            .try_fold(Decimal::ZERO, |total, expense| total.checked_add(expense.cost))?;
        let budget_delta = category.monthly_budget.checked_sub(total_spent)?;

        Some(Self {
            category_id: category.category_id,
            category_name: category.category_name,
            budget_delta,
            budget_ceiling: category.monthly_budget,
            expenses: expenses.into_iter().map(BudgetExpense::from).collect(),
        })
    }
}

/// Query parameters of the budget endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BudgetQuery {
    /// Restrict the view to a single category
    pub budget_category_id: Option<i64>,
}

/// Query parameters of the expense listing endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpenseWindowQuery {
    /// Inclusive lower bound, "YYYY-MM-DD HH:MM:SS"; defaults to seven days before `end_date`
    pub start_date: Option<String>,
    /// Inclusive upper bound, "YYYY-MM-DD HH:MM:SS"; defaults to now
    pub end_date: Option<String>,
}
