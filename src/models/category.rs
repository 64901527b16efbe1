use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_non_negative_amount;

/// Budget category owned by a single user, carrying its monthly ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[schema(example = json!({
    "category_id": 3,
    "category_name": "groceries",
    "user_id": 13,
    "monthly_budget": "500"
}))]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
    pub user_id: i64,
    #[schema(value_type = String, example = "500")]
    pub monthly_budget: Decimal,
}

/// Whether an upsert created a new category or updated an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Request payload for setting a category's budget ceiling
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "budget": 500 }))]
pub struct SetBudgetRequest {
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = f64, minimum = 0.0, example = 500)]
    pub budget: Decimal,
}
