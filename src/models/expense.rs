use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_non_negative_amount;

/// Expense entity; immutable once recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Expense {
    pub expense_id: i64,
    pub category_id: i64,
    #[serde(with = "crate::models::timestamp::canonical")]
    #[schema(value_type = String, example = "2023-05-08 14:19:45+00:00")]
    pub date_time: DateTime<Utc>,
    #[schema(value_type = String, example = "25")]
    pub cost: Decimal,
    pub description: String,
}

/// Expense joined with the name of the category it is filed under
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CategorizedExpense {
    pub expense_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub date_time: DateTime<Utc>,
    pub cost: Decimal,
    pub description: String,
}

/// Fields needed to record a new expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category_id: i64,
    pub date_time: DateTime<Utc>,
    pub cost: Decimal,
    pub description: String,
}

/// Request payload for recording an expense
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "cost": 25,
    "date_time": "2023-05-08 14:19:45",
    "category_id": 16,
    "description": "weekly groceries"
}))]
pub struct CreateExpenseRequest {
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = f64, minimum = 0.0, example = 25)]
    pub cost: Decimal,

    /// Accepts "YYYY-MM-DD HH:MM:SS" (UTC) or a timestamp with an explicit offset
    #[serde(with = "crate::models::timestamp::canonical")]
    #[schema(value_type = String, example = "2023-05-08 14:19:45")]
    pub date_time: DateTime<Utc>,

    pub category_id: i64,

    #[serde(default)]
    pub description: String,
}

/// Echo of a freshly recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedExpense {
    pub expense_id: i64,
    pub category_id: i64,
    #[serde(with = "crate::models::timestamp::canonical")]
    #[schema(value_type = String, example = "2023-05-08 14:19:45+00:00")]
    pub date_time: DateTime<Utc>,
    #[schema(value_type = String, example = "25")]
    pub cost: Decimal,
    pub description: String,
}

impl From<Expense> for CreatedExpense {
    fn from(expense: Expense) -> Self {
        Self {
            expense_id: expense.expense_id,
            category_id: expense.category_id,
            date_time: expense.date_time,
            cost: expense.cost,
            description: expense.description,
        }
    }
}

/// Single expense as returned by the lookup endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExpenseDetail {
    #[schema(value_type = String, example = "25")]
    pub cost: Decimal,
    #[serde(with = "crate::models::timestamp::canonical")]
    #[schema(value_type = String, example = "2023-05-08 14:19:45+00:00")]
    pub date_time: DateTime<Utc>,
    pub expense_id: i64,
    /// Name of the owning category
    pub category: String,
    pub description: String,
}

impl From<CategorizedExpense> for ExpenseDetail {
    fn from(expense: CategorizedExpense) -> Self {
        Self {
            cost: expense.cost,
            date_time: expense.date_time,
            expense_id: expense.expense_id,
            category: expense.category_name,
            description: expense.description,
        }
    }
}

/// Row of the expense listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExpenseListItem {
    pub expense_id: i64,
    #[schema(value_type = String, example = "25")]
    pub cost: Decimal,
    #[serde(with = "crate::models::timestamp::canonical")]
    #[schema(value_type = String, example = "2023-05-08 14:19:45+00:00")]
    pub date_time: DateTime<Utc>,
    pub description: String,
    pub category: String,
}

impl From<CategorizedExpense> for ExpenseListItem {
    fn from(expense: CategorizedExpense) -> Self {
        Self {
            expense_id: expense.expense_id,
            cost: expense.cost,
            date_time: expense.date_time,
            description: expense.description,
            category: expense.category_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_create_request_accepts_numeric_cost_and_plain_timestamp() {
        let request: CreateExpenseRequest = serde_json::from_value(json!({
            "cost": 12.34,
            "date_time": "2023-05-08 14:19:45",
            "category_id": 16,
            "description": "lunch"
        }))
        .unwrap();

        assert_eq!(request.cost, Decimal::from_str("12.34").unwrap());
        assert_eq!(
            request.date_time,
            Utc.with_ymd_and_hms(2023, 5, 8, 14, 19, 45).unwrap()
        );
        assert_eq!(request.description, "lunch");
    }

    #[test]
    fn test_create_request_description_defaults_to_empty() {
        let request: CreateExpenseRequest = serde_json::from_value(json!({
            "cost": 3,
            "date_time": "2023-05-08 14:19:45",
            "category_id": 1
        }))
        .unwrap();

        assert_eq!(request.description, "");
    }

    #[test]
    fn test_create_request_rejects_bad_timestamp() {
        let result: Result<CreateExpenseRequest, _> = serde_json::from_value(json!({
            "cost": 3,
            "date_time": "08/05/2023",
            "category_id": 1
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_negative_cost_fails_validation() {
        let request = CreateExpenseRequest {
            cost: Decimal::from_str("-1.00").unwrap(),
            date_time: Utc::now(),
            category_id: 1,
            description: String::new(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_created_expense_serializes_canonical_timestamp() {
        let created = CreatedExpense {
            expense_id: 7,
            category_id: 16,
            date_time: Utc.with_ymd_and_hms(2023, 5, 8, 14, 19, 45).unwrap(),
            cost: Decimal::from(25),
            description: "string".to_string(),
        };

        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["date_time"], "2023-05-08 14:19:45+00:00");
        assert_eq!(value["expense_id"], 7);
    }
}
