use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::{internal_error, not_found, unprocessable, validation_error_response};
use crate::models::budget::ExpenseWindowQuery;
use crate::models::expense::{CreateExpenseRequest, CreatedExpense, ExpenseDetail, ExpenseListItem};
use crate::services::expense_service::{ExpenseError, ExpenseService};

/// Convert ExpenseError to HTTP response
impl IntoResponse for ExpenseError {
    fn into_response(self) -> Response {
        match self {
            ExpenseError::UserNotFound => not_found("user not found."),
            ExpenseError::CategoryNotFound => not_found("budget category not found."),
            ExpenseError::ExpenseNotFound => not_found("expense not found."),
            ExpenseError::InvalidTimestamp(msg) => unprocessable(msg),
            err @ ExpenseError::InvalidWindow => unprocessable(err.to_string()),
            ExpenseError::DatabaseError(msg) => internal_error(&msg),
        }
    }
}

/// Handler for fetching a single expense
#[utoipa::path(
    get,
    path = "/users/{user_id}/expense/{expense_id}",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("expense_id" = i64, Path, description = "Expense ID")
    ),
    responses(
        (status = 200, description = "Expense found", body = ExpenseDetail),
        (status = 404, description = "User or expense not found", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn get_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Path((user_id, expense_id)): Path<(i64, i64)>,
) -> Result<Json<ExpenseDetail>, Response> {
    match expense_service.get_expense(user_id, expense_id).await {
        Ok(expense) => Ok(Json(expense)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing expenses over a time window
///
/// Both bounds are inclusive. By default the window is the seven days ending now.
#[utoipa::path(
    get,
    path = "/users/{user_id}/expenses",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ExpenseWindowQuery
    ),
    responses(
        (status = 200, description = "Expenses in the window", body = Vec<ExpenseListItem>),
        (status = 404, description = "User not found", body = super::ErrorResponse),
        (status = 422, description = "Malformed or inverted window", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn list_expenses_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Path(user_id): Path<i64>,
    Query(query): Query<ExpenseWindowQuery>,
) -> Result<Json<Vec<ExpenseListItem>>, Response> {
    match expense_service
        .list_expenses(
            user_id,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await
    {
        Ok(expenses) => Ok(Json(expenses)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for recording an expense
#[utoipa::path(
    post,
    path = "/user/{user_id}/expense/",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    request_body = CreateExpenseRequest,
    responses(
        (status = 200, description = "Expense recorded", body = CreatedExpense),
        (status = 404, description = "Budget category not found", body = super::ErrorResponse),
        (status = 422, description = "Validation error", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn add_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    Path(user_id): Path<i64>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<Json<CreatedExpense>, Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match expense_service.add_expense(user_id, request).await {
        Ok(expense) => Ok(Json(expense)),
        Err(e) => Err(e.into_response()),
    }
}
