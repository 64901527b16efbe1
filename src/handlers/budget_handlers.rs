use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::{internal_error, not_found, unprocessable, validation_error_response};
use crate::models::budget::{BudgetQuery, BudgetView};
use crate::models::category::{Category, SetBudgetRequest};
use crate::services::budget_service::{BudgetError, BudgetService};

/// Convert BudgetError to HTTP response
impl IntoResponse for BudgetError {
    fn into_response(self) -> Response {
        match self {
            BudgetError::UserNotFound => not_found("user not found."),
            BudgetError::CategoryNotFound => not_found("budget category not found."),
            BudgetError::InvalidBudget(msg) => unprocessable(msg),
            err @ BudgetError::AmountOverflow { .. } => unprocessable(err.to_string()),
            BudgetError::DatabaseError(msg) => internal_error(&msg),
        }
    }
}

/// Handler for reading a user's budget
///
/// Returns one view per category, or only the requested category when
/// `budget_category_id` is given.
#[utoipa::path(
    get,
    path = "/users/{user_id}/budget/",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        BudgetQuery
    ),
    responses(
        (status = 200, description = "Budget views", body = Vec<BudgetView>),
        (status = 404, description = "User or budget category not found", body = super::ErrorResponse),
        (status = 422, description = "Spending total out of range", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "budgets"
)]
pub async fn get_budget_handler(
    State(budget_service): State<Arc<dyn BudgetService>>,
    Path(user_id): Path<i64>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<BudgetView>>, Response> {
    match budget_service
        .get_budget_view(user_id, query.budget_category_id)
        .await
    {
        Ok(views) => Ok(Json(views)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for setting a category budget
///
/// Creates the named category with the given budget, or updates the budget of
/// the user's existing category with that name.
#[utoipa::path(
    post,
    path = "/users/{user_id}/budget/{category_name}/",
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("category_name" = String, Path, description = "User-defined category name")
    ),
    request_body = SetBudgetRequest,
    responses(
        (status = 200, description = "Category created or updated", body = Category),
        (status = 404, description = "User not found", body = super::ErrorResponse),
        (status = 422, description = "Validation error", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "budgets"
)]
pub async fn set_budget_handler(
    State(budget_service): State<Arc<dyn BudgetService>>,
    Path((user_id, category_name)): Path<(i64, String)>,
    Json(request): Json<SetBudgetRequest>,
) -> Result<Json<Category>, Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match budget_service
        .upsert_budget(user_id, &category_name, request.budget)
        .await
    {
        Ok(category) => Ok(Json(category)),
        Err(e) => Err(e.into_response()),
    }
}
