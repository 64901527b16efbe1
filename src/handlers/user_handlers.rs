use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::{internal_error, not_found, validation_error_response};
use crate::models::user::{CreateUserRequest, CreatedUser, UserSummary};
use crate::services::user_service::{UserError, UserService};

/// Convert UserError to HTTP response
impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::UserNotFound => not_found("user not found."),
            UserError::PasswordHashing(msg) | UserError::DatabaseError(msg) => {
                internal_error(&msg)
            }
        }
    }
}

/// Handler for listing all users
#[utoipa::path(
    get,
    path = "/users/",
    responses(
        (status = 200, description = "All users", body = Vec<UserSummary>),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users_handler(
    State(user_service): State<Arc<dyn UserService>>,
) -> Result<Json<Vec<UserSummary>>, Response> {
    match user_service.list_users().await {
        Ok(users) => Ok(Json(users)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fetching a single user
#[utoipa::path(
    get,
    path = "/users/{user_id}/",
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserSummary),
        (status = 404, description = "User not found", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    State(user_service): State<Arc<dyn UserService>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserSummary>, Response> {
    match user_service.get_user(user_id).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating a user
#[utoipa::path(
    post,
    path = "/users/",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreatedUser),
        (status = 422, description = "Validation error", body = super::ErrorResponse),
        (status = 500, description = "Internal server error", body = super::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user_handler(
    State(user_service): State<Arc<dyn UserService>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<CreatedUser>, Response> {
    if let Err(validation_errors) = request.validate() {
        return Err(validation_error_response(validation_errors));
    }

    match user_service.create_user(request).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => Err(e.into_response()),
    }
}
