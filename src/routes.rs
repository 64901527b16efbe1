use axum::{
    extract::FromRef,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{budget_handlers, expense_handlers, user_handlers, ErrorResponse};
use crate::models::{
    BudgetExpense, BudgetView, Category, CreateExpenseRequest, CreateUserRequest, CreatedExpense,
    CreatedUser, ExpenseDetail, ExpenseListItem, SetBudgetRequest, UserSummary,
};
use crate::repositories::{
    CategoryRepository, ExpenseRepository, PostgresCategoryRepository, PostgresExpenseRepository,
    PostgresUserRepository, UserRepository,
};
use crate::services::{
    BudgetService, BudgetServiceImpl, ExpenseService, ExpenseServiceImpl, OwnershipResolverImpl,
    UserService, UserServiceImpl,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        user_handlers::list_users_handler,
        user_handlers::create_user_handler,
        user_handlers::get_user_handler,
        budget_handlers::get_budget_handler,
        budget_handlers::set_budget_handler,
        expense_handlers::get_expense_handler,
        expense_handlers::list_expenses_handler,
        expense_handlers::add_expense_handler,
    ),
    components(
        schemas(
            UserSummary,
            CreateUserRequest,
            CreatedUser,
            BudgetView,
            BudgetExpense,
            Category,
            SetBudgetRequest,
            CreateExpenseRequest,
            CreatedExpense,
            ExpenseDetail,
            ExpenseListItem,
            ErrorResponse
        )
    ),
    tags(
        (name = "users", description = "User directory"),
        (name = "budgets", description = "Category budgets and spend summaries"),
        (name = "expenses", description = "Expense recording and queries")
    ),
    info(
        title = "Budget Tracker API",
        version = "0.1.0",
        description = "REST API for tracking spending against monthly category budgets",
    )
)]
pub struct ApiDoc;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub budget_service: Arc<dyn BudgetService>,
    pub expense_service: Arc<dyn ExpenseService>,
}

impl AppState {
    /// Wire the services over the given repositories
    pub fn with_repositories(
        user_repository: Arc<dyn UserRepository>,
        category_repository: Arc<dyn CategoryRepository>,
        expense_repository: Arc<dyn ExpenseRepository>,
        bcrypt_cost: u32,
    ) -> Self {
        let resolver = Arc::new(OwnershipResolverImpl::new(
            user_repository.clone(),
            category_repository.clone(),
        ));

        Self {
            user_service: Arc::new(UserServiceImpl::new(
                resolver.clone(),
                user_repository,
                bcrypt_cost,
            )),
            budget_service: Arc::new(BudgetServiceImpl::new(
                resolver.clone(),
                category_repository,
                expense_repository.clone(),
            )),
            expense_service: Arc::new(ExpenseServiceImpl::new(resolver, expense_repository)),
        }
    }

    /// Wire the services over PostgreSQL
    pub fn postgres(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self::with_repositories(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresCategoryRepository::new(pool.clone())),
            Arc::new(PostgresExpenseRepository::new(pool)),
            bcrypt_cost,
        )
    }
}

impl FromRef<AppState> for Arc<dyn UserService> {
    fn from_ref(state: &AppState) -> Self {
        state.user_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn BudgetService> {
    fn from_ref(state: &AppState) -> Self {
        state.budget_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ExpenseService> {
    fn from_ref(state: &AppState) -> Self {
        state.expense_service.clone()
    }
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Users
        .route(
            "/users/",
            get(user_handlers::list_users_handler).post(user_handlers::create_user_handler),
        )
        .route("/users/:user_id/", get(user_handlers::get_user_handler))
        // Budgets
        .route(
            "/users/:user_id/budget/",
            get(budget_handlers::get_budget_handler),
        )
        .route(
            "/users/:user_id/budget/:category_name/",
            post(budget_handlers::set_budget_handler),
        )
        // Expenses
        .route(
            "/users/:user_id/expense/:expense_id",
            get(expense_handlers::get_expense_handler),
        )
        .route(
            "/users/:user_id/expenses",
            get(expense_handlers::list_expenses_handler),
        )
        .route(
            "/user/:user_id/expense/",
            post(expense_handlers::add_expense_handler),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Budget Tracker API. See /docs for more information."
    }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
