use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

use budget_tracker::repositories::InMemoryStore;
use budget_tracker::routes::{create_router, AppState};

/// Cheapest cost bcrypt accepts, keeps user creation fast
const TEST_BCRYPT_COST: u32 = 4;

/// Helper function to create test app router over a fresh in-memory store
fn create_test_app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    create_router(AppState::with_repositories(
        store.clone(),
        store.clone(),
        store,
        TEST_BCRYPT_COST,
    ))
}

/// Helper function to parse JSON response body
async fn parse_json_body(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, parse_json_body(response.into_body()).await)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

async fn create_user(app: &Router, name: &str) -> i64 {
    let (status, body) = post_json(
        app,
        "/users/",
        json!({ "name": name, "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["user_id"].as_i64().unwrap()
}

async fn set_budget(app: &Router, user_id: i64, name: &str, budget: Value) -> Value {
    let (status, body) = post_json(
        app,
        &format!("/users/{}/budget/{}/", user_id, name),
        json!({ "budget": budget }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

async fn add_expense(
    app: &Router,
    user_id: i64,
    category_id: i64,
    date_time: &str,
    cost: &str,
) -> (StatusCode, Value) {
    post_json(
        app,
        &format!("/user/{}/expense/", user_id),
        json!({
            "cost": cost,
            "date_time": date_time,
            "category_id": category_id,
            "description": "string"
        }),
    )
    .await
}

#[tokio::test]
async fn test_root_and_health() {
    let app = create_test_app();

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Welcome to the Budget Tracker API. See /docs for more information."
    );

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app();

    let (status, body) = get_json(&app, "/docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/users/{user_id}/budget/"].is_object());
    assert!(body["paths"]["/user/{user_id}/expense/"].is_object());
    assert!(body["components"]["schemas"]["ErrorResponse"].is_object());
    assert_eq!(
        body["paths"]["/users/{user_id}/"]["get"]["responses"]["404"]["content"]
            ["application/json"]["schema"]["$ref"],
        "#/components/schemas/ErrorResponse"
    );
}

#[tokio::test]
async fn test_user_directory() {
    let app = create_test_app();

    let (status, body) = post_json(
        &app,
        "/users/",
        json!({ "name": "Joe", "password": "password123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_name"], "Joe");
    let user_id = body["user_id"].as_i64().unwrap();
    assert!(body.get("password").is_none());

    let (status, body) = get_json(&app, &format!("/users/{}/", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "user_id": user_id, "name": "Joe" }));

    let (status, body) = get_json(&app, "/users/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert!(body[0].get("password_hash").is_none());

    let (status, body) = get_json(&app, "/users/999999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "user not found.");
}

#[tokio::test]
async fn test_create_user_validation_error() {
    let app = create_test_app();

    let (status, body) = post_json(&app, "/users/", json!({ "name": "", "password": "x" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_budget_delta_for_single_category() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    let category = set_budget(&app, user_id, "groceries", json!(500)).await;
    let category_id = category["category_id"].as_i64().unwrap();

    for cost in ["100", "20"] {
        let (status, _) = add_expense(&app, user_id, category_id, "2023-05-08 14:19:45", cost).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_json(
        &app,
        &format!(
            "/users/{}/budget/?budget_category_id={}",
            user_id, category_id
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let views = body.as_array().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["category_name"], "groceries");
    assert_eq!(decimal(&views[0]["budget_ceiling"]), Decimal::from(500));
    assert_eq!(decimal(&views[0]["budget_delta"]), Decimal::from(380));
    assert_eq!(views[0]["expenses"].as_array().unwrap().len(), 2);
    assert_eq!(views[0]["expenses"][0]["item_description"], "string");
}

#[tokio::test]
async fn test_budget_view_covers_every_category() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    set_budget(&app, user_id, "groceries", json!(500)).await;
    set_budget(&app, user_id, "rent", json!("1200.50")).await;

    let (status, body) = get_json(&app, &format!("/users/{}/budget/", user_id)).await;

    assert_eq!(status, StatusCode::OK);
    let views = body.as_array().unwrap();
    assert_eq!(views.len(), 2);
    for view in views {
        assert_eq!(decimal(&view["budget_delta"]), decimal(&view["budget_ceiling"]));
        assert!(view["expenses"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_budget_upsert_does_not_duplicate() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;

    let first = set_budget(&app, user_id, "NEW_BUDGET", json!(100)).await;
    let second = set_budget(&app, user_id, "NEW_BUDGET", json!(250)).await;

    assert_eq!(first["category_id"], second["category_id"]);
    assert_eq!(second["user_id"].as_i64().unwrap(), user_id);
    assert_eq!(decimal(&second["monthly_budget"]), Decimal::from(250));

    let (_, body) = get_json(&app, &format!("/users/{}/budget/", user_id)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_budget_errors() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    let other_id = create_user(&app, "Rahul").await;
    let foreign = set_budget(&app, other_id, "travel", json!(300)).await;

    let (status, body) = post_json(
        &app,
        "/users/999999/budget/groceries/",
        json!({ "budget": 10 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "user not found.");

    let (status, body) = get_json(
        &app,
        &format!(
            "/users/{}/budget/?budget_category_id={}",
            user_id, foreign["category_id"]
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "budget category not found.");

    let (status, _) = post_json(
        &app,
        &format!("/users/{}/budget/groceries/", user_id),
        json!({ "budget": -1 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_expense_in_foreign_category_is_rejected() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    let other_id = create_user(&app, "Rahul").await;
    let foreign = set_budget(&app, other_id, "travel", json!(300)).await;

    let (status, body) = add_expense(
        &app,
        user_id,
        foreign["category_id"].as_i64().unwrap(),
        "2023-05-08 14:19:45",
        "25",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "budget category not found.");

    let (status, body) =
        add_expense(&app, user_id, 999_999, "2023-05-08 14:19:45", "25").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "budget category not found.");
}

#[tokio::test]
async fn test_expense_round_trip() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    let category = set_budget(&app, user_id, "groceries", json!(500)).await;
    let category_id = category["category_id"].as_i64().unwrap();

    let (status, created) =
        add_expense(&app, user_id, category_id, "2023-05-08 14:19:45", "25.10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["date_time"], "2023-05-08 14:19:45+00:00");
    let expense_id = created["expense_id"].as_i64().unwrap();

    let (status, fetched) = get_json(
        &app,
        &format!("/users/{}/expense/{}", user_id, expense_id),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["expense_id"].as_i64().unwrap(), expense_id);
    assert_eq!(decimal(&fetched["cost"]), Decimal::from_str("25.10").unwrap());
    assert_eq!(fetched["date_time"], created["date_time"]);
    assert_eq!(fetched["category"], "groceries");
    assert_eq!(fetched["description"], "string");
}

#[tokio::test]
async fn test_expense_of_other_user_is_not_found() {
    let app = create_test_app();
    let owner_id = create_user(&app, "Joe").await;
    let intruder_id = create_user(&app, "Rahul").await;
    let category = set_budget(&app, owner_id, "groceries", json!(500)).await;
    let (_, created) = add_expense(
        &app,
        owner_id,
        category["category_id"].as_i64().unwrap(),
        "2023-05-08 14:19:45",
        "25",
    )
    .await;

    let (status, body) = get_json(
        &app,
        &format!("/users/{}/expense/{}", intruder_id, created["expense_id"]),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "expense not found.");
}

#[tokio::test]
async fn test_expense_window_is_inclusive() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    let category = set_budget(&app, user_id, "groceries", json!(500)).await;
    let category_id = category["category_id"].as_i64().unwrap();

    for date_time in [
        "2023-04-30 23:59:59",
        "2023-05-01 00:00:00",
        "2023-05-05 12:00:00",
        "2023-05-10 00:00:00",
        "2023-05-10 00:00:01",
    ] {
        add_expense(&app, user_id, category_id, date_time, "1").await;
    }

    let (status, body) = get_json(
        &app,
        &format!(
            "/users/{}/expenses?start_date=2023-05-01%2000:00:00&end_date=2023-05-10%2000:00:00",
            user_id
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["date_time"].as_str().unwrap())
        .collect();
    assert_eq!(
        dates,
        vec![
            "2023-05-01 00:00:00+00:00",
            "2023-05-05 12:00:00+00:00",
            "2023-05-10 00:00:00+00:00"
        ]
    );
    assert_eq!(body[0]["category"], "groceries");
}

#[tokio::test]
async fn test_expense_window_errors() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;

    let (status, _) = get_json(
        &app,
        &format!("/users/{}/expenses?start_date=yesterday", user_id),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get_json(
        &app,
        &format!(
            "/users/{}/expenses?start_date=2023-05-10&end_date=2023-05-01",
            user_id
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = get_json(&app, "/users/999999/expenses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "user not found.");
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let store = Arc::new(InMemoryStore::with_failure());
    let app = create_router(AppState::with_repositories(
        store.clone(),
        store.clone(),
        store,
        TEST_BCRYPT_COST,
    ));

    let (status, body) = get_json(&app, "/users/").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "internal server error.");
}

#[tokio::test]
async fn test_budget_total_beyond_decimal_range() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;
    let category = set_budget(&app, user_id, "yacht", json!(500)).await;
    let category_id = category["category_id"].as_i64().unwrap();

    for _ in 0..2 {
        let (status, _) = add_expense(
            &app,
            user_id,
            category_id,
            "2023-05-08 14:19:45",
            "50000000000000000000000000000",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_json(&app, &format!("/users/{}/budget/", user_id)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("range"));
}

#[tokio::test]
async fn test_expense_window_at_calendar_edge() {
    let app = create_test_app();
    let user_id = create_user(&app, "Joe").await;

    let (status, _) = get_json(
        &app,
        &format!(
            "/users/{}/expenses?start_date=%2B262142-12-31%2000:00:00",
            user_id
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
