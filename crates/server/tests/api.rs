use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, TokenService};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let state = ServerState::new(engine, TokenService::new("test-secret", 3600));
    server::router(state, "/api")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn signup_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Alice", "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/api/reports/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/expenses", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;
    signup_and_login(&app, "alice@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-one" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "name": "Again", "email": "ALICE@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn me_returns_the_token_owner() {
    let app = app().await;
    let token = signup_and_login(&app, "alice@example.com").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
}

#[tokio::test]
async fn expenses_feed_daily_totals_and_dashboard() {
    let app = app().await;
    let token = signup_and_login(&app, "alice@example.com").await;

    let (status, category) = send(
        &app,
        "POST",
        "/api/categories",
        Some(&token),
        Some(json!({ "name": "Food" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    for (amount, spent_at) in [
        (1000, "2024-05-10T08:00:00Z"),
        (550, "2024-05-10T19:00:00Z"),
        (700, "2024-05-12T12:00:00Z"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/expenses",
            Some(&token),
            Some(json!({
                "description": "lunch",
                "amount_minor": amount,
                "spent_at": spent_at,
                "category_id": category_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, totals) = send(
        &app,
        "GET",
        "/api/expenses/daily?start_date=2024-05-10&end_date=2024-05-12",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        totals,
        json!([
            { "day": "2024-05-10", "total_minor": 1550 },
            { "day": "2024-05-11", "total_minor": 0 },
            { "day": "2024-05-12", "total_minor": 700 },
        ])
    );

    let (status, summary) =
        send(&app, "GET", "/api/reports/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_spent_minor"], 2250);
    assert_eq!(summary["top_categories"][0]["name"], "Food");
    assert_eq!(summary["top_categories"][0]["total_minor"], 2250);
}

#[tokio::test]
async fn malformed_input_is_rejected() {
    let app = app().await;
    let token = signup_and_login(&app, "alice@example.com").await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/expenses/daily?start_date=2024-05-12&end_date=2024-05-10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        "/api/expenses/daily?start_date=yesterday",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&token),
        Some(json!({ "description": "refund", "amount_minor": -100 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn owners_cannot_see_each_other() {
    let app = app().await;
    let alice = signup_and_login(&app, "alice@example.com").await;
    let bob = signup_and_login(&app, "bob@example.com").await;

    let (_, expense) = send(
        &app,
        "POST",
        "/api/expenses",
        Some(&alice),
        Some(json!({ "description": "taxi", "amount_minor": 1800 })),
    )
    .await;
    let uri = format!("/api/expenses/{}", expense["id"].as_str().unwrap());

    let (status, _) = send(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, summary) = send(&app, "GET", "/api/reports/dashboard", Some(&bob), None).await;
    assert_eq!(summary["total_spent_minor"], 0);

    let (status, _) = send(&app, "DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
