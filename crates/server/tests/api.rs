use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
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

async fn create_user(app: &Router, username: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "password": "secret-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_event(app: &Router, organizer_id: i64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/events",
        Some(json!({
            "title": "Rust Meetup",
            "location": "Main Hall",
            "start_date": "2025-06-01T09:00:00Z",
            "end_date": "2025-06-01T17:00:00Z",
            "organizer_id": organizer_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn root_says_welcome() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("Welcome"));
}

#[tokio::test]
async fn expense_lifecycle() {
    let app = app().await;

    let (status, category) = send(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "Food & Dining" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();

    let (status, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({ "title": "Lunch", "amount": 12.50, "category_id": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["category"]["name"], "Food & Dining");
    let expense_id = expense["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/expenses/{expense_id}"),
        Some(json!({ "amount": 15.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["amount"], 15.0);
    assert_eq!(updated["title"], "Lunch");
    assert_eq!(updated["date"], expense["date"]);

    let (status, listed) = send(
        &app,
        Method::GET,
        &format!("/expenses?category_id={category_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/categories/{category_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/expenses/{expense_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/expenses/{expense_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validation_errors_list_violations() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({
            "email": "nope",
            "username": "ab",
            "password": "short",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let violations = body["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 3);
    let password = violations
        .iter()
        .find(|v| v["field"] == "password")
        .unwrap();
    assert_ne!(password["value"], "short");
}

#[tokio::test]
async fn user_responses_never_expose_the_password() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;

    let (status, body) = send(&app, Method::GET, &format!("/users/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body["events"].as_array().unwrap().is_empty());
    assert!(body.get("password").is_none());
    assert!(body.get("hashed_password").is_none());

    let (status, _) = send(
        &app,
        Method::POST,
        "/users",
        Some(json!({
            "email": "alice@example.com",
            "username": "someone-else",
            "password": "secret-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn null_clears_a_nullable_field() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{user_id}"),
        Some(json!({ "full_name": "Alice Liddell" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "Alice Liddell");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/users/{user_id}"),
        Some(json!({ "full_name": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["full_name"].is_null());
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn event_dates_are_checked_against_stored_values() {
    let app = app().await;
    let user_id = create_user(&app, "alice").await;
    let event_id = create_event(&app, user_id).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/events/{event_id}"),
        Some(json!({ "end_date": "2025-05-31T09:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["violations"][0]["field"], "end_date");

    let (status, events) = send(&app, Method::GET, "/events?title=meetup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);

    let (status, events) = send(
        &app,
        Method::GET,
        &format!("/users/{user_id}/events"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["id"], event_id);
}

#[tokio::test]
async fn attendee_registration_flow() {
    let app = app().await;
    let alice = create_user(&app, "alice").await;
    let bob = create_user(&app, "bob").await;
    let event_id = create_event(&app, alice).await;
    let attendees = format!("/events/{event_id}/attendees");

    let (status, body) = send(&app, Method::POST, &attendees, Some(json!({ "user_id": bob }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["attended"], false);

    let (status, _) = send(&app, Method::POST, &attendees, Some(json!({ "user_id": bob }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, detail) = send(&app, Method::GET, &format!("/events/{event_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Rust Meetup");
    assert_eq!(detail["attendees"][0]["user_id"], bob);

    let (status, _) = send(&app, Method::DELETE, &format!("{attendees}/{bob}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("{attendees}/{bob}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{alice}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/events/{event_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn naive_timestamps_are_read_as_utc() {
    let app = app().await;
    let (_, category) = send(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "Travel" })),
    )
    .await;

    let (status, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({
            "title": "Train",
            "amount": 42.0,
            "date": "2025-06-01T12:00:00",
            "category_id": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["date"], "2025-06-01T12:00:00Z");

    let user_id = create_user(&app, "alice").await;
    let (status, event) = send(
        &app,
        Method::POST,
        "/events",
        Some(json!({
            "title": "Workshop",
            "location": "Room 2",
            "start_date": "2025-07-01T09:00:00",
            "end_date": "2025-07-01T12:30:00",
            "organizer_id": user_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["end_date"], "2025-07-01T12:30:00Z");

    let (status, events) = send(
        &app,
        Method::GET,
        "/events?start_date=2025-06-30T00:00:00",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_requests_get_json_errors() {
    let app = app().await;
    let (_, category) = send(
        &app,
        Method::POST,
        "/categories",
        Some(json!({ "name": "Travel" })),
    )
    .await;
    let (_, expense) = send(
        &app,
        Method::POST,
        "/expenses",
        Some(json!({ "title": "Taxi", "amount": 9.0, "category_id": category["id"] })),
    )
    .await;
    let expense_id = expense["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/expenses/{expense_id}"),
        Some(json!({ "amount": null })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/expenses/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/expenses?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
