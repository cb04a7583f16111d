//! Integration tests for the user CRUD endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::common::{delete, get, post_json, put_json, test_app};

#[tokio::test]
async fn test_user_lifecycle() {
    let (app, state) = test_app();

    let (status, created) = post_json(
        app.clone(),
        "/api/users",
        json!({"name": "John Doe", "email": "john@example.com", "age": 30}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], 1);
    assert_eq!(created["age"], 30);

    let (status, fetched) = get(app.clone(), "/api/users/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = put_json(
        app.clone(),
        "/api/users/1",
        json!({"name": "Jane Doe", "email": "jane@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Jane Doe");
    assert!(updated["age"].is_null());

    let (status, listed) = get(app.clone(), "/api/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, deleted) = delete(app.clone(), "/api/users/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "User 1 deleted successfully");

    let (status, _) = get(app, "/api/users/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.user_store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_ids_are_not_reused() {
    let (app, _state) = test_app();

    post_json(app.clone(), "/api/users", json!({"name": "A", "email": "a@example.com"})).await;
    delete(app.clone(), "/api/users/1").await;
    let (_, second) = post_json(app, "/api/users", json!({"name": "B", "email": "b@example.com"})).await;

    assert_eq!(second["id"], 2);
}

#[tokio::test]
async fn test_missing_user_returns_404_everywhere() {
    let (app, _state) = test_app();

    let (status, body) = get(app.clone(), "/api/users/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");

    let (status, _) = put_json(
        app.clone(),
        "/api/users/99999",
        json!({"name": "Ghost", "email": "ghost@example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(app, "/api/users/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_return_422() {
    let (app, state) = test_app();

    let cases = [
        json!({"name": "", "email": "a@example.com"}),
        json!({"name": "Old", "email": "old@example.com", "age": 151}),
        json!({"name": "Neg", "email": "neg@example.com", "age": -1}),
        json!({"name": "x".repeat(101), "email": "long@example.com"}),
        json!({"email": "nameless@example.com"}),
    ];

    for case in cases {
        let (status, body) = post_json(app.clone(), "/api/users", case.clone()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload: {case}");
        assert!(body["request_id"].is_string());
    }

    assert_eq!(state.user_store().count().unwrap(), 0);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let (app, _state) = test_app();

    let (status, _) = get(app, "/api/users/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
