//! User management endpoints.
//!
//! Create, read, update and delete operations on the in-memory user store.
//! Every step is logged; the correlation id comes from the request context,
//! so handlers never pass it along themselves.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::correlation;
use shared::models::{User, UserCreate};
use shared::storage::UserStoreError;
use shared::validator::Validate;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Correlation id of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Response for a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Confirmation message.
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            detail: Some(detail.into()),
            request_id: correlation::current().map(|id| id.to_string()),
        }),
    )
}

fn store_error(e: &UserStoreError) -> ApiError {
    match e {
        UserStoreError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "not_found", "User not found"),
        UserStoreError::LockError => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
        }
    }
}

/// Parses and validates a user payload.
fn validated(payload: Result<Json<UserCreate>, JsonRejection>) -> Result<UserCreate, ApiError> {
    let Json(user) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected user payload");
        api_error(rejection.status(), "invalid_json", rejection.body_text())
    })?;

    user.validate().map_err(|errors| {
        tracing::warn!(error = %errors, "User validation failed");
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            errors.to_string(),
        )
    })?;

    Ok(user)
}

/// Creates the user routes.
pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state)
}

#[tracing::instrument(skip_all)]
async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let user = validated(payload)?;

    tracing::info!(
        user_name = %user.name,
        user_email = %user.email,
        user_age = ?user.age,
        "Creating new user"
    );

    let created = state.user_store().create(user).map_err(|e| {
        tracing::error!(error = %e, "Error creating user");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            "Failed to create user",
        )
    })?;

    tracing::info!(
        user_id = created.id,
        user_name = %created.name,
        "User created successfully"
    );

    Ok(Json(created))
}

#[tracing::instrument(skip_all)]
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.user_store().list().map_err(|e| store_error(&e))?;

    tracing::info!(total_users = users.len(), "Fetching all users");

    Ok(Json(users))
}

#[tracing::instrument(skip_all)]
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    tracing::info!(user_id, "Fetching user details");

    let user = state.user_store().get(user_id).map_err(|e| {
        if matches!(e, UserStoreError::NotFound(_)) {
            tracing::warn!(user_id, "User not found");
        }
        store_error(&e)
    })?;

    tracing::info!(
        user_id,
        user_name = %user.name,
        "User retrieved successfully"
    );

    Ok(Json(user))
}

#[tracing::instrument(skip_all)]
async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let user = validated(payload)?;

    tracing::info!(
        user_id,
        new_name = %user.name,
        new_email = %user.email,
        "Updating user"
    );

    let updated = state.user_store().update(user_id, user).map_err(|e| {
        match &e {
            UserStoreError::NotFound(_) => tracing::warn!(user_id, "Cannot update - user not found"),
            UserStoreError::LockError => tracing::error!(user_id, error = %e, "Error updating user"),
        }
        store_error(&e)
    })?;

    tracing::info!(user_id, "User updated successfully");

    Ok(Json(updated))
}

#[tracing::instrument(skip_all)]
async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    tracing::info!(user_id, "Deleting user");

    state.user_store().delete(user_id).map_err(|e| {
        match &e {
            UserStoreError::NotFound(_) => tracing::warn!(user_id, "Cannot delete - user not found"),
            UserStoreError::LockError => tracing::error!(user_id, error = %e, "Error deleting user"),
        }
        store_error(&e)
    })?;

    tracing::info!(user_id, "User deleted successfully");

    Ok(Json(DeleteResponse {
        message: format!("User {user_id} deleted successfully"),
    }))
}
