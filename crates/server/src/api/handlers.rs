use super::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use routemcp_core::{DescribeSchema, FieldDescriptor, FieldKind, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl DescribeSchema for ListUsersQuery {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("ListUsersQuery")
            .field(
                FieldDescriptor::new("page", FieldKind::optional(FieldKind::Integer))
                    .annotate("minimum=1,description=Page number"),
            )
            .field(
                FieldDescriptor::new("limit", FieldKind::optional(FieldKind::Integer))
                    .annotate("minimum=1,maximum=100"),
            )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn ping() -> &'static str {
    "pong"
}

/// List users, one page at a time
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListUsersQuery>,
) -> Json<ListUsersResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let users = state
        .list_users()
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Json(ListUsersResponse { users, page })
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .get_user(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", id)))
}

/// Create a user. A wrapping `{"body": {...}}` object is accepted as well.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let payload = match payload.get("body") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => payload,
    };
    let request: CreateUserRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("Invalid user: {}", e)))?;

    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }

    let user = state.create_user(request.name, request.email);
    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    match state.delete_user(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::not_found(format!("User not found: {}", id))),
    }
}
