use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use ulid::Ulid;

use labwatch_core::{User, UserId};

use crate::AppState;
use crate::password::{generate_salt, hash_password};
use crate::registry::UserStore;

use super::error::ApiError;
use super::models::{CreateUserRequest, DeletedResponse, UserResponse};
use super::parse_id;

/// GET /api/users
///
/// Account ids and usernames only; credential material stays server-side.
pub async fn list_users<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
) -> Result<Json<Vec<UserResponse>>, ApiError>
where
    C: Send + Sync,
    S: Send + Sync,
    L: Send + Sync,
    U: UserStore,
{
    let users = state
        .users
        .users()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let response = users
        .into_iter()
        .map(|u| UserResponse {
            id: u.id.0.to_string(),
            username: u.username.into_string(),
        })
        .collect();

    Ok(Json(response))
}

/// POST /api/users
pub async fn create_user<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Json(form): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Send + Sync,
    S: Send + Sync,
    L: Send + Sync,
    U: UserStore,
{
    let salt = generate_salt();
    let password_hash = hash_password(&form.password, &salt);

    let user = User {
        id: UserId(Ulid::new()),
        username: form.username.into_boxed_str(),
        salt,
        password_hash,
    };

    let response = UserResponse {
        id: user.id.0.to_string(),
        username: user.username.to_string(),
    };

    state
        .users
        .add(user)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/users/{id}
pub async fn delete_user<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError>
where
    C: Send + Sync,
    S: Send + Sync,
    L: Send + Sync,
    U: UserStore,
{
    let user_id = UserId(parse_id(&id)?);

    let deleted = state
        .users
        .remove(user_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(DeletedResponse {
        deleted: deleted as u64,
    }))
}
