use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::password::verify_password;
use crate::registry::UserStore;
use crate::session::{SESSION_COOKIE, SessionStore};

use super::error::ApiError;
use super::models::{LoginRequest, OkResponse, SessionResponse, UserResponse};

/// POST /api/login
///
/// Verifies the credentials, opens a session and hands the token back
/// in an `HttpOnly` cookie.
pub async fn login<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Json(form): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: Send + Sync,
    S: Send + Sync,
    L: Send + Sync,
    U: UserStore,
{
    let user = state
        .users
        .find_by_username(&form.username)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    if !verify_password(&form.password, &user.salt, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = state.sessions.create(user.id, &user.username).await;
    let cookie = format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(OkResponse { success: true }),
    ))
}

/// POST /api/logout
pub async fn logout<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    C: Send + Sync,
    S: Send + Sync,
    L: Send + Sync,
    U: Send + Sync,
{
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }

    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    (
        [(header::SET_COOKIE, cookie)],
        Json(OkResponse { success: true }),
    )
}

/// GET /api/session
pub async fn session<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError>
where
    C: Send + Sync,
    S: Send + Sync,
    L: Send + Sync,
    U: Send + Sync,
{
    let token = session_token(&headers).ok_or(ApiError::Unauthorized("Not logged in"))?;
    let session = state
        .sessions
        .get(&token)
        .await
        .ok_or(ApiError::Unauthorized("Not logged in"))?;

    Ok(Json(SessionResponse {
        user: UserResponse {
            id: session.user_id.0.to_string(),
            username: session.username.into_string(),
        },
    }))
}

/// Gate for the protected routes: rejects requests without a live
/// session cookie before they reach a handler.
pub async fn require_auth(
    State(sessions): State<SessionStore>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        session_token(request.headers()).ok_or(ApiError::Unauthorized("Unauthorized"))?;
    if sessions.get(&token).await.is_none() {
        return Err(ApiError::Unauthorized("Unauthorized"));
    }

    Ok(next.run(request).await)
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_owned())
    })
}
