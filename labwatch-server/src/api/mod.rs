pub mod auth;
pub mod computers;
pub mod error;
pub mod logs;
pub mod models;
pub mod schedule;
pub mod users;

use std::path::Path;
use std::str::FromStr;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;
use ulid::Ulid;

use crate::AppState;
use crate::registry::{ComputerRegistry, MaintenanceLogStore, ScheduleStore, UserStore};

use error::ApiError;

/// Full HTTP surface: the JSON API under `/api` plus the static console
/// assets as a fallback.
///
/// Everything under `/api` except login, logout and the session check
/// requires a valid session cookie.
pub fn router<C, S, L, U>(state: AppState<C, S, L, U>, static_dir: &Path) -> Router
where
    C: ComputerRegistry + Clone,
    S: ScheduleStore + Clone,
    L: MaintenanceLogStore + Clone,
    U: UserStore + Clone,
{
    let sessions = state.sessions.clone();

    let protected = Router::new()
        .route(
            "/computers",
            get(computers::list_computers).post(computers::create_computer),
        )
        .route(
            "/computers/{id}",
            put(computers::update_computer).delete(computers::delete_computer),
        )
        .route("/logs", get(logs::list_logs).post(logs::create_log))
        .route(
            "/schedule",
            get(schedule::list_schedule).post(schedule::create_entry),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", delete(users::delete_user))
        .route_layer(middleware::from_fn_with_state(sessions, auth::require_auth));

    let api = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

pub(crate) fn parse_id(id: &str) -> Result<Ulid, ApiError> {
    Ulid::from_str(id)
        .map_err(|_| ApiError::InvalidId(format!("Invalid id format. Expected ULID: {id}")))
}
