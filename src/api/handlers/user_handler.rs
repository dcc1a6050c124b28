//! User handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{NewUser, User};
use crate::errors::AppResult;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user))
}

/// Register a new user and return it as persisted
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewUser>,
) -> AppResult<Json<User>> {
    let user = state.user_service.create_user(payload).await?;
    Ok(Json(user))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}
