use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{PublicUser, UpdateProfileRequest},
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/users/pending-deletion", get(list_pending_deletion))
        .route("/users/username/:username", get(get_by_username))
        .route("/users/email/:email", get(get_by_email))
        .route("/users/:id", get(get_user).delete(delete_user))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", patch(update_me))
        .route("/users/:id/suspend", patch(suspend_user))
        .route("/users/:id/request-deletion", post(request_deletion))
        .route("/users/:id/permanently-delete", delete(permanently_delete_user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::get_by_id(&state, id).await?.into()))
}

#[instrument(skip(state))]
pub async fn get_by_username(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::get_by_username(&state, &username).await?.into()))
}

#[instrument(skip(state))]
pub async fn get_by_email(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(email): Path<String>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::get_by_email(&state, &email).await?.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = services::update_profile(&state, user_id, payload.username, payload.email).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn suspend_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::suspend(&state, caller, id).await?.into()))
}

#[instrument(skip(state))]
pub async fn request_deletion(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(services::request_deletion(&state, caller, id).await?.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_user(&state, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn permanently_delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::permanently_delete_user(&state, caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_pending_deletion(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = services::pending_deletion(&state).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
