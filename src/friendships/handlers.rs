use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::{repo_types::Friendship, services};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

#[derive(Debug, Deserialize)]
pub struct FriendRequest {
    pub addressee_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/friendship/send", post(send_request))
        .route("/friendship/accept/:id", post(accept))
        .route("/friendship/decline/:id", post(decline))
        .route("/friendship/friends", get(list_friends))
        .route("/friendship/pending", get(list_pending))
}

#[instrument(skip(state))]
pub async fn send_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<FriendRequest>,
) -> AppResult<(StatusCode, Json<Friendship>)> {
    let friendship = services::send_request(&state, user_id, payload.addressee_id).await?;
    Ok((StatusCode::CREATED, Json(friendship)))
}

#[instrument(skip(state))]
pub async fn accept(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(services::accept(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn decline(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Friendship>> {
    Ok(Json(services::decline(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn list_friends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Friendship>>> {
    Ok(Json(services::friends(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn list_pending(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Friendship>>> {
    Ok(Json(services::pending(&state, user_id).await?))
}
