use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::{
    repo_types::{Like, LikeTarget},
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

#[derive(Debug, Serialize)]
pub struct LikeCount {
    pub count: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts/likes/:id", post(like_post).delete(unlike_post))
        .route("/posts/likes/:id/count", get(count_post_likes))
        .route("/comments/likes/:id", post(like_comment).delete(unlike_comment))
        .route("/comments/likes/:id/count", get(count_comment_likes))
}

#[instrument(skip(state))]
pub async fn like_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<Like>)> {
    let like = services::like(&state, user_id, LikeTarget::Post(id)).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

#[instrument(skip(state))]
pub async fn unlike_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::unlike(&state, user_id, LikeTarget::Post(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn count_post_likes(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LikeCount>> {
    let count = services::count(&state, LikeTarget::Post(id)).await?;
    Ok(Json(LikeCount { count }))
}

#[instrument(skip(state))]
pub async fn like_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<Like>)> {
    let like = services::like(&state, user_id, LikeTarget::Comment(id)).await?;
    Ok((StatusCode::CREATED, Json(like)))
}

#[instrument(skip(state))]
pub async fn unlike_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::unlike(&state, user_id, LikeTarget::Comment(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn count_comment_likes(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LikeCount>> {
    let count = services::count(&state, LikeTarget::Comment(id)).await?;
    Ok(Json(LikeCount { count }))
}
