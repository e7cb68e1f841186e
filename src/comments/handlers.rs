use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::{repo_types::Comment, services};
use crate::{auth::AuthUser, error::AppResult, media::MultipartForm, state::AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/:id/comments",
            get(list_post_comments).post(create_comment),
        )
        .route(
            "/posts/comments/:comment_id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}

#[instrument(skip(state, multipart))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(post_id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let content = form.required_text("content")?;
    let image = form.take_file("image");
    let comment = services::create_comment(&state, user_id, post_id, &content, image).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[instrument(skip(state))]
pub async fn list_post_comments(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(services::list_for_post(&state, post_id).await?))
}

#[instrument(skip(state))]
pub async fn get_comment(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(comment_id): Path<Uuid>,
) -> AppResult<Json<Comment>> {
    Ok(Json(services::get_comment(&state, comment_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> AppResult<Json<Comment>> {
    let comment = services::update_comment(&state, user_id, comment_id, &payload.content).await?;
    Ok(Json(comment))
}

#[instrument(skip(state))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_comment(&state, user_id, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
