use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{Pagination, UpdatePostRequest},
    repo_types::Post,
    services::{self, PostDraft},
};
use crate::{auth::AuthUser, error::AppResult, media::MultipartForm, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts/user/:user_id", get(list_user_posts))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/posts/create", post(create_post))
}

#[instrument(skip(state, multipart))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Post>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let draft = PostDraft {
        title: form.required_text("title")?,
        content: form.required_text("content")?,
        topic: form.required_text("topic")?,
        image: form.take_file("image"),
        video: form.take_file("video"),
    };
    let post = services::create_post(&state, user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Post>> {
    Ok(Json(services::get_post(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    let post = services::update_post(
        &state,
        user_id,
        id,
        payload.title,
        payload.content,
        payload.topic,
    )
    .await?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_post(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_user_posts(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<Uuid>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Post>>> {
    let (limit, offset) = page.clamped();
    Ok(Json(
        services::list_by_author(&state, user_id, limit, offset).await?,
    ))
}
