use tracing::info;
use uuid::Uuid;

use super::repo_types::{Like, LikeTarget};
use crate::{
    comments::services::get_comment,
    error::{AppError, AppResult},
    posts::services::get_post,
    state::AppState,
};

async fn ensure_target_exists(state: &AppState, target: LikeTarget) -> AppResult<()> {
    match target {
        LikeTarget::Post(id) => get_post(state, id).await.map(|_| ()),
        LikeTarget::Comment(id) => get_comment(state, id).await.map(|_| ()),
    }
}

pub async fn like(state: &AppState, user_id: Uuid, target: LikeTarget) -> AppResult<Like> {
    ensure_target_exists(state, target).await?;
    let like = state.likes.create(user_id, target).await?;
    info!(user_id = %user_id, ?target, "liked");
    Ok(like)
}

pub async fn unlike(state: &AppState, user_id: Uuid, target: LikeTarget) -> AppResult<()> {
    if !state.likes.delete(user_id, target).await? {
        return Err(AppError::NotFound("like"));
    }
    info!(user_id = %user_id, ?target, "unliked");
    Ok(())
}

pub async fn count(state: &AppState, target: LikeTarget) -> AppResult<i64> {
    ensure_target_exists(state, target).await?;
    Ok(state.likes.count(target).await?)
}
