use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{User, UserChanges};
use crate::{
    auth::services::{checked_email, checked_username, normalize_email},
    error::{AppError, AppResult},
    media::remove_upload,
    state::AppState,
};

fn ensure_self(actor: Uuid, target: Uuid) -> AppResult<()> {
    if actor != target {
        warn!(%actor, %target, "user lifecycle action on someone else");
        return Err(AppError::forbidden("you can only manage your own account"));
    }
    Ok(())
}

pub async fn get_by_id(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("user"))
}

pub async fn get_by_username(state: &AppState, username: &str) -> AppResult<User> {
    state
        .users
        .find_by_username(username.trim())
        .await?
        .ok_or(AppError::NotFound("user"))
}

pub async fn get_by_email(state: &AppState, email: &str) -> AppResult<User> {
    state
        .users
        .find_by_email(&normalize_email(email))
        .await?
        .ok_or(AppError::NotFound("user"))
}

pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    username: Option<String>,
    email: Option<String>,
) -> AppResult<User> {
    let changes = UserChanges {
        username: username.as_deref().map(checked_username).transpose()?,
        email: email.as_deref().map(checked_email).transpose()?,
    };
    if changes.is_empty() {
        return Err(AppError::validation("nothing to update"));
    }
    let user = state
        .users
        .update_profile(user_id, &changes)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    info!(user_id = %user.id, "profile updated");
    Ok(user)
}

pub async fn suspend(state: &AppState, actor: Uuid, target: Uuid) -> AppResult<User> {
    ensure_self(actor, target)?;
    let user = state
        .users
        .suspend(target)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    info!(user_id = %user.id, "user suspended");
    Ok(user)
}

pub async fn request_deletion(state: &AppState, actor: Uuid, target: Uuid) -> AppResult<User> {
    ensure_self(actor, target)?;
    let user = state
        .users
        .request_deletion(target)
        .await?
        .ok_or(AppError::NotFound("user"))?;
    info!(user_id = %user.id, "deletion requested");
    Ok(user)
}

/// Hard delete. Posts, comments, likes and friendships go with the row.
pub async fn delete_user(state: &AppState, actor: Uuid, target: Uuid) -> AppResult<()> {
    ensure_self(actor, target)?;
    let user = get_by_id(state, target).await?;
    if !state.users.delete(target).await? {
        return Err(AppError::NotFound("user"));
    }
    if let Some(url) = &user.image_url {
        remove_upload(state, url).await;
    }
    info!(user_id = %target, "user deleted");
    Ok(())
}

/// Same effect as [`delete_user`]; kept as its own entry point for the
/// separate route.
pub async fn permanently_delete_user(state: &AppState, actor: Uuid, target: Uuid) -> AppResult<()> {
    delete_user(state, actor, target).await
}

pub async fn pending_deletion(state: &AppState) -> AppResult<Vec<User>> {
    Ok(state.users.pending_deletion().await?)
}
