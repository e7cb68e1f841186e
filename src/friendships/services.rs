use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{Friendship, FriendshipStatus};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

fn invalid_transition(from: FriendshipStatus, to: FriendshipStatus) -> AppError {
    AppError::InvalidTransition(format!("cannot move friendship from {from} to {to}"))
}

pub async fn send_request(
    state: &AppState,
    requester_id: Uuid,
    addressee_id: Uuid,
) -> AppResult<Friendship> {
    if requester_id == addressee_id {
        return Err(AppError::validation("cannot send a friend request to yourself"));
    }
    if state.users.find_by_id(addressee_id).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }
    if let Some(existing) = state
        .friendships
        .find_between(requester_id, addressee_id)
        .await?
    {
        warn!(friendship_id = %existing.id, status = %existing.status, "friendship already exists");
        return Err(AppError::Conflict("friendship already exists".into()));
    }

    let friendship = state
        .friendships
        .create(requester_id, addressee_id)
        .await?;
    info!(friendship_id = %friendship.id, %requester_id, %addressee_id, "friend request sent");
    Ok(friendship)
}

async fn respond(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    to: FriendshipStatus,
) -> AppResult<Friendship> {
    let current = state
        .friendships
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("friendship"))?;
    if current.addressee_id != actor {
        return Err(AppError::forbidden(
            "only the addressee can respond to a friend request",
        ));
    }
    if !current.status.can_transition_to(to) {
        return Err(invalid_transition(current.status, to));
    }

    // only one of several concurrent responses can still match `pending`
    let updated = state
        .friendships
        .transition(id, FriendshipStatus::Pending, to)
        .await?;
    match updated {
        Some(friendship) => {
            info!(friendship_id = %id, status = %to, "friend request answered");
            Ok(friendship)
        }
        None => {
            let now = state
                .friendships
                .find_by_id(id)
                .await?
                .ok_or(AppError::NotFound("friendship"))?;
            Err(invalid_transition(now.status, to))
        }
    }
}

pub async fn accept(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<Friendship> {
    respond(state, actor, id, FriendshipStatus::Accepted).await
}

pub async fn decline(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<Friendship> {
    respond(state, actor, id, FriendshipStatus::Declined).await
}

pub async fn friends(state: &AppState, user_id: Uuid) -> AppResult<Vec<Friendship>> {
    Ok(state.friendships.friends_of(user_id).await?)
}

pub async fn pending(state: &AppState, user_id: Uuid) -> AppResult<Vec<Friendship>> {
    Ok(state.friendships.pending_for(user_id).await?)
}
