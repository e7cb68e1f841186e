use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    repo::UserStore,
    repo_types::{NewUser, User, UserChanges},
};
use crate::db::{StoreError, StoreResult};

/// Enforces the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

fn check_unique(
    users: &HashMap<Uuid, User>,
    skip: Option<Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> StoreResult<()> {
    for other in users.values().filter(|u| Some(u.id) != skip) {
        if username == Some(other.username.as_str()) {
            return Err(StoreError::Duplicate("username"));
        }
        if email == Some(other.email.as_str()) {
            return Err(StoreError::Duplicate("email"));
        }
    }
    Ok(())
}

impl MemoryUserStore {
    async fn modify(&self, id: Uuid, f: impl FnOnce(&mut User)) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            f(user);
            user.updated_at = OffsetDateTime::now_utc();
            user.clone()
        }))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        check_unique(&users, None, Some(&new.username), Some(&new.email))?;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            image_url: new.image_url,
            is_active: true,
            is_pending_deletion: false,
            deletion_requested_at: None,
            is_email_verified: false,
            email_confirm_token: Some(new.email_confirm_token),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn update_profile(&self, id: Uuid, changes: &UserChanges) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        check_unique(
            &users,
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        )?;
        Ok(users.get_mut(&id).map(|user| {
            if let Some(username) = &changes.username {
                user.username = username.clone();
            }
            if let Some(email) = &changes.email {
                user.email = email.clone();
            }
            user.updated_at = OffsetDateTime::now_utc();
            user.clone()
        }))
    }

    async fn suspend(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.modify(id, |user| user.is_active = false).await
    }

    async fn request_deletion(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.modify(id, |user| {
            user.is_pending_deletion = true;
            user.deletion_requested_at
                .get_or_insert_with(OffsetDateTime::now_utc);
        })
        .await
    }

    async fn confirm_email(&self, token: &str) -> StoreResult<Option<User>> {
        let id = {
            let users = self.users.read().await;
            users
                .values()
                .find(|u| u.email_confirm_token.as_deref() == Some(token))
                .map(|u| u.id)
        };
        let Some(id) = id else {
            return Ok(None);
        };
        self.modify(id, |user| {
            user.is_email_verified = true;
            user.email_confirm_token = None;
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn pending_deletion(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut pending: Vec<User> = users
            .values()
            .filter(|u| u.is_pending_deletion)
            .cloned()
            .collect();
        pending.sort_by_key(|u| u.deletion_requested_at);
        Ok(pending)
    }
}
