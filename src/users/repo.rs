use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserChanges};
use crate::db::StoreResult;

const USER_COLUMNS: &str = "id, username, email, password_hash, image_url, is_active, \
    is_pending_deletion, deletion_requested_at, is_email_verified, email_confirm_token, \
    created_at, updated_at";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> StoreResult<User>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn update_profile(&self, id: Uuid, changes: &UserChanges) -> StoreResult<Option<User>>;
    async fn suspend(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn request_deletion(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// Marks the owner of `token` verified and clears the token.
    async fn confirm_email(&self, token: &str) -> StoreResult<Option<User>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
    async fn pending_deletion(&self) -> StoreResult<Vec<User>>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, image_url, email_confirm_token)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.image_url)
            .bind(&new.email_confirm_token)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.fetch_one_where("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.fetch_one_where("username", username).await
    }

    async fn update_profile(&self, id: Uuid, changes: &UserChanges) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn suspend(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn request_deletion(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET is_pending_deletion = TRUE,
                deletion_requested_at = COALESCE(deletion_requested_at, now()),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn confirm_email(&self, token: &str) -> StoreResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET is_email_verified = TRUE,
                email_confirm_token = NULL,
                updated_at = now()
            WHERE email_confirm_token = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected() > 0)
    }

    async fn pending_deletion(&self) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_pending_deletion ORDER BY deletion_requested_at ASC"
        );
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.db).await?;
        Ok(users)
    }
}
