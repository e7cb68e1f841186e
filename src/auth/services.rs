use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use tracing::{info, warn};

use super::{
    extractors::Session,
    password::{hash_password, verify_password},
};
use crate::{
    email::services::send_confirmation,
    error::{AppError, AppResult},
    media::{remove_upload, store_upload, MediaKind, UploadedFile},
    state::AppState,
    users::repo_types::{NewUser, User},
};

const CONFIRM_TOKEN_LEN: usize = 48;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles");
    static ref USERNAME_RE: Regex =
        Regex::new(r"^[A-Za-z0-9_.]{3,32}$").expect("username regex compiles");
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalized email, or a validation error.
pub(crate) fn checked_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("invalid email"));
    }
    Ok(email)
}

/// Trimmed username, or a validation error.
pub(crate) fn checked_username(raw: &str) -> AppResult<String> {
    let username = raw.trim();
    if !is_valid_username(username) {
        return Err(AppError::validation(
            "username must be 3-32 characters of letters, digits, '_' or '.'",
        ));
    }
    Ok(username.to_string())
}

fn confirmation_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CONFIRM_TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image: Option<UploadedFile>,
}

pub async fn register(state: &AppState, reg: Registration) -> AppResult<User> {
    let username = checked_username(&reg.username)?;
    let email = checked_email(&reg.email)?;
    if reg.password.is_empty() {
        return Err(AppError::validation("password is required"));
    }

    if state.users.find_by_username(&username).await?.is_some() {
        warn!(username = %username, "username already taken");
        return Err(AppError::Conflict("username already exists".into()));
    }
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("email already exists".into()));
    }

    let password_hash = hash_password(&reg.password)?;
    let image_url = match reg.image {
        Some(file) => Some(store_upload(state, MediaKind::ProfileImage, file).await?),
        None => None,
    };

    let token = confirmation_token();
    let created = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            image_url: image_url.clone(),
            email_confirm_token: token.clone(),
        })
        .await;
    let user = match created {
        Ok(user) => user,
        Err(e) => {
            if let Some(url) = &image_url {
                remove_upload(state, url).await;
            }
            return Err(e.into());
        }
    };

    info!(user_id = %user.id, username = %user.username, "user registered");
    send_confirmation(state, &user.email, &token).await;
    Ok(user)
}

/// Returns a fresh session token for valid credentials.
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<String> {
    let email = normalize_email(email);
    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }
    if !user.is_active {
        warn!(user_id = %user.id, "login on suspended account");
        return Err(AppError::forbidden("account is suspended"));
    }

    let token = state.jwt.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Revokes the presented token for the rest of its lifetime.
pub async fn logout(state: &AppState, session: &Session) -> AppResult<()> {
    state
        .blacklist
        .add(&session.token, session.expires_at)
        .await?;
    info!(user_id = %session.user_id, "user logged out");
    Ok(())
}

pub async fn confirm_email(state: &AppState, token: &str) -> AppResult<User> {
    let user = state
        .users
        .confirm_email(token)
        .await?
        .ok_or(AppError::NotFound("confirmation token"))?;
    info!(user_id = %user.id, "email confirmed");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::EmailJob;

    fn alice() -> Registration {
        Registration {
            username: "alice".into(),
            email: "Alice@X.com ".into(),
            password: "pw123".into(),
            image: None,
        }
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("a.b_c9"));
        assert!(!is_valid_username("al"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(33)));
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("alice@x.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@x"));
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");
    }

    #[tokio::test]
    async fn register_hashes_password_and_queues_confirmation() {
        let (state, queue) = AppState::fake_with_queue();
        let user = register(&state, alice()).await.unwrap();

        assert_eq!(user.email, "alice@x.com");
        assert!(user.is_active);
        assert!(!user.is_email_verified);
        assert_ne!(user.password_hash, "pw123");
        assert!(verify_password("pw123", &user.password_hash).unwrap());

        let raw = queue.try_next().await.expect("confirmation queued");
        let job: EmailJob = serde_json::from_slice(&raw).unwrap();
        assert_eq!(job.to, "alice@x.com");
        let token = user.email_confirm_token.unwrap();
        assert!(job.body.contains(&format!("/confirm-email?token={token}")));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict_and_creates_nothing() {
        let state = AppState::fake();
        register(&state, alice()).await.unwrap();

        let mut again = alice();
        again.email = "other@x.com".into();
        let err = register(&state, again).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(state.users.find_by_email("other@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn registration_survives_a_dead_queue() {
        let (state, queue) = AppState::fake_with_queue();
        queue.close().await;
        assert!(register(&state, alice()).await.is_ok());
    }

    #[tokio::test]
    async fn login_checks_password_and_suspension() {
        let state = AppState::fake();
        let user = register(&state, alice()).await.unwrap();

        let token = login(&state, "alice@x.com", "pw123").await.unwrap();
        assert_eq!(state.jwt.verify(&token).unwrap().user_id, user.id);

        assert!(matches!(
            login(&state, "alice@x.com", "wrong").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, "nobody@x.com", "pw123").await,
            Err(AppError::InvalidCredentials)
        ));

        state.users.suspend(user.id).await.unwrap();
        assert!(matches!(
            login(&state, "alice@x.com", "pw123").await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn confirm_email_consumes_token() {
        let state = AppState::fake();
        let user = register(&state, alice()).await.unwrap();
        let token = user.email_confirm_token.unwrap();

        let confirmed = confirm_email(&state, &token).await.unwrap();
        assert!(confirmed.is_email_verified);
        assert!(matches!(
            confirm_email(&state, &token).await,
            Err(AppError::NotFound(_))
        ));
    }
}
