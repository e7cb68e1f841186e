use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Token from `Authorization`, with or without a `Bearer ` prefix.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("missing token"));
    }
    Ok(token)
}

/// An authenticated request: verified, unexpired, not revoked, and owned by
/// an account that still exists.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let verified = state.jwt.verify(token).map_err(|e| {
            warn!(error = %e, "rejected session token");
            AppError::unauthorized("invalid or expired token")
        })?;

        if state.blacklist.is_blacklisted(token).await? {
            warn!(user_id = %verified.user_id, "revoked token presented");
            return Err(AppError::unauthorized("token has been revoked"));
        }

        // a deleted account takes every outstanding token with it
        if state.users.find_by_id(verified.user_id).await?.is_none() {
            warn!(user_id = %verified.user_id, "token for deleted account");
            return Err(AppError::unauthorized("account no longer exists"));
        }

        Ok(Session {
            user_id: verified.user_id,
            token: token.to_string(),
            expires_at: verified.expires_at,
        })
    }
}

/// Just the caller's id, for handlers that do not need the token itself.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(AuthUser(session.user_id))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, Request};

    use super::*;
    use crate::auth::services::{register, Registration};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    async fn session_for(state: &AppState, auth: Option<&str>) -> Result<Session, AppError> {
        let mut req = Request::builder().uri("/");
        if let Some(auth) = auth {
            req = req.header(AUTHORIZATION, auth);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        Session::from_request_parts(&mut parts, state).await
    }

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")).unwrap(), "abc");
        assert_eq!(bearer_token(&headers_with("abc")).unwrap(), "abc");
        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers_with("Bearer ")).is_err());
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_unauthorized() {
        let state = AppState::fake();
        assert!(matches!(
            session_for(&state, None).await,
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            session_for(&state, Some("Bearer nope")).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    async fn seed_user(state: &AppState) -> Uuid {
        register(
            state,
            Registration {
                username: "gatekeeper".into(),
                email: "gate@x.com".into(),
                password: "pw".into(),
                image: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn valid_token_yields_session() {
        let state = AppState::fake();
        let user_id = seed_user(&state).await;
        let token = state.jwt.issue(user_id).unwrap();

        let session = session_for(&state, Some(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.token, token);
    }

    #[tokio::test]
    async fn token_of_deleted_account_is_rejected() {
        let state = AppState::fake();
        let user_id = seed_user(&state).await;
        let token = state.jwt.issue(user_id).unwrap();
        assert!(state.users.delete(user_id).await.unwrap());

        assert!(state.jwt.verify(&token).is_ok());
        assert!(matches!(
            session_for(&state, Some(&token)).await,
            Err(AppError::Unauthorized(ref m)) if m == "account no longer exists"
        ));
    }

    #[tokio::test]
    async fn blacklisted_token_is_rejected_though_signature_is_valid() {
        let state = AppState::fake();
        let token = state.jwt.issue(Uuid::new_v4()).unwrap();
        let verified = state.jwt.verify(&token).unwrap();
        state.blacklist.add(&token, verified.expires_at).await.unwrap();

        // the codec alone still accepts it
        assert!(state.jwt.verify(&token).is_ok());
        assert!(matches!(
            session_for(&state, Some(&token)).await,
            Err(AppError::Unauthorized(ref m)) if m == "token has been revoked"
        ));
    }
}
