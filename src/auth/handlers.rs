use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ConfirmEmailQuery, LoginRequest, MessageResponse, RegisterRequest, TokenResponse},
    extractors::Session,
    services::{self, Registration},
};
use crate::{
    error::{AppError, AppResult},
    media::MultipartForm,
    state::AppState,
    users::dto::PublicUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users/logout", post(logout))
        .route("/confirm-email", get(confirm_email))
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

async fn read_registration(state: &AppState, req: Request) -> AppResult<Registration> {
    if is_multipart(&req) {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        let mut form = MultipartForm::read(multipart).await?;
        return Ok(Registration {
            username: form.required_text("username")?,
            email: form.required_text("email")?,
            password: form.text("password").unwrap_or_default().to_string(),
            image: form.take_file("image"),
        });
    }

    let Json(body) = Json::<RegisterRequest>::from_request(req, state)
        .await
        .map_err(|e| AppError::validation(e.body_text()))?;
    Ok(Registration {
        username: body.username,
        email: body.email,
        password: body.password,
        image: None,
    })
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    req: Request,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let registration = read_registration(&state, req).await?;
    let user = services::register(&state, registration).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = services::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip_all, fields(user_id = %session.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<MessageResponse>> {
    services::logout(&state, &session).await?;
    Ok(Json(MessageResponse::new("logged out")))
}

#[instrument(skip_all)]
pub async fn confirm_email(
    State(state): State<AppState>,
    Query(query): Query<ConfirmEmailQuery>,
) -> AppResult<Json<MessageResponse>> {
    services::confirm_email(&state, &query.token).await?;
    Ok(Json(MessageResponse::new("email confirmed")))
}
