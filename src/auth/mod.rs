use crate::state::AppState;
use axum::Router;

pub mod blacklist;
mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod services;

pub use blacklist::{MemoryTokenBlacklist, PgTokenBlacklist, TokenBlacklist};
pub use extractors::{AuthUser, Session};
pub use jwt::{JwtKeys, TokenError, VerifiedToken};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
