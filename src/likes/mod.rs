pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryLikeStore;
pub use repo::{LikeStore, PgLikeStore};
pub use repo_types::LikeTarget;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
