pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryCommentStore;
pub use repo::{CommentStore, PgCommentStore};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
