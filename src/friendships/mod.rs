pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryFriendshipStore;
pub use repo::{FriendshipStore, PgFriendshipStore};
pub use repo_types::{Friendship, FriendshipStatus};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
