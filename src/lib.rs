pub mod app;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod friendships;
pub mod likes;
pub mod media;
pub mod posts;
pub mod state;
pub mod storage;
pub mod users;
