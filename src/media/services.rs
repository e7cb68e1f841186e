use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use time::{macros::format_description, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Public prefix under which stored media is served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

const MB: usize = 1024 * 1024;
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "wmv", "mkv", "webm"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    ProfileImage,
    PostImage,
    PostVideo,
    CommentImage,
}

impl MediaKind {
    fn dir(self) -> &'static str {
        match self {
            Self::ProfileImage => "imageProfile",
            Self::PostImage => "images/posts",
            Self::CommentImage => "images/posts/comments",
            Self::PostVideo => "videos",
        }
    }

    fn max_bytes(self) -> usize {
        match self {
            Self::PostVideo => 100 * MB,
            _ => 10 * MB,
        }
    }

    fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::PostVideo => VIDEO_EXTENSIONS,
            _ => IMAGE_EXTENSIONS,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::PostVideo => "video",
            _ => "image",
        }
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Checks size and extension; returns the normalized extension.
pub fn validate_upload(kind: MediaKind, file: &UploadedFile) -> AppResult<String> {
    if file.body.is_empty() {
        return Err(AppError::validation(format!("{} file is empty", kind.label())));
    }
    if file.body.len() > kind.max_bytes() {
        return Err(AppError::validation(format!(
            "{} exceeds {} MB",
            kind.label(),
            kind.max_bytes() / MB
        )));
    }
    match extension_of(&file.file_name) {
        Some(ext) if kind.allowed_extensions().contains(&ext.as_str()) => Ok(ext),
        _ => Err(AppError::validation(format!(
            "unsupported {} type, allowed: {}",
            kind.label(),
            kind.allowed_extensions().join(", ")
        ))),
    }
}

fn object_key(kind: MediaKind, ext: &str, now: OffsetDateTime) -> anyhow::Result<String> {
    let stamp = now
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .context("format upload timestamp")?;
    Ok(format!("{}/{}_{}.{}", kind.dir(), stamp, Uuid::new_v4(), ext))
}

/// Stores the file and returns its public URL path (`/uploads/...`).
pub async fn store_upload(
    state: &AppState,
    kind: MediaKind,
    file: UploadedFile,
) -> AppResult<String> {
    let ext = validate_upload(kind, &file)?;
    let key = object_key(kind, &ext, OffsetDateTime::now_utc())?;
    state
        .storage
        .put_object(&key, file.body)
        .await
        .with_context(|| format!("store upload {key}"))?;
    debug!(key = %key, "upload stored");
    Ok(format!("{PUBLIC_PREFIX}{key}"))
}

/// Best effort; a failure is logged and otherwise ignored.
pub async fn remove_upload(state: &AppState, url: &str) {
    let Some(key) = url.strip_prefix(PUBLIC_PREFIX) else {
        warn!(url = %url, "not a stored upload, skipping removal");
        return;
    };
    if let Err(e) = state.storage.delete_object(key).await {
        warn!(error = %e, key = %key, "failed to remove upload");
    }
}
