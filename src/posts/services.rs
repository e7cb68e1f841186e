use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{NewPost, Post, PostChanges};
use crate::{
    error::{AppError, AppResult},
    media::{remove_upload, store_upload, MediaKind, UploadedFile},
    state::AppState,
};

pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub topic: String,
    pub image: Option<UploadedFile>,
    pub video: Option<UploadedFile>,
}

fn non_blank(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional_non_blank(field: &str, value: Option<String>) -> AppResult<Option<String>> {
    value.map(|v| non_blank(field, &v)).transpose()
}

async fn discard(state: &AppState, urls: Vec<Option<String>>) {
    for url in urls.into_iter().flatten() {
        remove_upload(state, &url).await;
    }
}

pub async fn create_post(state: &AppState, author_id: Uuid, draft: PostDraft) -> AppResult<Post> {
    let title = non_blank("title", &draft.title)?;
    let content = non_blank("content", &draft.content)?;
    let topic = non_blank("topic", &draft.topic)?;

    let image_url = match draft.image {
        Some(file) => Some(store_upload(state, MediaKind::PostImage, file).await?),
        None => None,
    };
    let video_url = match draft.video {
        Some(file) => match store_upload(state, MediaKind::PostVideo, file).await {
            Ok(url) => Some(url),
            Err(e) => {
                discard(state, vec![image_url]).await;
                return Err(e);
            }
        },
        None => None,
    };

    let created = state
        .posts
        .create(NewPost {
            author_id,
            title,
            content,
            topic,
            image_url: image_url.clone(),
            video_url: video_url.clone(),
        })
        .await;
    match created {
        Ok(post) => {
            info!(post_id = %post.id, author_id = %author_id, "post created");
            Ok(post)
        }
        Err(e) => {
            discard(state, vec![image_url, video_url]).await;
            Err(e.into())
        }
    }
}

pub async fn get_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("post"))
}

async fn owned_post(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<Post> {
    let post = get_post(state, id).await?;
    if post.author_id != actor {
        warn!(post_id = %id, %actor, "post change by non-author");
        return Err(AppError::forbidden("only the author can change this post"));
    }
    Ok(post)
}

pub async fn update_post(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    title: Option<String>,
    content: Option<String>,
    topic: Option<String>,
) -> AppResult<Post> {
    let changes = PostChanges {
        title: optional_non_blank("title", title)?,
        content: optional_non_blank("content", content)?,
        topic: optional_non_blank("topic", topic)?,
    };
    if changes.title.is_none() && changes.content.is_none() && changes.topic.is_none() {
        return Err(AppError::validation("nothing to update"));
    }
    owned_post(state, actor, id).await?;
    let post = state
        .posts
        .update(id, &changes)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    info!(post_id = %id, "post updated");
    Ok(post)
}

pub async fn delete_post(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<()> {
    let post = owned_post(state, actor, id).await?;
    if !state.posts.delete(id).await? {
        return Err(AppError::NotFound("post"));
    }
    discard(state, vec![post.image_url, post.video_url]).await;
    info!(post_id = %id, "post deleted");
    Ok(())
}

pub async fn list_by_author(
    state: &AppState,
    author_id: Uuid,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<Post>> {
    Ok(state.posts.list_by_author(author_id, limit, offset).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::{media::services::PUBLIC_PREFIX, storage::MemoryStorage};

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.into(),
            content: "body".into(),
            topic: "rust".into(),
            image: None,
            video: None,
        }
    }

    #[tokio::test]
    async fn create_trims_and_rejects_blank_fields() {
        let state = AppState::fake();
        let author = Uuid::new_v4();

        let post = create_post(&state, author, draft("  Hello ")).await.unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.author_id, author);

        assert!(matches!(
            create_post(&state, author, draft("   ")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn media_urls_are_recorded() {
        let state = AppState::fake();
        let mut d = draft("with media");
        d.image = Some(UploadedFile {
            file_name: "pic.png".into(),
            body: Bytes::from_static(b"png"),
        });
        d.video = Some(UploadedFile {
            file_name: "clip.mp4".into(),
            body: Bytes::from_static(b"mp4"),
        });
        let post = create_post(&state, Uuid::new_v4(), d).await.unwrap();
        assert!(post.image_url.unwrap().starts_with("/uploads/images/posts/"));
        assert!(post.video_url.unwrap().starts_with("/uploads/videos/"));
    }

    #[tokio::test]
    async fn bad_video_rejects_whole_post() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let mut d = draft("bad video");
        d.video = Some(UploadedFile {
            file_name: "clip.exe".into(),
            body: Bytes::from_static(b"x"),
        });
        assert!(matches!(
            create_post(&state, author, d).await,
            Err(AppError::Validation(_))
        ));
        assert!(list_by_author(&state, author, 10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn only_author_may_update_or_delete() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let post = create_post(&state, author, draft("mine")).await.unwrap();

        assert!(matches!(
            update_post(&state, stranger, post.id, Some("x".into()), None, None).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            delete_post(&state, stranger, post.id).await,
            Err(AppError::Forbidden(_))
        ));

        let updated = update_post(&state, author, post.id, None, None, Some("go".into()))
            .await
            .unwrap();
        assert_eq!(updated.topic, "go");
        assert_eq!(updated.title, "mine");

        delete_post(&state, author, post.id).await.unwrap();
        assert!(matches!(
            get_post(&state, post.id).await,
            Err(AppError::NotFound("post"))
        ));
    }

    #[tokio::test]
    async fn listing_is_per_author_and_paged() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        for i in 0..3 {
            create_post(&state, author, draft(&format!("p{i}"))).await.unwrap();
        }
        create_post(&state, Uuid::new_v4(), draft("other")).await.unwrap();

        assert_eq!(list_by_author(&state, author, 10, 0).await.unwrap().len(), 3);
        assert_eq!(list_by_author(&state, author, 2, 0).await.unwrap().len(), 2);
        assert_eq!(list_by_author(&state, author, 10, 2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_post_removes_its_media() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::fake().with_storage(storage.clone());
        let author = Uuid::new_v4();
        let mut d = draft("short lived");
        d.image = Some(UploadedFile {
            file_name: "pic.png".into(),
            body: Bytes::from_static(b"png"),
        });
        d.video = Some(UploadedFile {
            file_name: "clip.mp4".into(),
            body: Bytes::from_static(b"mp4"),
        });
        let post = create_post(&state, author, d).await.unwrap();
        let keys: Vec<String> = [&post.image_url, &post.video_url]
            .into_iter()
            .map(|u| u.as_deref().unwrap().strip_prefix(PUBLIC_PREFIX).unwrap().to_string())
            .collect();
        for key in &keys {
            assert!(storage.get(key).await.is_some());
        }

        delete_post(&state, author, post.id).await.unwrap();
        for key in &keys {
            assert!(storage.get(key).await.is_none());
        }
    }
}
