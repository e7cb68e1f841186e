use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{Comment, NewComment};
use crate::{
    error::{AppError, AppResult},
    media::{remove_upload, store_upload, MediaKind, UploadedFile},
    posts::services::get_post,
    state::AppState,
};

fn checked_content(content: &str) -> AppResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("content must not be empty"));
    }
    Ok(content.to_string())
}

pub async fn create_comment(
    state: &AppState,
    author_id: Uuid,
    post_id: Uuid,
    content: &str,
    image: Option<UploadedFile>,
) -> AppResult<Comment> {
    let content = checked_content(content)?;
    get_post(state, post_id).await?;

    let image_url = match image {
        Some(file) => Some(store_upload(state, MediaKind::CommentImage, file).await?),
        None => None,
    };
    let created = state
        .comments
        .create(NewComment {
            post_id,
            author_id,
            content,
            image_url: image_url.clone(),
        })
        .await;
    match created {
        Ok(comment) => {
            info!(comment_id = %comment.id, post_id = %post_id, "comment created");
            Ok(comment)
        }
        Err(e) => {
            if let Some(url) = &image_url {
                remove_upload(state, url).await;
            }
            Err(e.into())
        }
    }
}

pub async fn get_comment(state: &AppState, id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("comment"))
}

pub async fn list_for_post(state: &AppState, post_id: Uuid) -> AppResult<Vec<Comment>> {
    get_post(state, post_id).await?;
    Ok(state.comments.list_for_post(post_id).await?)
}

async fn owned_comment(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<Comment> {
    let comment = get_comment(state, id).await?;
    if comment.author_id != actor {
        warn!(comment_id = %id, %actor, "comment change by non-author");
        return Err(AppError::forbidden("only the author can change this comment"));
    }
    Ok(comment)
}

pub async fn update_comment(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    content: &str,
) -> AppResult<Comment> {
    let content = checked_content(content)?;
    owned_comment(state, actor, id).await?;
    let comment = state
        .comments
        .update_content(id, &content)
        .await?
        .ok_or(AppError::NotFound("comment"))?;
    info!(comment_id = %id, "comment updated");
    Ok(comment)
}

pub async fn delete_comment(state: &AppState, actor: Uuid, id: Uuid) -> AppResult<()> {
    let comment = owned_comment(state, actor, id).await?;
    if !state.comments.delete(id).await? {
        return Err(AppError::NotFound("comment"));
    }
    if let Some(url) = &comment.image_url {
        remove_upload(state, url).await;
    }
    info!(comment_id = %id, "comment deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::services::{create_post, PostDraft};

    async fn seed_post(state: &AppState, author: Uuid) -> Uuid {
        create_post(
            state,
            author,
            PostDraft {
                title: "t".into(),
                content: "c".into(),
                topic: "x".into(),
                image: None,
                video: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let state = AppState::fake();
        assert!(matches!(
            create_comment(&state, Uuid::new_v4(), Uuid::new_v4(), "hi", None).await,
            Err(AppError::NotFound("post"))
        ));
    }

    #[tokio::test]
    async fn comments_list_oldest_first() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let post_id = seed_post(&state, author).await;

        create_comment(&state, author, post_id, "first", None).await.unwrap();
        create_comment(&state, author, post_id, "second", None).await.unwrap();

        let listed = list_for_post(&state, post_id).await.unwrap();
        let contents: Vec<&str> = listed.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn only_author_may_edit_or_delete() {
        let state = AppState::fake();
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        let post_id = seed_post(&state, author).await;
        let comment = create_comment(&state, other, post_id, "nice", None)
            .await
            .unwrap();

        assert!(matches!(
            update_comment(&state, author, comment.id, "edited").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            update_comment(&state, other, comment.id, "  ").await,
            Err(AppError::Validation(_))
        ));
        let edited = update_comment(&state, other, comment.id, "edited").await.unwrap();
        assert_eq!(edited.content, "edited");

        delete_comment(&state, other, comment.id).await.unwrap();
        assert!(matches!(
            get_comment(&state, comment.id).await,
            Err(AppError::NotFound("comment"))
        ));
    }
}
