use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Exactly one of `post_id` / `comment_id` is set.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Like {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl LikeTarget {
    pub fn post_id(self) -> Option<Uuid> {
        match self {
            Self::Post(id) => Some(id),
            Self::Comment(_) => None,
        }
    }

    pub fn comment_id(self) -> Option<Uuid> {
        match self {
            Self::Comment(id) => Some(id),
            Self::Post(_) => None,
        }
    }
}
