use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserPublic;

/// Comment entity. `parent_id` is set for replies; replies go one level deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Input for creating a comment or a reply.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
    pub parent_id: Option<i64>,
}

/// Row handed to the store on insert.
#[derive(Debug, Clone)]
pub struct NewCommentRecord {
    pub author_id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
}

/// Comment as returned to callers, with its author and direct replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: UserPublic,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

impl CommentView {
    pub fn new(comment: Comment, author: UserPublic, replies: Vec<Comment>) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            author,
            replies,
        }
    }
}
