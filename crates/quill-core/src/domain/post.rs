use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Pagination, Patch, Tag, UserPublic};
use crate::error::DomainError;

/// Publication state of a post. Any state may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            other => Err(DomainError::validation(format!(
                "unknown post status '{other}'"
            ))),
        }
    }
}

/// Post entity - a blog article owned by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub status: PostStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post. `tag_ids` is expected to be a set.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub status: Option<PostStatus>,
    pub tag_ids: Vec<i64>,
}

/// Row handed to the store on insert.
#[derive(Debug, Clone)]
pub struct NewPostRecord {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
}

/// Partial post update.
///
/// `tag_ids` replaces the whole association set when present; `Null` and an
/// empty list both clear it.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub tag_ids: Patch<Vec<i64>>,
}

/// Listing filter. Every predicate is optional and they combine with AND.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author_id: Option<i64>,
    pub status: Option<PostStatus>,
    pub tag_id: Option<i64>,
    pub keyword: Option<String>,
    pub pagination: Pagination,
}

impl PostFilter {
    /// Keyword with surrounding whitespace removed, `None` when blank.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Evaluate the column predicates (author, status, keyword) against a post.
    /// Tag membership needs the join table and is left to the store.
    pub fn matches(&self, post: &Post) -> bool {
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.status.is_some_and(|s| s != post.status) {
            return false;
        }
        if let Some(keyword) = self.keyword() {
            let needle = keyword.to_lowercase();
            return post.title.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle);
        }
        true
    }
}

/// Post as returned to callers: author and tags resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: UserPublic,
    pub tags: Vec<Tag>,
}

impl PostView {
    pub fn new(post: Post, author: UserPublic, tags: Vec<Tag>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            status: post.status,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author_id: i64, title: &str, content: &str, status: PostStatus) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            title: title.to_string(),
            content: content.to_string(),
            author_id,
            status,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("published".parse::<PostStatus>().unwrap(), PostStatus::Published);
        assert!("Published".parse::<PostStatus>().is_err());
        assert_eq!(PostStatus::default(), PostStatus::Draft);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&PostStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = PostFilter::default();
        assert!(filter.matches(&post(1, "a", "b", PostStatus::Draft)));
    }

    #[test]
    fn test_keyword_is_case_insensitive_over_title_or_content() {
        let filter = PostFilter {
            keyword: Some("RUST".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&post(1, "Learning rust", "", PostStatus::Draft)));
        assert!(filter.matches(&post(1, "Notes", "why Rust?", PostStatus::Draft)));
        assert!(!filter.matches(&post(1, "Notes", "go", PostStatus::Draft)));
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let filter = PostFilter {
            author_id: Some(2),
            status: Some(PostStatus::Published),
            ..Default::default()
        };
        assert!(filter.matches(&post(2, "t", "c", PostStatus::Published)));
        assert!(!filter.matches(&post(2, "t", "c", PostStatus::Draft)));
        assert!(!filter.matches(&post(3, "t", "c", PostStatus::Published)));
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let filter = PostFilter {
            keyword: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.keyword(), None);
        assert!(filter.matches(&post(1, "x", "y", PostStatus::Draft)));
    }
}
