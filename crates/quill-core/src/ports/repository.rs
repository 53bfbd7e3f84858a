use async_trait::async_trait;

use crate::domain::{
    Comment, NewCommentRecord, NewPostRecord, NewUserRecord, Pagination, Post, PostFilter, Tag,
    User,
};
use crate::error::RepoError;

/// Generic repository trait shared by every store.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` if nothing was deleted.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn create(&self, user: NewUserRecord) -> Result<User, RepoError>;

    async fn update(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Page of users in ascending id order.
    async fn list(&self, pagination: Pagination) -> Result<Vec<User>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, i64> {
    async fn create(&self, name: &str) -> Result<Tag, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError>;

    /// Tags whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, RepoError>;

    /// All tags ordered by name.
    async fn list(&self) -> Result<Vec<Tag>, RepoError>;
}

/// Post repository, including the post/tag join.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPostRecord) -> Result<Post, RepoError>;

    /// Persist title, content and status. Bumps `updated_at`.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Page of matching posts, newest first.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Number of posts matching the filter, ignoring pagination.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Atomically add one to the view counter.
    async fn increment_view_count(&self, id: i64) -> Result<(), RepoError>;

    async fn add_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), RepoError>;

    /// Remove every tag association of a post.
    async fn remove_tags(&self, post_id: i64) -> Result<(), RepoError>;

    async fn find_tags(&self, post_id: i64) -> Result<Vec<Tag>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, comment: NewCommentRecord) -> Result<Comment, RepoError>;

    /// Persist the content. Bumps `updated_at`.
    async fn update(&self, comment: Comment) -> Result<Comment, RepoError>;

    /// Comments on a post without a parent, newest first.
    async fn find_top_level_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError>;

    /// Direct replies to a comment, oldest first.
    async fn find_replies(&self, parent_id: i64) -> Result<Vec<Comment>, RepoError>;
}
