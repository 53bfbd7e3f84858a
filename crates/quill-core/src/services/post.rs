//! Post lifecycle, tag association, view counting and filtered listing.

use std::sync::Arc;

use crate::domain::{
    NewPost, NewPostRecord, Paginated, Patch, Post, PostFilter, PostUpdate, PostView,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, TagRepository, UserRepository};

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    tags: Arc<dyn TagRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        tags: Arc<dyn TagRepository>,
    ) -> Self {
        Self { posts, users, tags }
    }

    /// Create a post for `author_id`. Status defaults to draft.
    ///
    /// Every tag id must exist; this is checked before anything is written.
    pub async fn create(&self, author_id: i64, input: NewPost) -> Result<PostView, DomainError> {
        super::require_non_blank("title", &input.title)?;
        super::require_non_blank("content", &input.content)?;

        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(DomainError::not_found("user", author_id));
        }
        self.ensure_tags_exist(&input.tag_ids).await?;

        let post = self
            .posts
            .create(NewPostRecord {
                author_id,
                title: input.title,
                content: input.content,
                status: input.status.unwrap_or_default(),
            })
            .await?;

        if !input.tag_ids.is_empty() {
            self.posts.add_tags(post.id, &input.tag_ids).await?;
        }

        tracing::info!(post_id = post.id, author_id, "Post created");
        self.assemble(post).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<PostView, DomainError> {
        let post = self.find(id).await?;
        self.assemble(post).await
    }

    /// Apply a partial update. Only the author may do this.
    pub async fn update(
        &self,
        id: i64,
        caller_id: i64,
        input: PostUpdate,
    ) -> Result<PostView, DomainError> {
        let mut post = self.find_owned(id, caller_id, "update").await?;

        if let Some(title) = input.title {
            super::require_non_blank("title", &title)?;
            post.title = title;
        }
        if let Some(content) = input.content {
            super::require_non_blank("content", &content)?;
            post.content = content;
        }
        if let Some(status) = input.status {
            post.status = status;
        }

        let replacement_tags = match input.tag_ids {
            Patch::Absent => None,
            Patch::Null => Some(Vec::new()),
            Patch::Value(ids) => Some(ids),
        };
        if let Some(ids) = &replacement_tags {
            self.ensure_tags_exist(ids).await?;
        }

        let post = self.posts.update(post).await?;

        if let Some(ids) = replacement_tags {
            self.posts.remove_tags(post.id).await?;
            if !ids.is_empty() {
                self.posts.add_tags(post.id, &ids).await?;
            }
        }

        self.assemble(post).await
    }

    /// Delete a post. Only the author may do this.
    pub async fn delete(&self, id: i64, caller_id: i64) -> Result<(), DomainError> {
        self.find_owned(id, caller_id, "delete").await?;
        self.posts
            .delete(id)
            .await
            .map_err(|e| super::delete_error(e, "post", id))?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    /// Filtered, paginated listing, newest first. `total` ignores pagination.
    pub async fn list(&self, filter: PostFilter) -> Result<Paginated<PostView>, DomainError> {
        let posts = self.posts.list(&filter).await?;
        let total = self.posts.count(&filter).await?;

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            items.push(self.assemble(post).await?);
        }

        Ok(Paginated::new(items, total, filter.pagination))
    }

    /// Add one view. Not gated by ownership; callers treat failure as non-fatal.
    pub async fn increment_view_count(&self, id: i64) -> Result<(), DomainError> {
        self.posts
            .increment_view_count(id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("post", id),
                other => other.into(),
            })
    }

    async fn find(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))
    }

    async fn find_owned(
        &self,
        id: i64,
        caller_id: i64,
        action: &str,
    ) -> Result<Post, DomainError> {
        let post = self.find(id).await?;
        if post.author_id != caller_id {
            tracing::debug!(post_id = id, caller_id, action, "Ownership check failed");
            return Err(DomainError::permission_denied(format!(
                "you don't have permission to {action} this post"
            )));
        }
        Ok(post)
    }

    async fn ensure_tags_exist(&self, tag_ids: &[i64]) -> Result<(), DomainError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let found = self.tags.find_by_ids(tag_ids).await?;
        match tag_ids.iter().find(|id| !found.iter().any(|t| t.id == **id)) {
            Some(missing) => Err(DomainError::not_found("tag", *missing)),
            None => Ok(()),
        }
    }

    async fn assemble(&self, post: Post) -> Result<PostView, DomainError> {
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", post.author_id))?;
        let tags = self.posts.find_tags(post.id).await?;
        Ok(PostView::new(post, author.into(), tags))
    }
}
