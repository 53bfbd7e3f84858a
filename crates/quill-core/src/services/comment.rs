//! Comment threads: top-level comments with one level of replies.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Comment, CommentView, NewComment, NewCommentRecord, UserPublic};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository, UserRepository};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            comments,
            posts,
            users,
        }
    }

    /// Create a comment, or a reply when `parent_id` is set.
    ///
    /// The parent must be a top-level comment on the same post.
    pub async fn create(
        &self,
        author_id: i64,
        input: NewComment,
    ) -> Result<CommentView, DomainError> {
        super::require_non_blank("content", &input.content)?;

        if self.posts.find_by_id(input.post_id).await?.is_none() {
            return Err(DomainError::not_found("post", input.post_id));
        }

        if let Some(parent_id) = input.parent_id {
            let parent = self.find(parent_id).await?;
            if parent.post_id != input.post_id {
                return Err(DomainError::validation(
                    "parent comment does not belong to the specified post",
                ));
            }
            if parent.is_reply() {
                return Err(DomainError::validation("cannot reply to a reply"));
            }
        }

        let author = self.author(author_id).await?;
        let comment = self
            .comments
            .create(NewCommentRecord {
                author_id,
                post_id: input.post_id,
                parent_id: input.parent_id,
                content: input.content,
            })
            .await?;

        tracing::debug!(comment_id = comment.id, post_id = comment.post_id, "Comment created");
        Ok(CommentView::new(comment, author, Vec::new()))
    }

    /// A comment with its author and direct replies.
    pub async fn get_by_id(&self, id: i64) -> Result<CommentView, DomainError> {
        let comment = self.find(id).await?;
        self.assemble(comment).await
    }

    pub async fn update(
        &self,
        id: i64,
        caller_id: i64,
        content: String,
    ) -> Result<CommentView, DomainError> {
        super::require_non_blank("content", &content)?;

        let mut comment = self.find_owned(id, caller_id, "update").await?;
        comment.content = content;
        let comment = self.comments.update(comment).await?;
        self.assemble(comment).await
    }

    pub async fn delete(&self, id: i64, caller_id: i64) -> Result<(), DomainError> {
        self.find_owned(id, caller_id, "delete").await?;
        self.comments
            .delete(id)
            .await
            .map_err(|e| super::delete_error(e, "comment", id))
    }

    /// Top-level comments of a post, newest first, each with its replies
    /// oldest first.
    pub async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<CommentView>, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("post", post_id));
        }

        let top_level = self.comments.find_top_level_by_post(post_id).await?;
        let mut authors: HashMap<i64, UserPublic> = HashMap::new();
        let mut views = Vec::with_capacity(top_level.len());

        for comment in top_level {
            let author = match authors.get(&comment.author_id) {
                Some(author) => author.clone(),
                None => {
                    let author = self.author(comment.author_id).await?;
                    authors.insert(comment.author_id, author.clone());
                    author
                }
            };
            let replies = self.comments.find_replies(comment.id).await?;
            views.push(CommentView::new(comment, author, replies));
        }

        Ok(views)
    }

    async fn find(&self, id: i64) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id))
    }

    async fn find_owned(
        &self,
        id: i64,
        caller_id: i64,
        action: &str,
    ) -> Result<Comment, DomainError> {
        let comment = self.find(id).await?;
        if comment.author_id != caller_id {
            return Err(DomainError::permission_denied(format!(
                "you don't have permission to {action} this comment"
            )));
        }
        Ok(comment)
    }

    async fn author(&self, id: i64) -> Result<UserPublic, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    async fn assemble(&self, comment: Comment) -> Result<CommentView, DomainError> {
        let author = self.author(comment.author_id).await?;
        let replies = self.comments.find_replies(comment.id).await?;
        Ok(CommentView::new(comment, author, replies))
    }
}
