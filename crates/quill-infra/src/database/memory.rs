//! In-memory store implementing every repository port.
//!
//! Used when no database is configured and as the backing store for service
//! tests. It mirrors the relational schema: unique usernames, emails and tag
//! names, foreign keys on every reference, and cascading deletes.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::domain::{
    Comment, NewCommentRecord, NewPostRecord, NewUserRecord, Pagination, Post, PostFilter, Tag,
    User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    tags: BTreeMap<i64, Tag>,
    posts: BTreeMap<i64, Post>,
    /// (post_id, tag_id)
    post_tags: BTreeSet<(i64, i64)>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_tag_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn page<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

impl Tables {
    /// Remove every comment matching `doomed`, then every reply whose parent
    /// was removed, until nothing is left dangling.
    fn purge_comments(&mut self, doomed: impl Fn(&Comment) -> bool) {
        let mut removed: BTreeSet<i64> = self
            .comments
            .values()
            .filter(|c| doomed(c))
            .map(|c| c.id)
            .collect();

        loop {
            let orphans: Vec<i64> = self
                .comments
                .values()
                .filter(|c| !removed.contains(&c.id))
                .filter(|c| c.parent_id.is_some_and(|p| removed.contains(&p)))
                .map(|c| c.id)
                .collect();
            if orphans.is_empty() {
                break;
            }
            removed.extend(orphans);
        }

        self.comments.retain(|id, _| !removed.contains(id));
    }

    fn purge_posts(&mut self, doomed: &BTreeSet<i64>) {
        self.posts.retain(|id, _| !doomed.contains(id));
        self.post_tags.retain(|(post_id, _)| !doomed.contains(post_id));
        self.purge_comments(|c| doomed.contains(&c.post_id));
    }

    fn matching_posts(&self, filter: &PostFilter) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| filter.matches(p))
            .filter(|p| {
                filter
                    .tag_id
                    .is_none_or(|tag_id| self.post_tags.contains(&(p.id, tag_id)))
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        posts
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: BTreeSet<i64> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        tables.purge_comments(|c| c.author_id == id);
        tables.purge_posts(&owned);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, record: NewUserRecord) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == record.username) {
            return Err(RepoError::Unique("users.username must be unique".into()));
        }
        if tables.users.values().any(|u| u.email == record.email) {
            return Err(RepoError::Unique("users.email must be unique".into()));
        }

        let now = Utc::now();
        let user = User {
            id: next_id(&mut tables.last_user_id),
            username: record.username,
            email: record.email,
            password_hash: record.password_hash,
            avatar: record.avatar,
            bio: record.bio,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepoError::Unique("users.email must be unique".into()));
        }

        let stored = tables.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        stored.email = user.email;
        stored.avatar = user.avatar;
        stored.bio = user.bio;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, pagination: Pagination) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(page(tables.users.values().cloned().collect(), pagination))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl BaseRepository<Tag, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.remove(&id).ok_or(RepoError::NotFound)?;
        tables.post_tags.retain(|(_, tag_id)| *tag_id != id);
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn create(&self, name: &str) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.tags.values().any(|t| t.name == name) {
            return Err(RepoError::Unique("tags.name must be unique".into()));
        }

        let tag = Tag {
            id: next_id(&mut tables.last_tag_id),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.name == name).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables
            .tags
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list(&self) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tags)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.purge_posts(&BTreeSet::from([id]));
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, record: NewPostRecord) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&record.author_id) {
            return Err(RepoError::ForeignKey(format!(
                "posts.user_id references missing user {}",
                record.author_id
            )));
        }

        let now = Utc::now();
        let post = Post {
            id: next_id(&mut tables.last_post_id),
            title: record.title,
            content: record.content,
            author_id: record.author_id,
            status: record.status,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        stored.title = post.title;
        stored.content = post.content;
        stored.status = post.status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(page(tables.matching_posts(filter), filter.pagination))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_posts(filter).len() as u64)
    }

    async fn increment_view_count(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.view_count += 1;
        Ok(())
    }

    async fn add_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            return Err(RepoError::ForeignKey(format!(
                "post_tags.post_id references missing post {post_id}"
            )));
        }
        if let Some(missing) = tag_ids.iter().find(|id| !tables.tags.contains_key(*id)) {
            return Err(RepoError::ForeignKey(format!(
                "post_tags.tag_id references missing tag {missing}"
            )));
        }

        tables
            .post_tags
            .extend(tag_ids.iter().map(|tag_id| (post_id, *tag_id)));
        Ok(())
    }

    async fn remove_tags(&self, post_id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.post_tags.retain(|(p, _)| *p != post_id);
        Ok(())
    }

    async fn find_tags(&self, post_id: i64) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables
            .post_tags
            .range((post_id, i64::MIN)..=(post_id, i64::MAX))
            .filter_map(|(_, tag_id)| tables.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        tables.purge_comments(|c| c.id == id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, record: NewCommentRecord) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&record.author_id) {
            return Err(RepoError::ForeignKey(format!(
                "comments.user_id references missing user {}",
                record.author_id
            )));
        }
        if !tables.posts.contains_key(&record.post_id) {
            return Err(RepoError::ForeignKey(format!(
                "comments.post_id references missing post {}",
                record.post_id
            )));
        }
        if let Some(parent_id) = record.parent_id.filter(|id| !tables.comments.contains_key(id)) {
            return Err(RepoError::ForeignKey(format!(
                "comments.parent_id references missing comment {parent_id}"
            )));
        }

        let now = Utc::now();
        let comment = Comment {
            id: next_id(&mut tables.last_comment_id),
            content: record.content,
            author_id: record.author_id,
            post_id: record.post_id,
            parent_id: record.parent_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .comments
            .get_mut(&comment.id)
            .ok_or(RepoError::NotFound)?;
        stored.content = comment.content;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn find_top_level_by_post(&self, post_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.parent_id.is_none())
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }

    async fn find_replies(&self, parent_id: i64) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::PostStatus;

    async fn seed_user(store: &InMemoryStore, name: &str) -> User {
        UserRepository::create(
            store,
            NewUserRecord {
                username: name.to_owned(),
                email: format!("{name}@example.com"),
                password_hash: "hash".to_owned(),
                avatar: None,
                bio: None,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_post(store: &InMemoryStore, author_id: i64) -> Post {
        PostRepository::create(
            store,
            NewPostRecord {
                author_id,
                title: "Title".to_owned(),
                content: "Body".to_owned(),
                status: PostStatus::Draft,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_constraint_violation() {
        let store = InMemoryStore::new();
        seed_user(&store, "alice").await;

        let result = UserRepository::create(
            &store,
            NewUserRecord {
                username: "alice".to_owned(),
                email: "other@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                avatar: None,
                bio: None,
            },
        )
        .await;

        assert!(matches!(result, Err(RepoError::Unique(_))));
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let store = InMemoryStore::new();
        let result = PostRepository::create(
            &store,
            NewPostRecord {
                author_id: 99,
                title: "t".to_owned(),
                content: "c".to_owned(),
                status: PostStatus::Draft,
            },
        )
        .await;

        assert!(matches!(result, Err(RepoError::ForeignKey(_))));
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        let post = seed_post(&store, alice.id).await;
        let tag = TagRepository::create(&store, "rust").await.unwrap();
        store.add_tags(post.id, &[tag.id]).await.unwrap();

        let top = CommentRepository::create(
            &store,
            NewCommentRecord {
                author_id: bob.id,
                post_id: post.id,
                parent_id: None,
                content: "nice".to_owned(),
            },
        )
        .await
        .unwrap();
        let reply = CommentRepository::create(
            &store,
            NewCommentRecord {
                author_id: alice.id,
                post_id: post.id,
                parent_id: Some(top.id),
                content: "thanks".to_owned(),
            },
        )
        .await
        .unwrap();

        BaseRepository::<User, i64>::delete(&store, alice.id)
            .await
            .unwrap();

        let post_after = BaseRepository::<Post, i64>::find_by_id(&store, post.id)
            .await
            .unwrap();
        let top_after = BaseRepository::<Comment, i64>::find_by_id(&store, top.id)
            .await
            .unwrap();
        let reply_after = BaseRepository::<Comment, i64>::find_by_id(&store, reply.id)
            .await
            .unwrap();
        assert!(post_after.is_none());
        assert!(top_after.is_none());
        assert!(reply_after.is_none());
        assert!(store.find_tags(post.id).await.unwrap().is_empty());

        let tag_after = BaseRepository::<Tag, i64>::find_by_id(&store, tag.id)
            .await
            .unwrap();
        assert!(tag_after.is_some());
    }

    #[tokio::test]
    async fn test_deleting_comment_removes_replies() {
        let store = InMemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let post = seed_post(&store, alice.id).await;
        let top = CommentRepository::create(
            &store,
            NewCommentRecord {
                author_id: alice.id,
                post_id: post.id,
                parent_id: None,
                content: "first".to_owned(),
            },
        )
        .await
        .unwrap();
        CommentRepository::create(
            &store,
            NewCommentRecord {
                author_id: alice.id,
                post_id: post.id,
                parent_id: Some(top.id),
                content: "reply".to_owned(),
            },
        )
        .await
        .unwrap();

        BaseRepository::<Comment, i64>::delete(&store, top.id)
            .await
            .unwrap();

        assert!(store.find_replies(top.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_rows_is_not_found() {
        let store = InMemoryStore::new();

        assert!(matches!(
            BaseRepository::<Post, i64>::delete(&store, 1).await,
            Err(RepoError::NotFound)
        ));
        assert!(matches!(
            BaseRepository::<Tag, i64>::delete(&store, 1).await,
            Err(RepoError::NotFound)
        ));
    }
}
