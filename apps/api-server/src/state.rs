//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, PasswordService, PostRepository, TagRepository, TokenService,
    UserRepository,
};
use quill_core::{CommentService, PostService, TagService, UserService};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub tags: Arc<TagService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub tokens: Arc<dyn TokenService>,
    pub storage: &'static str,
}

/// The four repositories the services are built from.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            tags: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: quill_infra::database::DbConn) -> Self {
        use quill_infra::database::{
            PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
            PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            tags: Arc::new(PostgresTagRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db)),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let (repos, storage) = Self::repositories(config).await;

        tracing::info!(storage, "Application state initialized");
        Self::from_parts(repos, passwords, tokens, storage)
    }

    pub fn from_parts(
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
        storage: &'static str,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(
                repos.users.clone(),
                passwords,
                tokens.clone(),
            )),
            tags: Arc::new(TagService::new(repos.tags.clone())),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.users.clone(),
                repos.tags,
            )),
            comments: Arc::new(CommentService::new(
                repos.comments,
                repos.posts,
                repos.users,
            )),
            tokens,
            storage,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> (Repositories, &'static str) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return (Repositories::in_memory(), "memory");
        };

        match quill_infra::database::connect(db_config).await {
            Ok(db) => (Repositories::postgres(db), "postgres"),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (Repositories::in_memory(), "memory")
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(config: &AppConfig) -> (Repositories, &'static str) {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }
        tracing::info!("Running without postgres feature - using in-memory store");
        (Repositories::in_memory(), "memory")
    }
}
