use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Statement, Value};

use crate::database::entity::{post, tag, user};
use crate::database::postgres_base::map_db_err;
use crate::database::postgres_repo::{
    PostgresPostRepository, PostgresUserRepository, contains_pattern, mask_email,
};
use quill_core::domain::{Pagination, Post, PostFilter, PostStatus, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

fn post_model(id: i64, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        user_id: 1,
        title: title.to_owned(),
        content: "Content".to_owned(),
        status: post::Status::Published,
        view_count: 3,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(42, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(42).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.id, 42);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.author_id, 1);
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.view_count, 3);
}

/// Every statement the mock connection received, in order.
fn executed(repo: PostgresPostRepository) -> Vec<Statement> {
    repo.db
        .into_transaction_log()
        .iter()
        .flat_map(|txn| txn.statements().to_vec())
        .collect()
}

#[tokio::test]
async fn test_list_far_page_binds_offset_in_signed_range() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let filter = PostFilter {
        pagination: Pagination::new(1_000_000_000_000_000_000, 10),
        ..Default::default()
    };
    let posts = repo.list(&filter).await.unwrap();
    assert!(posts.is_empty());

    let statements = executed(repo);
    let values = statements[0].values.as_ref().expect("bound values").0.clone();
    let offsets: Vec<u64> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::BigUnsigned(Some(n)) => Some(n),
            _ => None,
        })
        .collect();

    assert!(!offsets.is_empty());
    assert!(offsets.iter().all(|n| *n <= i64::MAX as u64));
}

#[tokio::test]
async fn test_keyword_wildcards_match_literally() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let filter = PostFilter {
        keyword: Some("100%_Off".to_owned()),
        ..Default::default()
    };
    repo.list(&filter).await.unwrap();

    let statements = executed(repo);
    let statement = &statements[0];
    assert!(statement.sql.contains("ESCAPE"));

    let values = &statement.values.as_ref().expect("bound values").0;
    assert!(values.contains(&Value::from(r"%100\%\_off%")));
    assert!(!values.contains(&Value::from("%100%_off%")));
}

#[test]
fn test_contains_pattern_escapes_metacharacters() {
    assert_eq!(contains_pattern("Rust"), "%rust%");
    assert_eq!(contains_pattern("50%"), r"%50\%%");
    assert_eq!(contains_pattern("snake_case"), r"%snake\_case%");
    assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
}

#[tokio::test]
async fn test_find_user_by_email_maps_model() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: 5,
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            avatar: None,
            bio: Some("hi".to_owned()),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user: User = repo
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .expect("user should be found");
    assert_eq!(user.id, 5);
    assert_eq!(user.username, "alice");
    assert_eq!(user.bio.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_find_tags_for_post() {
    let now = Utc::now();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            tag::Model {
                id: 2,
                name: "go".to_owned(),
                created_at: now.into(),
            },
            tag::Model {
                id: 1,
                name: "rust".to_owned(),
                created_at: now.into(),
            },
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let tags = repo.find_tags(42).await.unwrap();
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["go", "rust"]);
}

#[tokio::test]
async fn test_increment_view_count_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result = repo.increment_view_count(999).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_increment_view_count_existing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.increment_view_count(42).await.is_ok());
}

#[tokio::test]
async fn test_delete_missing_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let result = BaseRepository::<User, i64>::delete(&repo, 7).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_add_tags_with_no_ids_skips_insert() {
    // No exec results queued: any statement would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let repo = PostgresPostRepository::new(db);

    assert!(repo.add_tags(1, &[]).await.is_ok());
}

#[test]
fn test_map_db_err() {
    assert!(matches!(
        map_db_err(DbErr::RecordNotUpdated),
        RepoError::NotFound
    ));
    assert!(matches!(
        map_db_err(DbErr::Custom("boom".into())),
        RepoError::Query(_)
    ));
    assert!(matches!(
        map_db_err(DbErr::RecordNotFound("post".into())),
        RepoError::NotFound
    ));
}

#[test]
fn test_mask_email() {
    assert_eq!(mask_email("alice@example.com"), "a***@example.com");
    assert_eq!(mask_email("a@example.com"), "***@example.com");
    assert_eq!(mask_email("not-an-email"), "***");
}
