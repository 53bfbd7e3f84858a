//! Post handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{NewPost, Pagination, PostFilter, PostStatus, PostUpdate};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreatePostRequest, PostQuery, UpdatePostRequest, ViewQuery};

use super::paginated;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn parse_status(raw: Option<&str>) -> AppResult<Option<PostStatus>> {
    Ok(raw.map(str::parse::<PostStatus>).transpose()?)
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let filter = PostFilter {
        author_id: query.user_id,
        status: parse_status(query.status.as_deref())?,
        tag_id: query.tag_id,
        keyword: query.keyword,
        pagination: Pagination::from_query(query.page, query.per_page),
    };

    let page = state.posts.list(filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(paginated(page))))
}

/// GET /api/posts/{id}
///
/// With `?view=true` the view counter is bumped first. A failed bump is
/// logged and does not fail the read.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<ViewQuery>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    if query.view {
        if let Err(e) = state.posts.increment_view_count(id).await {
            tracing::warn!(post_id = id, error = %e, "Failed to record post view");
        }
    }

    let post = state.posts.get_by_id(id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .create(
            identity.user_id,
            NewPost {
                title: req.title,
                content: req.content,
                status: parse_status(req.status.as_deref())?,
                tag_ids: req.tag_ids.into(),
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .posts
        .update(
            path.into_inner(),
            identity.user_id,
            PostUpdate {
                title: req.title,
                content: req.content,
                status: parse_status(req.status.as_deref())?,
                tag_ids: req.tag_ids.into(),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("post deleted")))
}
