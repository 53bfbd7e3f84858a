//! Comment handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::NewComment;
use quill_shared::ApiResponse;
use quill_shared::dto::{CreateCommentRequest, UpdateCommentRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list_post_comments(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.get_by_post_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comments)))
}

/// GET /api/comments/{id}
pub async fn get_comment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let comment = state.comments.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// POST /api/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let comment = state
        .comments
        .create(
            identity.user_id,
            NewComment {
                post_id: req.post_id,
                content: req.content,
                parent_id: req.parent_id,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment)))
}

/// PUT /api/comments/{id}
pub async fn update_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .update(path.into_inner(), identity.user_id, body.into_inner().content)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment)))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state
        .comments
        .delete(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("comment deleted")))
}
