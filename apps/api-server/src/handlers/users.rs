//! Account handlers: registration, login, profile and user lookup.

use actix_web::{HttpResponse, web};

use quill_core::domain::{NewUser, Pagination, UserUpdate};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    AuthResponse, LoginRequest, PageQuery, RegisterRequest, UpdateProfileRequest,
};

use super::paginated;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .register(NewUser {
            username: req.username,
            email: req.email,
            password: req.password,
            avatar: req.avatar,
            bio: req.bio,
        })
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(user).with_message("registration successful")))
}

/// POST /api/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let (token, user) = state.users.login(&req.username, &req.password).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(AuthResponse::bearer(
        token,
        state.tokens.ttl_seconds(),
        user,
    ))))
}

/// GET /api/profile
pub async fn get_profile(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state.users.get_by_id(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// PUT /api/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .update(
            identity.user_id,
            UserUpdate {
                email: req.email,
                avatar: req.avatar.into(),
                bio: req.bio.into(),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// DELETE /api/profile
pub async fn delete_profile(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.users.delete(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("account deleted")))
}

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user = state.users.get_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(user)))
}

/// GET /api/users
pub async fn list_users(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let pagination = Pagination::from_query(query.page, query.per_page);
    let page = state.users.list(pagination).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(paginated(page))))
}
