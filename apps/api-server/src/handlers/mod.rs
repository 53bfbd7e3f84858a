//! HTTP handlers and route configuration.

mod comments;
mod health;
mod posts;
mod tags;
mod users;

use actix_web::web;

use quill_core::domain::Paginated;
use quill_shared::{PageMeta, PaginatedResponse};

use crate::middleware::error::AppError;

/// Convert a service page into the wire envelope.
fn paginated<T>(page: Paginated<T>) -> PaginatedResponse<T> {
    PaginatedResponse {
        meta: PageMeta::new(page.total, page.page, page.per_page),
        items: page.items,
    }
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies, queries and paths get the same problem+json shape
    // as every other error.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::BadRequest(err.to_string()).into()),
    );

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/register", web::post().to(users::register))
            .route("/login", web::post().to(users::login))
            // Account
            .service(
                web::resource("/profile")
                    .route(web::get().to(users::get_profile))
                    .route(web::put().to(users::update_profile))
                    .route(web::delete().to(users::delete_profile)),
            )
            .route("/users", web::get().to(users::list_users))
            .route("/users/{id}", web::get().to(users::get_user))
            // Posts
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list_posts))
                    .route(web::post().to(posts::create_post)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::put().to(posts::update_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route(
                "/posts/{id}/comments",
                web::get().to(comments::list_post_comments),
            )
            // Comments
            .route("/comments", web::post().to(comments::create_comment))
            .service(
                web::resource("/comments/{id}")
                    .route(web::get().to(comments::get_comment))
                    .route(web::put().to(comments::update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            )
            // Tags
            .service(
                web::resource("/tags")
                    .route(web::get().to(tags::list_tags))
                    .route(web::post().to(tags::create_tag)),
            )
            .service(
                web::resource("/tags/{id}")
                    .route(web::get().to(tags::get_tag))
                    .route(web::delete().to(tags::delete_tag)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};
    use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use serde_json::{Value, json};

    use super::configure_routes;
    use crate::state::{AppState, Repositories};

    fn state() -> AppState {
        AppState::from_parts(
            Repositories::in_memory(),
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(JwtConfig {
                secret: "handler-test-secret".to_string(),
                expiration_hours: 1,
            })),
            "memory",
        )
    }

    fn bearer(token: &str) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    macro_rules! sign_up {
        ($app:expr, $name:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/register")
                .set_json(json!({
                    "username": $name,
                    "email": format!("{}@example.com", $name),
                    "password": "secret123"
                }))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);

            let req = test::TestRequest::post()
                .uri("/api/login")
                .set_json(json!({ "username": $name, "password": "secret123" }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&$app, req).await;
            body["data"]["access_token"]
                .as_str()
                .expect("token in login response")
                .to_string()
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }

    #[actix_web::test]
    async fn test_blog_flow() {
        let app = app!();
        let alice = sign_up!(app, "alice");

        // Profile
        let req = test::TestRequest::get()
            .uri("/api/profile")
            .insert_header(bearer(&alice))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["username"], "alice");
        assert!(body["data"].get("password_hash").is_none());

        // Tag and post
        let req = test::TestRequest::post()
            .uri("/api/tags")
            .insert_header(bearer(&alice))
            .set_json(json!({ "name": "rust" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let tag_id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&alice))
            .set_json(json!({
                "title": "Hello",
                "content": "World",
                "status": "published",
                "tag_ids": [tag_id]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let post_id = body["data"]["id"].as_i64().unwrap();
        assert_eq!(body["data"]["status"], "published");
        assert_eq!(body["data"]["tags"][0]["name"], "rust");

        // Viewing bumps the counter
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}?view=true"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["view_count"], 1);

        // Filtered listing
        let req = test::TestRequest::get()
            .uri(&format!("/api/posts?tag_id={tag_id}&keyword=hello"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["meta"]["total"], 1);
        assert_eq!(body["data"]["meta"]["page"], 1);
        assert_eq!(body["data"]["meta"]["per_page"], 10);

        // Someone else cannot edit it
        let bob = sign_up!(app, "bob");
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{post_id}"))
            .insert_header(bearer(&bob))
            .set_json(json!({ "title": "Mine now" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // But can comment on it
        let req = test::TestRequest::post()
            .uri("/api/comments")
            .insert_header(bearer(&bob))
            .set_json(json!({ "post_id": post_id, "content": "Nice post" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get()
            .uri(&format!("/api/posts/{post_id}/comments"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"][0]["author"]["username"], "bob");

        // Absent keeps the tags, null clears them
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{post_id}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "content": "World, again" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["tags"][0]["name"], "rust");

        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{post_id}"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "tag_ids": null }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["tags"], json!([]));
        assert_eq!(body["data"]["title"], "Hello");
    }

    #[actix_web::test]
    async fn test_write_without_token_is_unauthorized() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "title": "t", "content": "c" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .set_json(json!({ "title": "t", "content": "c" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_error_statuses() {
        let app = app!();
        let alice = sign_up!(app, "alice");

        let req = test::TestRequest::get().uri("/api/posts/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 404);

        let req = test::TestRequest::get()
            .uri("/api/posts?status=deleted")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": "alice", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/tags")
            .insert_header(bearer(&alice))
            .set_json(json!({ "name": "rust" }))
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/tags")
            .insert_header(bearer(&alice))
            .set_json(json!({ "name": "rust" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
