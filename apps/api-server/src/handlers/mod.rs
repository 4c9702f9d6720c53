//! HTTP handlers and route configuration.

mod auth;
mod feed;
mod health;
mod posts;
mod users;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use ripple_core::domain::PostView;
use ripple_core::pagination::PageRequest;
use ripple_shared::dto::{AuthorResponse, PostResponse};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/posts", web::get().to(posts::list_posts))
            .route("/posts/{post_id}/replies", web::get().to(posts::list_replies))
            .route("/users/{user_id}", web::get().to(users::profile))
            // Authenticated routes
            .route("/posts", web::post().to(posts::create_post))
            .route("/posts/{post_id}/like", web::post().to(posts::toggle_like))
            .route("/users/{user_id}/follow", web::post().to(users::toggle_follow))
            .route("/feed", web::get().to(feed::feed)),
    );
}

/// Catch-all for unknown routes. Responds 200 with a hint instead of a
/// bare 404 - part of the public contract.
pub async fn fallback() -> HttpResponse {
    HttpResponse::Ok().body("Nothing lives at this address. Check the path and try again.")
}

/// Raw pagination query values. Parsed leniently: junk falls back to the
/// defaults instead of failing the request.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Flatten a core post view into the wire shape.
pub(crate) fn post_response(view: PostView) -> PostResponse {
    PostResponse {
        id: view.post.id,
        content: view.post.content,
        author_id: view.post.author_id,
        reply_to_id: view.post.reply_to_id,
        created_at: view.post.created_at,
        author: AuthorResponse {
            id: view.author.id,
            username: view.author.username,
        },
        reply_count: view.reply_count,
        like_count: view.like_count,
    }
}
