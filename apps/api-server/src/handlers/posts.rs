//! Post handlers: creation, public listing, replies, and the like toggle.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use ripple_shared::dto::{CreatePostRequest, LikeToggleResponse};

use crate::handlers::{ListQuery, post_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts - Protected route
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let view = state
        .posts
        .create_post(identity.user_id, req.content, req.reply_to_id)
        .await?;

    Ok(HttpResponse::Created().json(post_response(view)))
}

/// GET /api/posts - root posts only, newest first
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page_request();
    let views = state.feed.root_posts(&page).await?;

    Ok(HttpResponse::Ok().json(views.into_iter().map(post_response).collect::<Vec<_>>()))
}

/// GET /api/posts/{post_id}/replies
pub async fn list_replies(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let page = query.page_request();
    let views = state.feed.replies(post_id, &page).await?;

    Ok(HttpResponse::Ok().json(views.into_iter().map(post_response).collect::<Vec<_>>()))
}

/// POST /api/posts/{post_id}/like - Protected route, toggles
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .toggles
        .toggle_like(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(LikeToggleResponse {
        success: true,
        liked: outcome.liked,
    }))
}
