//! Personalized feed handler.

use actix_web::{HttpResponse, web};

use crate::handlers::{ListQuery, post_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/feed - Protected route
///
/// Root posts from the viewer's followee set, newest first.
pub async fn feed(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page_request();
    let views = state.feed.feed(identity.user_id, &page).await?;

    Ok(HttpResponse::Ok().json(views.into_iter().map(post_response).collect::<Vec<_>>()))
}
