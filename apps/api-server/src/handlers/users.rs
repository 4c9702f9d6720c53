//! User handlers: public profile and the follow toggle.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use ripple_shared::dto::{FollowToggleResponse, ProfileResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/users/{user_id}/follow - Protected route, toggles
pub async fn toggle_follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .toggles
        .toggle_follow(identity.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(FollowToggleResponse {
        success: true,
        following: outcome.following,
    }))
}

/// GET /api/users/{user_id}
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let profile = state.profiles.profile(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: profile.id,
        username: profile.username,
        created_at: profile.created_at,
        posts: profile.posts,
        followers: profile.followers,
        following: profile.following,
    }))
}
