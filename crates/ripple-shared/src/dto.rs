//! Data Transfer Objects - request/response types for the API.
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user's public identity as returned by register/login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Registration/login result: the user plus a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Request to create a post. `replyToId` makes it a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub reply_to_id: Option<Uuid>,
}

/// Author attribution embedded in post payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

/// A post with author attribution and live engagement counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
    pub reply_count: u64,
    pub like_count: u64,
}

/// Public profile with counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub posts: u64,
    pub followers: u64,
    pub following: u64,
}

/// Like toggle outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeToggleResponse {
    pub success: bool,
    pub liked: bool,
}

/// Follow toggle outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowToggleResponse {
    pub success: bool,
    pub following: bool,
}
