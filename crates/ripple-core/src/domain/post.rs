use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;

/// Post entity. A post with a reply target is a reply; one without is a
/// root post. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(author_id: Uuid, content: String, reply_to_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            content,
            reply_to_id,
            created_at: Utc::now(),
        }
    }

    /// Root posts appear in feeds and listings; replies only under their parent.
    pub fn is_root(&self) -> bool {
        self.reply_to_id.is_none()
    }
}

/// A post joined with its author summary and live engagement counts,
/// as served by every listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author: UserSummary,
    pub reply_count: u64,
    pub like_count: u64,
}
