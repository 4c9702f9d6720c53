//! Post creation.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Post, PostView, UserSummary};
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post, optionally as a reply. Content must be non-empty
    /// after trimming, and a reply target must exist at write time.
    /// Creation is not idempotent: a retry after a timeout may produce a
    /// duplicate post, which is accepted at-most-once-effort behavior.
    pub async fn create_post(
        &self,
        author_id: Uuid,
        content: String,
        reply_to_id: Option<Uuid>,
    ) -> Result<PostView, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::Validation(
                "post content must not be empty".into(),
            ));
        }

        if let Some(target) = reply_to_id {
            if !self.posts.exists(target).await? {
                return Err(DomainError::ReplyTargetMissing(target));
            }
        }

        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "user",
                id: author_id,
            })?;

        let post = self
            .posts
            .insert(Post::new(author_id, content, reply_to_id))
            .await?;

        tracing::debug!(post_id = %post.id, author = %author.username, reply = post.reply_to_id.is_some(), "post created");

        Ok(PostView {
            post,
            author: UserSummary {
                id: author.id,
                username: author.username,
            },
            reply_count: 0,
            like_count: 0,
        })
    }
}
