//! Profile reads: user summary plus live engagement counts.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Profile;
use crate::error::DomainError;
use crate::ports::{FollowRepository, PostRepository, UserRepository};

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            follows,
        }
    }

    /// Public profile for a user, counting posts (roots and replies),
    /// followers, and followees at read time.
    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "user",
                id: user_id,
            })?;

        let posts = self.posts.count_by_author(user_id).await?;
        let followers = self.follows.count_followers(user_id).await?;
        let following = self.follows.count_following(user_id).await?;

        Ok(Profile {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
            posts,
            followers,
            following,
        })
    }
}
