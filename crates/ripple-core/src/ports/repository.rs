use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Follow, Like, Post, User, UserSummary};
use crate::error::RepoError;
use crate::pagination::PageRequest;

/// User store. Email and username uniqueness is enforced by the store
/// itself; `insert` reports a race lost to a concurrent registration as
/// `RepoError::Constraint`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Pre-registration duplicate check; the unique indexes remain the
    /// backstop for races this lookup cannot see.
    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepoError>;
}

/// Post store. Listing methods return posts joined with their author
/// summary, ordered by `created_at` descending with `id` descending as
/// the tiebreak so pagination stays deterministic when timestamps collide.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Root posts (no reply target), newest first.
    async fn list_roots(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError>;

    /// Root posts authored by any of `authors`, newest first.
    async fn list_roots_by_authors(
        &self,
        authors: &[Uuid],
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError>;

    /// Replies to a given post, newest first. An unknown `post_id` yields
    /// an empty list, not an error.
    async fn list_replies(
        &self,
        post_id: Uuid,
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError>;

    async fn count_replies(&self, post_id: Uuid) -> Result<u64, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Like store: presence of the (post, user) pair is the entire state.
/// A duplicate `insert` reports `RepoError::Constraint`; `delete` reports
/// whether a row actually existed.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    async fn insert(&self, like: Like) -> Result<(), RepoError>;

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

/// Follow store: directed (follower, followee) edges with the same
/// insert/delete contract as likes.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn insert(&self, follow: Follow) -> Result<(), RepoError>;

    async fn delete(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError>;

    async fn exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError>;

    /// Everyone `follower_id` follows. Unbounded; the follow set is not
    /// paginated at the target scale.
    async fn followee_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn count_followers(&self, user_id: Uuid) -> Result<u64, RepoError>;

    async fn count_following(&self, user_id: Uuid) -> Result<u64, RepoError>;
}
