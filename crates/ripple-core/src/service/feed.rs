//! Read-side composition: the personalized feed and the public listings.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Post, PostView, UserSummary};
use crate::error::DomainError;
use crate::pagination::PageRequest;
use crate::ports::{FollowRepository, LikeRepository, PostRepository};

/// Composes reverse-chronological, paginated post listings with author
/// summaries and live engagement counts. Counts are aggregated at read
/// time - there are no cached counters to drift out of sync.
#[derive(Clone)]
pub struct FeedComposer {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FeedComposer {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            posts,
            likes,
            follows,
        }
    }

    /// The viewer's feed: root posts authored by their followee set,
    /// newest first. An empty followee set yields an empty page.
    pub async fn feed(
        &self,
        viewer_id: Uuid,
        page: &PageRequest,
    ) -> Result<Vec<PostView>, DomainError> {
        let followees = self.follows.followee_ids(viewer_id).await?;
        if followees.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.posts.list_roots_by_authors(&followees, page).await?;
        self.augment(rows).await
    }

    /// Public listing of all root posts, newest first.
    pub async fn root_posts(&self, page: &PageRequest) -> Result<Vec<PostView>, DomainError> {
        let rows = self.posts.list_roots(page).await?;
        self.augment(rows).await
    }

    /// Replies to one post, newest first. A post id that matches nothing
    /// yields an empty page - a read that finds nothing is not a failure.
    pub async fn replies(
        &self,
        post_id: Uuid,
        page: &PageRequest,
    ) -> Result<Vec<PostView>, DomainError> {
        let rows = self.posts.list_replies(post_id, page).await?;
        self.augment(rows).await
    }

    async fn augment(
        &self,
        rows: Vec<(Post, UserSummary)>,
    ) -> Result<Vec<PostView>, DomainError> {
        let mut views = Vec::with_capacity(rows.len());
        for (post, author) in rows {
            let reply_count = self.posts.count_replies(post.id).await?;
            let like_count = self.likes.count_for_post(post.id).await?;
            views.push(PostView {
                post,
                author,
                reply_count,
                like_count,
            });
        }
        Ok(views)
    }
}
