//! Idempotent-flip operations for likes and follows.
//!
//! A toggle checks for the unique relationship row and flips it: present
//! means delete, absent means insert. The check-then-act window is closed
//! by the store's uniqueness constraint, not by in-process locks - requests
//! may be served by independent processes. A constraint violation on insert
//! or a miss on delete therefore means a concurrent toggle got there first,
//! and the pair already sits in the state this call was driving toward.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Follow, FollowToggle, Like, LikeToggle};
use crate::error::{DomainError, RepoError};
use crate::ports::{FollowRepository, LikeRepository};

#[derive(Clone)]
pub struct ToggleEngine {
    likes: Arc<dyn LikeRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl ToggleEngine {
    pub fn new(likes: Arc<dyn LikeRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { likes, follows }
    }

    /// Flip the like state of `(post_id, user_id)` and report the state the
    /// pair is now in.
    pub async fn toggle_like(
        &self,
        user_id: Uuid,
        post_id: Uuid,
    ) -> Result<LikeToggle, DomainError> {
        let liked = if self.likes.exists(post_id, user_id).await? {
            let deleted = self.likes.delete(post_id, user_id).await?;
            if !deleted {
                tracing::debug!(%post_id, %user_id, "like already removed by concurrent toggle");
            }
            false
        } else {
            match self.likes.insert(Like::new(post_id, user_id)).await {
                Ok(()) => {}
                Err(RepoError::Constraint(_)) => {
                    tracing::debug!(%post_id, %user_id, "like already created by concurrent toggle");
                }
                Err(e) => return Err(e.into()),
            }
            true
        };

        Ok(LikeToggle { liked })
    }

    /// Flip the follow edge `(follower_id, followee_id)`. Self-follow is
    /// rejected before touching storage.
    pub async fn toggle_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<FollowToggle, DomainError> {
        if follower_id == followee_id {
            return Err(DomainError::SelfFollow);
        }

        let following = if self.follows.exists(follower_id, followee_id).await? {
            let deleted = self.follows.delete(follower_id, followee_id).await?;
            if !deleted {
                tracing::debug!(%follower_id, %followee_id, "edge already removed by concurrent toggle");
            }
            false
        } else {
            match self.follows.insert(Follow::new(follower_id, followee_id)).await {
                Ok(()) => {}
                Err(RepoError::Constraint(_)) => {
                    tracing::debug!(%follower_id, %followee_id, "edge already created by concurrent toggle");
                }
                Err(e) => return Err(e.into()),
            }
            true
        };

        Ok(FollowToggle { following })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::Mutex;

    /// Plain set-backed like store.
    #[derive(Default)]
    struct SetLikes {
        rows: Mutex<HashSet<(Uuid, Uuid)>>,
    }

    #[async_trait]
    impl LikeRepository for SetLikes {
        async fn insert(&self, like: Like) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().await;
            if !rows.insert((like.post_id, like.user_id)) {
                return Err(RepoError::Constraint("like exists".into()));
            }
            Ok(())
        }

        async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
            Ok(self.rows.lock().await.remove(&(post_id, user_id)))
        }

        async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
            Ok(self.rows.lock().await.contains(&(post_id, user_id)))
        }

        async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
            let rows = self.rows.lock().await;
            Ok(rows.iter().filter(|(p, _)| *p == post_id).count() as u64)
        }
    }

    /// Set-backed follow store.
    #[derive(Default)]
    struct SetFollows {
        rows: Mutex<HashSet<(Uuid, Uuid)>>,
    }

    #[async_trait]
    impl FollowRepository for SetFollows {
        async fn insert(&self, follow: Follow) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().await;
            if !rows.insert((follow.follower_id, follow.followee_id)) {
                return Err(RepoError::Constraint("edge exists".into()));
            }
            Ok(())
        }

        async fn delete(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
            Ok(self.rows.lock().await.remove(&(follower_id, followee_id)))
        }

        async fn exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
            Ok(self.rows.lock().await.contains(&(follower_id, followee_id)))
        }

        async fn followee_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
            let rows = self.rows.lock().await;
            Ok(rows
                .iter()
                .filter(|(f, _)| *f == follower_id)
                .map(|(_, e)| *e)
                .collect())
        }

        async fn count_followers(&self, user_id: Uuid) -> Result<u64, RepoError> {
            let rows = self.rows.lock().await;
            Ok(rows.iter().filter(|(_, e)| *e == user_id).count() as u64)
        }

        async fn count_following(&self, user_id: Uuid) -> Result<u64, RepoError> {
            let rows = self.rows.lock().await;
            Ok(rows.iter().filter(|(f, _)| *f == user_id).count() as u64)
        }
    }

    /// A like store where another writer always wins the race: inserts hit
    /// the uniqueness constraint and deletes find the row already gone.
    struct RacedLikes {
        present: bool,
    }

    #[async_trait]
    impl LikeRepository for RacedLikes {
        async fn insert(&self, _like: Like) -> Result<(), RepoError> {
            Err(RepoError::Constraint("duplicate key".into()))
        }

        async fn delete(&self, _post_id: Uuid, _user_id: Uuid) -> Result<bool, RepoError> {
            Ok(false)
        }

        async fn exists(&self, _post_id: Uuid, _user_id: Uuid) -> Result<bool, RepoError> {
            Ok(self.present)
        }

        async fn count_for_post(&self, _post_id: Uuid) -> Result<u64, RepoError> {
            Ok(0)
        }
    }

    fn engine_with_likes(likes: Arc<dyn LikeRepository>) -> ToggleEngine {
        ToggleEngine::new(likes, Arc::new(SetFollows::default()))
    }

    #[tokio::test]
    async fn like_state_cycles_with_period_two() {
        let engine = engine_with_likes(Arc::new(SetLikes::default()));
        let (user, post) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(engine.toggle_like(user, post).await.unwrap().liked);
        assert!(!engine.toggle_like(user, post).await.unwrap().liked);
        assert!(engine.toggle_like(user, post).await.unwrap().liked);
    }

    #[tokio::test]
    async fn follow_state_cycles_with_period_two() {
        let engine = ToggleEngine::new(
            Arc::new(SetLikes::default()),
            Arc::new(SetFollows::default()),
        );
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(engine.toggle_follow(a, b).await.unwrap().following);
        assert!(!engine.toggle_follow(a, b).await.unwrap().following);
        assert!(engine.toggle_follow(a, b).await.unwrap().following);
    }

    #[tokio::test]
    async fn self_follow_is_rejected_regardless_of_state() {
        let engine = ToggleEngine::new(
            Arc::new(SetLikes::default()),
            Arc::new(SetFollows::default()),
        );
        let a = Uuid::new_v4();

        let err = engine.toggle_follow(a, a).await.unwrap_err();
        assert!(matches!(err, DomainError::SelfFollow));
        // and again: prior state never makes it acceptable
        let err = engine.toggle_follow(a, a).await.unwrap_err();
        assert!(matches!(err, DomainError::SelfFollow));
    }

    #[tokio::test]
    async fn lost_insert_race_still_reports_liked() {
        let engine = engine_with_likes(Arc::new(RacedLikes { present: false }));
        let result = engine.toggle_like(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(result.unwrap().liked);
    }

    #[tokio::test]
    async fn lost_delete_race_still_reports_unliked() {
        let engine = engine_with_likes(Arc::new(RacedLikes { present: true }));
        let result = engine.toggle_like(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(!result.unwrap().liked);
    }

    #[tokio::test]
    async fn unrelated_store_errors_propagate() {
        struct BrokenLikes;

        #[async_trait]
        impl LikeRepository for BrokenLikes {
            async fn insert(&self, _like: Like) -> Result<(), RepoError> {
                Err(RepoError::Connection("pool exhausted".into()))
            }
            async fn delete(&self, _p: Uuid, _u: Uuid) -> Result<bool, RepoError> {
                Err(RepoError::Connection("pool exhausted".into()))
            }
            async fn exists(&self, _p: Uuid, _u: Uuid) -> Result<bool, RepoError> {
                Ok(false)
            }
            async fn count_for_post(&self, _p: Uuid) -> Result<u64, RepoError> {
                Ok(0)
            }
        }

        let engine = engine_with_likes(Arc::new(BrokenLikes));
        let err = engine.toggle_like(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(
            err,
            Err(DomainError::Store(RepoError::Connection(_)))
        ));
    }
}
