//! In-memory store - backs the server when no database is configured,
//! and gives service tests a real store without a running Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use ripple_core::domain::{Follow, Like, Post, User, UserSummary};
use ripple_core::error::RepoError;
use ripple_core::pagination::PageRequest;
use ripple_core::ports::{FollowRepository, LikeRepository, PostRepository, UserRepository};

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    posts: Vec<Post>,
    likes: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    follows: HashMap<(Uuid, Uuid), DateTime<Utc>>,
}

/// In-memory relational store behind the same repository ports as the
/// Postgres implementation. The write lock plays the role the unique
/// indexes play in Postgres: check-and-insert happens under one lock
/// acquisition, so duplicate pairs surface as `RepoError::Constraint`
/// exactly as a real store would report them.
///
/// Data is lost on process restart.
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn author_of(state: &StoreState, author_id: Uuid) -> Result<UserSummary, RepoError> {
    state
        .users
        .iter()
        .find(|u| u.id == author_id)
        .map(|u| UserSummary {
            id: u.id,
            username: u.username.clone(),
        })
        .ok_or_else(|| RepoError::Query(format!("author {author_id} missing")))
}

/// Order newest-first with id as the tiebreak, then cut the page out.
fn page_of(
    state: &StoreState,
    mut posts: Vec<Post>,
    page: &PageRequest,
) -> Result<Vec<(Post, UserSummary)>, RepoError> {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    posts
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .map(|p| {
            let author = author_of(state, p.author_id)?;
            Ok((p, author))
        })
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint(format!(
                "users.email: {}",
                user.email
            )));
        }
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "users.username: {}",
                user.username
            )));
        }
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == post.author_id) {
            return Err(RepoError::ForeignKey(format!(
                "posts.author_id: {}",
                post.author_id
            )));
        }
        if let Some(target) = post.reply_to_id {
            if !state.posts.iter().any(|p| p.id == target) {
                return Err(RepoError::ForeignKey(format!("posts.reply_to_id: {target}")));
            }
        }
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.iter().any(|p| p.id == id))
    }

    async fn list_roots(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError> {
        let state = self.state.read().await;
        let roots = state
            .posts
            .iter()
            .filter(|p| p.is_root())
            .cloned()
            .collect();
        page_of(&state, roots, page)
    }

    async fn list_roots_by_authors(
        &self,
        authors: &[Uuid],
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError> {
        let state = self.state.read().await;
        let roots = state
            .posts
            .iter()
            .filter(|p| p.is_root() && authors.contains(&p.author_id))
            .cloned()
            .collect();
        page_of(&state, roots, page)
    }

    async fn list_replies(
        &self,
        post_id: Uuid,
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError> {
        let state = self.state.read().await;
        let replies = state
            .posts
            .iter()
            .filter(|p| p.reply_to_id == Some(post_id))
            .cloned()
            .collect();
        page_of(&state, replies, page)
    }

    async fn count_replies(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .filter(|p| p.reply_to_id == Some(post_id))
            .count() as u64)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .count() as u64)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn insert(&self, like: Like) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.iter().any(|p| p.id == like.post_id) {
            return Err(RepoError::ForeignKey(format!(
                "likes.post_id: {}",
                like.post_id
            )));
        }
        if !state.users.iter().any(|u| u.id == like.user_id) {
            return Err(RepoError::ForeignKey(format!(
                "likes.user_id: {}",
                like.user_id
            )));
        }
        let key = (like.post_id, like.user_id);
        if state.likes.contains_key(&key) {
            return Err(RepoError::Constraint(format!(
                "likes pk ({}, {})",
                like.post_id, like.user_id
            )));
        }
        state.likes.insert(key, like.created_at);
        Ok(())
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        Ok(state.likes.remove(&(post_id, user_id)).is_some())
    }

    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.likes.contains_key(&(post_id, user_id)))
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state.likes.keys().filter(|(p, _)| *p == post_id).count() as u64)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn insert(&self, follow: Follow) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        for id in [follow.follower_id, follow.followee_id] {
            if !state.users.iter().any(|u| u.id == id) {
                return Err(RepoError::ForeignKey(format!("follows user: {id}")));
            }
        }
        let key = (follow.follower_id, follow.followee_id);
        if state.follows.contains_key(&key) {
            return Err(RepoError::Constraint(format!(
                "follows pk ({}, {})",
                follow.follower_id, follow.followee_id
            )));
        }
        state.follows.insert(key, follow.created_at);
        Ok(())
    }

    async fn delete(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        Ok(state.follows.remove(&(follower_id, followee_id)).is_some())
    }

    async fn exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.follows.contains_key(&(follower_id, followee_id)))
    }

    async fn followee_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .keys()
            .filter(|(f, _)| *f == follower_id)
            .map(|(_, e)| *e)
            .collect())
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state.follows.keys().filter(|(_, e)| *e == user_id).count() as u64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state.follows.keys().filter(|(f, _)| *f == user_id).count() as u64)
    }
}
