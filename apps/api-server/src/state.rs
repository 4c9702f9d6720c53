//! Application state - repositories and services shared across handlers.

use std::sync::Arc;

use ripple_core::ports::{FollowRepository, LikeRepository, PostRepository, UserRepository};
use ripple_core::service::{FeedComposer, PostService, ProfileService, ToggleEngine};
use ripple_infra::database::{DatabaseConfig, InMemoryStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub feed: FeedComposer,
    pub toggles: ToggleEngine,
    pub posts: PostService,
    pub profiles: ProfileService,
}

impl AppState {
    /// Wire the core services over a set of store implementations.
    pub fn assemble(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            feed: FeedComposer::new(posts.clone(), likes.clone(), follows.clone()),
            toggles: ToggleEngine::new(likes, follows.clone()),
            posts: PostService::new(posts.clone(), users.clone()),
            profiles: ProfileService::new(users.clone(), posts, follows),
            users,
        }
    }

    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::assemble(store.clone(), store.clone(), store.clone(), store)
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        if let Some(config) = db_config {
            use ripple_infra::database::{
                PostgresFollowRepository, PostgresLikeRepository, PostgresPostRepository,
                PostgresUserRepository, connect,
            };

            match connect(config).await {
                Ok(db) => {
                    tracing::info!("Application state initialized with the Postgres store");
                    let db = Arc::new(db);
                    return Self::assemble(
                        Arc::new(PostgresUserRepository::new(db.clone())),
                        Arc::new(PostgresPostRepository::new(db.clone())),
                        Arc::new(PostgresLikeRepository::new(db.clone())),
                        Arc::new(PostgresFollowRepository::new(db)),
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {e}. Falling back to the in-memory store."
                    );
                    return Self::in_memory();
                }
            }
        }

        #[cfg(not(feature = "postgres"))]
        let _ = db_config;

        tracing::warn!("No database configured. Running with the in-memory store.");
        Self::in_memory()
    }
}
