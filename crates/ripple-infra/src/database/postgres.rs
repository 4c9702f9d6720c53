//! PostgreSQL repository implementations.
//!
//! Constraint violations are classified here so the services above can
//! tell a lost toggle race (unique violation) from a dangling reference
//! (foreign key) from a store outage.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use ripple_core::domain::{Follow, Like, Post, User, UserSummary};
use ripple_core::error::RepoError;
use ripple_core::pagination::PageRequest;
use ripple_core::ports::{FollowRepository, LikeRepository, PostRepository, UserRepository};

use super::entity::follow::{self, Entity as FollowEntity};
use super::entity::like::{self, Entity as LikeEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

fn map_db_err(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => RepoError::Constraint(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => RepoError::ForeignKey(msg),
        _ => match e {
            DbErr::Conn(err) => RepoError::Connection(err.to_string()),
            DbErr::ConnectionAcquire(err) => RepoError::Connection(err.to_string()),
            other => RepoError::Query(other.to_string()),
        },
    }
}

fn with_author(row: (post::Model, Option<user::Model>)) -> Result<(Post, UserSummary), RepoError> {
    let (post, author) = row;
    let author =
        author.ok_or_else(|| RepoError::Query(format!("post {} has no author row", post.id)))?;
    Ok((
        post.into(),
        UserSummary {
            id: author.id,
            username: author.username,
        },
    ))
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: Arc<DbConn>,
}

impl PostgresUserRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let found = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask the local part when logging to keep PII out of logs
        let masked = match email.split_once('@') {
            Some((_, domain)) => format!("***@{domain}"),
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "finding user by email");

        let found = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepoError> {
        let found = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.eq(email))
                    .add(user::Column::Username.eq(username)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.map(Into::into))
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let found = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.map(Into::into))
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let found = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.is_some())
    }

    async fn list_roots(
        &self,
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::ReplyToId.is_null())
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        rows.into_iter().map(with_author).collect()
    }

    async fn list_roots_by_authors(
        &self,
        authors: &[Uuid],
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::ReplyToId.is_null())
            .filter(post::Column::AuthorId.is_in(authors.iter().copied()))
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        rows.into_iter().map(with_author).collect()
    }

    async fn list_replies(
        &self,
        post_id: Uuid,
        page: &PageRequest,
    ) -> Result<Vec<(Post, UserSummary)>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::ReplyToId.eq(post_id))
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        rows.into_iter().map(with_author).collect()
    }

    async fn count_replies(&self, post_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::ReplyToId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}

/// PostgreSQL like repository.
pub struct PostgresLikeRepository {
    db: Arc<DbConn>,
}

impl PostgresLikeRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn insert(&self, like: Like) -> Result<(), RepoError> {
        like::ActiveModel::from(like)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let result = LikeEntity::delete_by_id((post_id, user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let found = LikeEntity::find_by_id((post_id, user_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.is_some())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        LikeEntity::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}

/// PostgreSQL follow repository.
pub struct PostgresFollowRepository {
    db: Arc<DbConn>,
}

impl PostgresFollowRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert(&self, follow: Follow) -> Result<(), RepoError> {
        follow::ActiveModel::from(follow)
            .insert(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let result = FollowEntity::delete_by_id((follower_id, followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool, RepoError> {
        let found = FollowEntity::find_by_id((follower_id, followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(found.is_some())
    }

    async fn followee_ids(&self, follower_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let rows = FollowEntity::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(|m| m.followee_id).collect())
    }

    async fn count_followers(&self, user_id: Uuid) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::FolloweeId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64, RepoError> {
        FollowEntity::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)
    }
}
