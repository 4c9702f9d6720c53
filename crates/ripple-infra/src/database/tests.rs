#[cfg(test)]
mod tests {
    use crate::database::entity::{post, user};
    use crate::database::postgres::{PostgresPostRepository, PostgresUserRepository};
    use ripple_core::ports::{PostRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post::Model {
                id: post_id,
                author_id,
                content: "hello".to_owned(),
                reply_to_id: None,
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let found = repo.find_by_id(post_id).await.unwrap().unwrap();
        assert_eq!(found.id, post_id);
        assert_eq!(found.content, "hello");
        assert!(found.is_root());
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let user_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                email: "eve@example.com".to_owned(),
                username: "eve".to_owned(),
                password_hash: "hash".to_owned(),
                created_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(Arc::new(db));

        let found = repo.find_by_email("eve@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, user_id);
        assert_eq!(found.username, "eve");
    }

    #[tokio::test]
    async fn test_missing_post_maps_to_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        assert!(repo.find_by_id(uuid::Uuid::new_v4()).await.unwrap().is_none());
    }
}
