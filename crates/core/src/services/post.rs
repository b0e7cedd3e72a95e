//! Post service.

use std::sync::Arc;

use crate::services::ledger::{LedgerService, PointSchedule};
use polleneer_common::{AppError, AppResult, IdGenerator};
use polleneer_db::{
    entities::{comment, ledger_entry::LedgerReason, post},
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};

/// Maximum accepted post length in bytes.
const MAX_POST_LENGTH: usize = 5000;

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub content: String,
    pub tags: Vec<String>,
    pub media_url: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    post_repo: PostRepository,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    ledger: LedgerService,
    points: PointSchedule,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        post_repo: PostRepository,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
        ledger: LedgerService,
        points: PointSchedule,
    ) -> Self {
        Self {
            db,
            post_repo,
            user_repo,
            comment_repo,
            ledger,
            points,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post and award the author the post-created points.
    ///
    /// The insert, the author's posts-count bump, and the ledger award are
    /// one transaction. The award is a single irreversible ledger event;
    /// there is no undo that claws it back.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Post content is empty".to_string()));
        }
        if content.len() > MAX_POST_LENGTH {
            return Err(AppError::Validation(format!(
                "Post content exceeds {MAX_POST_LENGTH} characters"
            )));
        }

        // Ensure the author resolves before writing anything
        let author = self.user_repo.get_by_id(author_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author.id.clone()),
            content: Set(content.to_string()),
            tags: Set(serde_json::json!(input.tags)),
            media_url: Set(input.media_url),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        let created = self.post_repo.create(&txn, model).await?;

        self.user_repo.increment_posts_count(&txn, &author.id).await?;
        self.ledger
            .apply_delta(
                &txn,
                &author.id,
                self.points.post_created,
                LedgerReason::PostCreated,
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(author_id = %author.id, post_id = %created.id, "Post created");

        Ok(created)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Get the feed (newest first, paginated).
    pub async fn feed(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_recent(limit, until_id).await
    }

    /// Get posts by a user (newest first, paginated).
    pub async fn by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_user(user_id, limit, until_id).await
    }

    /// Get comments on a post (newest first, paginated).
    pub async fn comments(
        &self,
        post_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        // Surface a NotFound for dangling post IDs rather than an empty list
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id, limit, until_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use polleneer_common::PointsConfig;
    use polleneer_db::entities::{ledger_entry, user};
    use polleneer_db::repositories::LedgerRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, honey_points: i64) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            username_lower: format!("user_{id}"),
            token: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            role: user::Role::Worker,
            honey_points,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: "Fresh nectar report".to_string(),
            tags: serde_json::json!([]),
            media_url: None,
            like_count: 0,
            comment_count: 0,
            pollination_count: 0,
            view_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn build_service(db: Arc<DatabaseConnection>) -> PostService {
        PostService::new(
            db.clone(),
            PostRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            LedgerService::new(
                LedgerRepository::new(db.clone()),
                UserRepository::new(db),
            ),
            PointSchedule::from(PointsConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_create_awards_author() {
        let entry = ledger_entry::Model {
            id: "l1".to_string(),
            user_id: "a".to_string(),
            delta: 25,
            reason: LedgerReason::PostCreated,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("a", 0)]])
                .append_query_results([[create_test_post("p1", "a")]])
                .append_query_results([[entry]])
                .append_query_results([[create_test_user("a", 25)]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let service = build_service(db);
        let post = service
            .create(
                "a",
                CreatePostInput {
                    content: "Fresh nectar report".to_string(),
                    tags: vec!["#nectar".to_string()],
                    media_url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(post.user_id, "a");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = build_service(db);
        let result = service
            .create(
                "a",
                CreatePostInput {
                    content: "  ".to_string(),
                    tags: vec![],
                    media_url: None,
                },
            )
            .await;

        match result {
            Err(AppError::Validation(_)) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_create_for_unknown_author_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service
            .create(
                "ghost",
                CreatePostInput {
                    content: "hello".to_string(),
                    tags: vec![],
                    media_url: None,
                },
            )
            .await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_feed_returns_posts() {
        let p1 = create_test_post("p1", "a");
        let p2 = create_test_post("p2", "b");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p2, p1]])
                .into_connection(),
        );

        let service = build_service(db);
        let feed = service.feed(20, None).await.unwrap();

        assert_eq!(feed.len(), 2);
    }
}
