//! Engagement coordinator.
//!
//! The single entry point for interaction toggles and comments. Each call
//! serializes on its (actor, target, kind) key, resolves the target, then
//! runs state flip, ledger delta, counter adjustment, and notification as
//! one database transaction: either every side effect lands or none do.

use std::sync::Arc;

use crate::locks::KeyLocks;
use crate::services::interaction::InteractionService;
use crate::services::ledger::{LedgerService, PointSchedule};
use crate::services::notification::NotificationService;
use polleneer_common::{AppError, AppResult, IdGenerator};
use polleneer_db::{
    entities::{
        comment,
        interaction::InteractionKind,
        ledger_entry::LedgerReason,
        notification::NotificationKind,
    },
    repositories::{CommentRepository, PostRepository, UserRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};

/// Maximum accepted comment length in bytes.
const MAX_COMMENT_LENGTH: usize = 2000;

/// Result of one `perform` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engagement {
    /// Whether the interaction is active after the toggle.
    pub active: bool,
    /// The signed delta applied to the beneficiary's balance. Zero for
    /// kinds that pay nothing and for self-interactions.
    pub points_delta: i64,
}

/// Engagement coordinator service.
#[derive(Clone)]
pub struct EngagementService {
    db: Arc<DatabaseConnection>,
    interactions: InteractionService,
    ledger: LedgerService,
    notifications: NotificationService,
    post_repo: PostRepository,
    user_repo: UserRepository,
    comment_repo: CommentRepository,
    points: PointSchedule,
    locks: KeyLocks,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        interactions: InteractionService,
        ledger: LedgerService,
        notifications: NotificationService,
        post_repo: PostRepository,
        user_repo: UserRepository,
        comment_repo: CommentRepository,
        points: PointSchedule,
    ) -> Self {
        Self {
            db,
            interactions,
            ledger,
            notifications,
            post_repo,
            user_repo,
            comment_repo,
            points,
            locks: KeyLocks::new(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle an interaction for an actor on a target.
    ///
    /// Serialized per key: two racing calls for the same (actor, target,
    /// kind) run one after the other, so a pair of calls always nets out to
    /// the original state and a zero point delta.
    pub async fn perform(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: InteractionKind,
    ) -> AppResult<Engagement> {
        let _guard = self
            .locks
            .acquire(&format!("{}:{actor_id}:{target_id}", kind.as_str()))
            .await;

        // Resolve the target and its owner
        let (owner_id, post_id) = match kind {
            InteractionKind::Like | InteractionKind::Pollinate => {
                let post = self.post_repo.get_by_id(target_id).await?;
                (post.user_id, Some(post.id))
            }
            InteractionKind::Follow => {
                if actor_id == target_id {
                    return Err(AppError::InvalidActor(
                        "Cannot follow yourself".to_string(),
                    ));
                }
                let user = self.user_repo.get_by_id(target_id).await?;
                (user.id, None)
            }
        };

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let outcome = self
            .interactions
            .toggle(&txn, actor_id, target_id, &kind)
            .await?;

        // Pay or revoke the beneficiary. Self-interactions move no points,
        // and follow pays nothing.
        let mut points_delta = 0;
        if owner_id != actor_id
            && let Some((award, reason)) = self.points.toggle_award(&kind)
        {
            let delta = if outcome.new_active { award } else { -award };
            self.ledger
                .apply_delta(&txn, &owner_id, delta, reason)
                .await?;
            points_delta = delta;
        }

        // Keep the denormalized counters in lockstep with the state flip
        match kind {
            InteractionKind::Like => {
                if outcome.new_active {
                    self.post_repo.increment_like_count(&txn, target_id).await?;
                } else {
                    self.post_repo.decrement_like_count(&txn, target_id).await?;
                }
            }
            InteractionKind::Pollinate => {
                if outcome.new_active {
                    self.post_repo
                        .increment_pollination_count(&txn, target_id)
                        .await?;
                } else {
                    self.post_repo
                        .decrement_pollination_count(&txn, target_id)
                        .await?;
                }
            }
            InteractionKind::Follow => {
                if outcome.new_active {
                    self.user_repo
                        .increment_followers_count(&txn, target_id)
                        .await?;
                    self.user_repo
                        .increment_following_count(&txn, actor_id)
                        .await?;
                } else {
                    self.user_repo
                        .decrement_followers_count(&txn, target_id)
                        .await?;
                    self.user_repo
                        .decrement_following_count(&txn, actor_id)
                        .await?;
                }
            }
        }

        // Only the activating transition notifies; toggling back off is silent
        if outcome.new_active {
            self.notifications
                .notify(
                    &txn,
                    &owner_id,
                    actor_id,
                    Self::notification_kind(&kind),
                    post_id.as_deref(),
                )
                .await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            actor_id = %actor_id,
            target_id = %target_id,
            kind = kind.as_str(),
            active = outcome.new_active,
            points_delta,
            "Interaction toggled"
        );

        Ok(Engagement {
            active: outcome.new_active,
            points_delta,
        })
    }

    /// Record a comment on a post.
    ///
    /// One-shot, never toggled: always pays the commenter the comment award
    /// (their own posts included) and notifies the post owner.
    pub async fn record_comment(
        &self,
        actor_id: &str,
        post_id: &str,
        text: &str,
    ) -> AppResult<comment::Model> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment text is empty".to_string()));
        }
        if text.len() > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment text exceeds {MAX_COMMENT_LENGTH} characters"
            )));
        }

        let post = self.post_repo.get_by_id(post_id).await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            user_id: Set(actor_id.to_string()),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.comment_repo.create(&txn, model).await?;

        self.post_repo.increment_comment_count(&txn, post_id).await?;
        self.ledger
            .apply_delta(&txn, actor_id, self.points.comment, LedgerReason::Comment)
            .await?;
        self.notifications
            .notify(
                &txn,
                &post.user_id,
                actor_id,
                NotificationKind::Comment,
                Some(post_id),
            )
            .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(actor_id = %actor_id, post_id = %post_id, "Comment recorded");

        Ok(created)
    }

    const fn notification_kind(kind: &InteractionKind) -> NotificationKind {
        match kind {
            InteractionKind::Like => NotificationKind::Like,
            InteractionKind::Pollinate => NotificationKind::Pollination,
            InteractionKind::Follow => NotificationKind::Follow,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use polleneer_db::entities::{interaction, ledger_entry, notification, post, user};
    use polleneer_db::repositories::{InteractionRepository, LedgerRepository, NotificationRepository};
    use polleneer_common::PointsConfig;
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

    fn create_test_interaction(
        id: &str,
        actor_id: &str,
        target_id: &str,
        kind: InteractionKind,
        active: bool,
    ) -> interaction::Model {
        interaction::Model {
            id: id.to_string(),
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            kind,
            active,
            created_at: Utc::now().into(),
            last_toggled_at: Utc::now().into(),
        }
    }

    fn create_test_entry(id: &str, user_id: &str, delta: i64) -> ledger_entry::Model {
        ledger_entry::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            delta,
            reason: ledger_entry::LedgerReason::Like,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_notification(id: &str, recipient_id: &str, actor_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: actor_id.to_string(),
            kind: NotificationKind::Like,
            post_id: Some("p1".to_string()),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn build_service(db: Arc<DatabaseConnection>) -> EngagementService {
        EngagementService::new(
            db.clone(),
            InteractionService::new(InteractionRepository::new(db.clone())),
            LedgerService::new(
                LedgerRepository::new(db.clone()),
                UserRepository::new(db.clone()),
            ),
            NotificationService::new(NotificationRepository::new(db.clone())),
            PostRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            CommentRepository::new(db),
            PointSchedule::from(PointsConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_like_going_active_pays_author_and_notifies() {
        // B likes A's post: resolve post, create interaction, ledger entry,
        // balance read, counter bump, notification.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "a")]])
                .append_query_results([Vec::<interaction::Model>::new()])
                .append_query_results([[create_test_interaction(
                    "i1",
                    "b",
                    "p1",
                    InteractionKind::Like,
                    true,
                )]])
                .append_query_results([[create_test_entry("l1", "a", 5)]])
                .append_query_results([[create_test_user("a", 5)]])
                .append_query_results([[create_test_notification("n1", "a", "b")]])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let service = build_service(db);
        let engagement = service.perform("b", "p1", InteractionKind::Like).await.unwrap();

        assert!(engagement.active);
        assert_eq!(engagement.points_delta, 5);
    }

    #[tokio::test]
    async fn test_like_going_inactive_revokes_points_without_notifying() {
        // Second toggle: the record exists and is active, so it flips off,
        // the author loses the award, and no notification is written.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "a")]])
                .append_query_results([[create_test_interaction(
                    "i1",
                    "b",
                    "p1",
                    InteractionKind::Like,
                    true,
                )]])
                .append_query_results([[create_test_entry("l2", "a", -5)]])
                .append_query_results([[create_test_user("a", 0)]])
                .append_exec_results([exec_ok(), exec_ok(), exec_ok()])
                .into_connection(),
        );

        let service = build_service(db);
        let engagement = service.perform("b", "p1", InteractionKind::Like).await.unwrap();

        assert!(!engagement.active);
        assert_eq!(engagement.points_delta, -5);
    }

    #[tokio::test]
    async fn test_self_like_is_allowed_but_pays_nothing() {
        // B likes their own post: state flips, counter bumps, but no ledger
        // entry and no notification.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "b")]])
                .append_query_results([Vec::<interaction::Model>::new()])
                .append_query_results([[create_test_interaction(
                    "i1",
                    "b",
                    "p1",
                    InteractionKind::Like,
                    true,
                )]])
                .append_exec_results([exec_ok()])
                .into_connection(),
        );

        let service = build_service(db);
        let engagement = service.perform("b", "p1", InteractionKind::Like).await.unwrap();

        assert!(engagement.active);
        assert_eq!(engagement.points_delta, 0);
    }

    #[tokio::test]
    async fn test_follow_self_is_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = build_service(db);
        let result = service.perform("b", "b", InteractionKind::Follow).await;

        match result {
            Err(AppError::InvalidActor(msg)) => assert!(msg.contains("yourself")),
            _ => panic!("Expected InvalidActor error"),
        }
    }

    #[tokio::test]
    async fn test_follow_updates_both_counters_and_pays_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("a", 0)]])
                .append_query_results([Vec::<interaction::Model>::new()])
                .append_query_results([[create_test_interaction(
                    "i1",
                    "b",
                    "a",
                    InteractionKind::Follow,
                    true,
                )]])
                .append_query_results([[create_test_notification("n1", "a", "b")]])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let service = build_service(db);
        let engagement = service.perform("b", "a", InteractionKind::Follow).await.unwrap();

        assert!(engagement.active);
        assert_eq!(engagement.points_delta, 0);
    }

    #[tokio::test]
    async fn test_perform_on_missing_post_fails_before_any_write() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let service = build_service(db);
        let result = service.perform("b", "missing", InteractionKind::Like).await;

        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_record_comment_pays_commenter_and_notifies_owner() {
        let comment_model = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            user_id: "b".to_string(),
            text: "Sweet post!".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post("p1", "a")]])
                .append_query_results([[comment_model]])
                .append_query_results([[create_test_entry("l1", "b", 10)]])
                .append_query_results([[create_test_user("b", 10)]])
                .append_query_results([[create_test_notification("n1", "a", "b")]])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let service = build_service(db);
        let comment = service
            .record_comment("b", "p1", "Sweet post!")
            .await
            .unwrap();

        assert_eq!(comment.user_id, "b");
        assert_eq!(comment.post_id, "p1");
    }

    #[tokio::test]
    async fn test_record_comment_rejects_empty_text() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = build_service(db);
        let result = service.record_comment("b", "p1", "   ").await;

        match result {
            Err(AppError::Validation(_)) => {}
            _ => panic!("Expected Validation error"),
        }
    }
}
