//! Interaction repository.

use std::sync::Arc;

use crate::entities::{Interaction, interaction, interaction::InteractionKind};
use polleneer_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, sea_query::Expr,
};

/// Interaction repository for database operations.
#[derive(Clone)]
pub struct InteractionRepository {
    db: Arc<DatabaseConnection>,
}

impl InteractionRepository {
    /// Create a new interaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the record for a (actor, target, kind) key on `conn`.
    pub async fn find_by_key<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
        kind: &InteractionKind,
    ) -> AppResult<Option<interaction::Model>> {
        Interaction::find()
            .filter(interaction::Column::ActorId.eq(actor_id))
            .filter(interaction::Column::TargetId.eq(target_id))
            .filter(interaction::Column::Kind.eq(kind.clone()))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new interaction record on `conn`.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: interaction::ActiveModel,
    ) -> AppResult<interaction::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip `active` away from `previous`, conditioned on the row still
    /// holding `previous`. Returns the number of rows updated: 0 means a
    /// concurrent writer flipped the record first.
    pub async fn flip_active<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        previous: bool,
    ) -> AppResult<u64> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let result = Interaction::update_many()
            .col_expr(interaction::Column::Active, Expr::value(!previous))
            .col_expr(interaction::Column::LastToggledAt, Expr::value(now))
            .filter(interaction::Column::Id.eq(id))
            .filter(interaction::Column::Active.eq(previous))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Check whether an actor currently holds an interaction.
    pub async fn is_active(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: &InteractionKind,
    ) -> AppResult<bool> {
        Ok(self
            .find_by_key(self.db.as_ref(), actor_id, target_id, kind)
            .await?
            .is_some_and(|record| record.active))
    }

    /// Count active interactions of a kind on a target.
    pub async fn count_active_for_target(
        &self,
        target_id: &str,
        kind: &InteractionKind,
    ) -> AppResult<u64> {
        Interaction::find()
            .filter(interaction::Column::TargetId.eq(target_id))
            .filter(interaction::Column::Kind.eq(kind.clone()))
            .filter(interaction::Column::Active.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the actor's active interactions of a kind (e.g. everyone they follow).
    pub async fn find_active_by_actor(
        &self,
        actor_id: &str,
        kind: &InteractionKind,
    ) -> AppResult<Vec<interaction::Model>> {
        Interaction::find()
            .filter(interaction::Column::ActorId.eq(actor_id))
            .filter(interaction::Column::Kind.eq(kind.clone()))
            .filter(interaction::Column::Active.eq(true))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of `target_ids`, return those the actor holds an active interaction on.
    pub async fn filter_active_targets(
        &self,
        actor_id: &str,
        kind: &InteractionKind,
        target_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if target_ids.is_empty() {
            return Ok(vec![]);
        }

        let records = Interaction::find()
            .filter(interaction::Column::ActorId.eq(actor_id))
            .filter(interaction::Column::Kind.eq(kind.clone()))
            .filter(interaction::Column::Active.eq(true))
            .filter(interaction::Column::TargetId.is_in(target_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.target_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

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

    #[tokio::test]
    async fn test_find_by_key_found() {
        let record = create_test_interaction("i1", "u1", "p1", InteractionKind::Like, true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[record.clone()]])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db.clone());
        let result = repo
            .find_by_key(db.as_ref(), "u1", "p1", &InteractionKind::Like)
            .await
            .unwrap();

        assert!(result.is_some());
        assert!(result.unwrap().active);
    }

    #[tokio::test]
    async fn test_is_active_false_when_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<interaction::Model>::new()])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db);
        let result = repo
            .is_active("u1", "p1", &InteractionKind::Pollinate)
            .await
            .unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_is_active_false_when_toggled_off() {
        let record = create_test_interaction("i1", "u1", "p1", InteractionKind::Like, false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[record]])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db);
        let result = repo
            .is_active("u1", "p1", &InteractionKind::Like)
            .await
            .unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_flip_active_reports_rows_affected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db.clone());
        let rows = repo.flip_active(db.as_ref(), "i1", true).await.unwrap();

        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_count_active_for_target() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Into::<sea_orm::Value>::into(3i64),
                }]])
                .into_connection(),
        );

        let repo = InteractionRepository::new(db);
        let count = repo
            .count_active_for_target("p1", &InteractionKind::Like)
            .await
            .unwrap();

        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_filter_active_targets_empty_input() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = InteractionRepository::new(db);
        let result = repo
            .filter_active_targets("u1", &InteractionKind::Like, &[])
            .await
            .unwrap();

        assert!(result.is_empty());
    }
}
