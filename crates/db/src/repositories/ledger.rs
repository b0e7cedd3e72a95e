//! Ledger repository.

use std::sync::Arc;

use crate::entities::{LedgerEntry, ledger_entry};
use polleneer_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Ledger repository for database operations.
#[derive(Clone)]
pub struct LedgerRepository {
    db: Arc<DatabaseConnection>,
}

impl LedgerRepository {
    /// Create a new ledger repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry on `conn`. Entries are immutable once written.
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: ledger_entry::ActiveModel,
    ) -> AppResult<ledger_entry::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get entries for a user (newest first, paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<ledger_entry::Model>> {
        let mut query = LedgerEntry::find()
            .filter(ledger_entry::Column::UserId.eq(user_id))
            .order_by_desc(ledger_entry::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(ledger_entry::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum all deltas for a user. Audit helper: the result must equal the
    /// user's `honey_points` balance.
    pub async fn sum_for_user(&self, user_id: &str) -> AppResult<i64> {
        let entries = LedgerEntry::find()
            .filter(ledger_entry::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(entries.iter().map(|e| e.delta).sum())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_entry(
        id: &str,
        user_id: &str,
        delta: i64,
        reason: ledger_entry::LedgerReason,
    ) -> ledger_entry::Model {
        ledger_entry::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            delta,
            reason,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_sum_for_user() {
        let e1 = create_test_entry("l1", "u1", 5, ledger_entry::LedgerReason::Like);
        let e2 = create_test_entry("l2", "u1", 15, ledger_entry::LedgerReason::Pollination);
        let e3 = create_test_entry("l3", "u1", -5, ledger_entry::LedgerReason::Like);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1, e2, e3]])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let sum = repo.sum_for_user("u1").await.unwrap();

        assert_eq!(sum, 15);
    }

    #[tokio::test]
    async fn test_sum_for_user_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ledger_entry::Model>::new()])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let sum = repo.sum_for_user("u1").await.unwrap();

        assert_eq!(sum, 0);
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let e1 = create_test_entry("l2", "u1", 25, ledger_entry::LedgerReason::PostCreated);
        let e2 = create_test_entry("l1", "u1", 10, ledger_entry::LedgerReason::Comment);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[e1, e2]])
                .into_connection(),
        );

        let repo = LedgerRepository::new(db);
        let entries = repo.find_by_user("u1", 20, None).await.unwrap();

        assert_eq!(entries.len(), 2);
    }
}
