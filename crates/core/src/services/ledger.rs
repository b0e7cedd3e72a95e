//! Reputation ledger service.
//!
//! Every honey-point movement goes through [`LedgerService::apply_delta`]:
//! an immutable ledger entry plus an atomic balance increment, always on the
//! caller's connection so both land in the same transaction. The balance
//! column is a derived cache; the entries are the source of truth.

use polleneer_common::{AppResult, IdGenerator, PointsConfig};
use polleneer_db::{
    entities::{
        interaction::InteractionKind,
        ledger_entry::{self, LedgerReason},
    },
    repositories::{LedgerRepository, UserRepository},
};
use sea_orm::{ConnectionTrait, Set};

/// Honey-point awards per event. Loaded from configuration; the ledger never
/// hard-codes amounts.
#[derive(Debug, Clone, Copy)]
pub struct PointSchedule {
    /// Paid to the post author when a like goes active.
    pub like: i64,
    /// Paid to the post author when a pollination goes active.
    pub pollination: i64,
    /// Paid to the commenter for each comment.
    pub comment: i64,
    /// Paid to the author when a post is created.
    pub post_created: i64,
}

impl From<PointsConfig> for PointSchedule {
    fn from(points: PointsConfig) -> Self {
        Self {
            like: points.like,
            pollination: points.pollination,
            comment: points.comment,
            post_created: points.post_created,
        }
    }
}

impl PointSchedule {
    /// The award and ledger reason for a toggleable kind going active, or
    /// `None` for kinds that pay nothing (follow).
    #[must_use]
    pub const fn toggle_award(&self, kind: &InteractionKind) -> Option<(i64, LedgerReason)> {
        match kind {
            InteractionKind::Like => Some((self.like, LedgerReason::Like)),
            InteractionKind::Pollinate => Some((self.pollination, LedgerReason::Pollination)),
            InteractionKind::Follow => None,
        }
    }
}

/// Reputation ledger service.
#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: LedgerRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl LedgerService {
    /// Create a new ledger service.
    #[must_use]
    pub const fn new(ledger_repo: LedgerRepository, user_repo: UserRepository) -> Self {
        Self {
            ledger_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply a signed point delta to a user on `conn` and return the new
    /// balance.
    ///
    /// Accepts any signed amount; balances are allowed to go negative. The
    /// entry insert and the balance increment share the caller's
    /// transaction, so the balance can never drift from the entry sum.
    pub async fn apply_delta<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        delta: i64,
        reason: LedgerReason,
    ) -> AppResult<i64> {
        let model = ledger_entry::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            delta: Set(delta),
            reason: Set(reason),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.ledger_repo.create(conn, model).await?;
        self.user_repo.apply_honey_delta(conn, user_id, delta).await?;

        let balance = self.user_repo.balance_of(conn, user_id).await?;
        tracing::debug!(user_id = %user_id, delta, balance, "Applied ledger delta");

        Ok(balance)
    }

    /// Get a user's balance together with their recent ledger entries.
    pub async fn overview(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<(i64, Vec<ledger_entry::Model>)> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let entries = self.ledger_repo.find_by_user(user_id, limit, until_id).await?;
        Ok((user.honey_points, entries))
    }

    /// Sum all ledger deltas for a user. Audit helper: must equal the
    /// balance returned by [`Self::overview`].
    pub async fn sum_for_user(&self, user_id: &str) -> AppResult<i64> {
        self.ledger_repo.sum_for_user(user_id).await
    }
}
