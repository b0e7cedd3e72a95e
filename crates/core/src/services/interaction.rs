//! Interaction state service.
//!
//! Owns the toggle semantics over the interaction table: one record per
//! (actor, target, kind) key, created lazily on the first toggle and flipped
//! in place afterwards. Counters and points are the coordinator's business;
//! this service only moves `active`.

use polleneer_common::{AppError, AppResult, IdGenerator};
use polleneer_db::{
    entities::interaction::{self, InteractionKind},
    repositories::InteractionRepository,
};
use sea_orm::{ConnectionTrait, Set};

/// Result of one toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// State before the toggle.
    pub previous_active: bool,
    /// State after the toggle. Always `!previous_active`.
    pub new_active: bool,
}

/// Interaction state service.
#[derive(Clone)]
pub struct InteractionService {
    interaction_repo: InteractionRepository,
    id_gen: IdGenerator,
}

impl InteractionService {
    /// Create a new interaction service.
    #[must_use]
    pub const fn new(interaction_repo: InteractionRepository) -> Self {
        Self {
            interaction_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip the interaction state for a key on `conn`.
    ///
    /// The first toggle inserts the record with `active = true`; later
    /// toggles update it conditioned on the previously read value, so a
    /// concurrent flip that slipped past the coordinator's lock surfaces as
    /// a conflict instead of a silent double-count.
    pub async fn toggle<C: ConnectionTrait>(
        &self,
        conn: &C,
        actor_id: &str,
        target_id: &str,
        kind: &InteractionKind,
    ) -> AppResult<ToggleOutcome> {
        match self
            .interaction_repo
            .find_by_key(conn, actor_id, target_id, kind)
            .await?
        {
            None => {
                let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
                let model = interaction::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    actor_id: Set(actor_id.to_string()),
                    target_id: Set(target_id.to_string()),
                    kind: Set(kind.clone()),
                    active: Set(true),
                    created_at: Set(now),
                    last_toggled_at: Set(now),
                };
                self.interaction_repo.create(conn, model).await?;

                Ok(ToggleOutcome {
                    previous_active: false,
                    new_active: true,
                })
            }
            Some(record) => {
                let previous = record.active;
                let rows = self
                    .interaction_repo
                    .flip_active(conn, &record.id, previous)
                    .await?;

                if rows == 0 {
                    return Err(AppError::Conflict(
                        "Interaction was toggled concurrently".to_string(),
                    ));
                }

                Ok(ToggleOutcome {
                    previous_active: previous,
                    new_active: !previous,
                })
            }
        }
    }

    /// Check whether an actor currently holds an interaction.
    pub async fn is_active(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: &InteractionKind,
    ) -> AppResult<bool> {
        self.interaction_repo
            .is_active(actor_id, target_id, kind)
            .await
    }

    /// Of `target_ids`, return those the actor holds an active interaction on.
    pub async fn filter_active_targets(
        &self,
        actor_id: &str,
        kind: &InteractionKind,
        target_ids: &[String],
    ) -> AppResult<Vec<String>> {
        self.interaction_repo
            .filter_active_targets(actor_id, kind, target_ids)
            .await
    }
}
