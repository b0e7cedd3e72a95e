//! Interaction entity (toggleable engagement state).
//!
//! One row per (actor, target, kind) key. Rows are created lazily on the
//! first toggle and never deleted; `active` is the single source of truth
//! for whether the actor currently holds the interaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Toggleable interaction kinds.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    /// Like a post.
    #[sea_orm(string_value = "like")]
    Like,
    /// Pollinate (reshare) a post.
    #[sea_orm(string_value = "pollinate")]
    Pollinate,
    /// Follow a user.
    #[sea_orm(string_value = "follow")]
    Follow,
}

impl InteractionKind {
    /// Stable string form, used for lock keys and logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Pollinate => "pollinate",
            Self::Follow => "follow",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "interaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The acting user
    pub actor_id: String,

    /// The target entity: a post for like/pollinate, a user for follow
    pub target_id: String,

    /// Interaction kind
    pub kind: InteractionKind,

    /// Whether the interaction is currently held
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,

    /// When `active` last flipped
    pub last_toggled_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Actor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
