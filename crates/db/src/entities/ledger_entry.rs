//! Ledger entry entity (honey-point audit trail).
//!
//! Immutable record of one signed point adjustment. For any user,
//! `user.honey_points` equals the sum of their entry deltas; the balance
//! column is a derived cache, this table is the source of truth.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The event that triggered a point adjustment.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "camelCase")]
pub enum LedgerReason {
    #[sea_orm(string_value = "like")]
    Like,
    #[sea_orm(string_value = "pollination")]
    Pollination,
    #[sea_orm(string_value = "comment")]
    Comment,
    #[sea_orm(string_value = "postCreated")]
    PostCreated,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user whose balance this entry adjusts
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Signed point delta
    pub delta: i64,

    /// Triggering event
    pub reason: LedgerReason,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
