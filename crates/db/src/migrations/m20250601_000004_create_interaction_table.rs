//! Create interaction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Interaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Interaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Interaction::ActorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Interaction::TargetId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Interaction::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Interaction::Active).boolean().not_null())
                    .col(
                        ColumnDef::new(Interaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Interaction::LastToggledAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_interaction_actor")
                            .from(Interaction::Table, Interaction::ActorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (actor_id, target_id, kind) - at most one record per key
        manager
            .create_index(
                Index::create()
                    .name("idx_interaction_key")
                    .table(Interaction::Table)
                    .col(Interaction::ActorId)
                    .col(Interaction::TargetId)
                    .col(Interaction::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (target_id, kind, active) - counting active interactions on a target
        manager
            .create_index(
                Index::create()
                    .name("idx_interaction_target_kind_active")
                    .table(Interaction::Table)
                    .col(Interaction::TargetId)
                    .col(Interaction::Kind)
                    .col(Interaction::Active)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Interaction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Interaction {
    Table,
    Id,
    ActorId,
    TargetId,
    Kind,
    Active,
    CreatedAt,
    LastToggledAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
