//! Create ledger entry table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntry::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntry::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntry::Delta).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntry::Reason).string_len(16).not_null())
                    .col(
                        ColumnDef::new(LedgerEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entry_user")
                            .from(LedgerEntry::Table, LedgerEntry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for balance audits and history)
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entry_user_id")
                    .table(LedgerEntry::Table)
                    .col(LedgerEntry::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LedgerEntry {
    Table,
    Id,
    UserId,
    Delta,
    Reason,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
