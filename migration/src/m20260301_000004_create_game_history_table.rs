use sea_orm_migration::{prelude::*, schema::*};

use super::m20260301_000002_create_pacte_table::Pacte;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameHistory::Table)
                    .if_not_exists()
                    .col(string(GameHistory::MatchId))
                    .col(integer(GameHistory::PacteId))
                    .col(string(GameHistory::Result))
                    .col(
                        timestamp_with_time_zone(GameHistory::ProcessedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GameHistory::MatchId)
                            .col(GameHistory::PacteId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_history_pacte_id")
                            .from(GameHistory::Table, GameHistory::PacteId)
                            .to(Pacte::Table, Pacte::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .check(Expr::col(GameHistory::Result).is_in(["win", "loss"]))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_history_processed_at")
                    .table(GameHistory::Table)
                    .col(GameHistory::ProcessedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_game_history_processed_at")
                    .table(GameHistory::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(GameHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum GameHistory {
    Table,
    MatchId,
    PacteId,
    Result,
    ProcessedAt,
}
