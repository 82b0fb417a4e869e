use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pacte::Table)
                    .if_not_exists()
                    .col(pk_auto(Pacte::Id))
                    .col(integer(Pacte::Objective))
                    .col(string(Pacte::Status).default("pending"))
                    .col(integer(Pacte::CurrentWins).default(0))
                    .col(integer(Pacte::BestStreakReached).default(0))
                    .col(boolean(Pacte::InGame).default(false))
                    .col(string_null(Pacte::CurrentGameId))
                    .col(timestamp_with_time_zone_null(Pacte::MatchStartedAt))
                    .col(timestamp_with_time_zone_null(Pacte::ResultPendingSince))
                    .col(integer(Pacte::ResultPollCount).default(0))
                    .col(boolean(Pacte::WarningSent).default(false))
                    .col(integer(Pacte::ErrorCount).default(0))
                    .col(string(Pacte::ChannelId))
                    .col(
                        timestamp_with_time_zone(Pacte::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(Pacte::StartedAt))
                    .col(timestamp_with_time_zone_null(Pacte::CompletedAt))
                    .col(timestamp_with_time_zone_null(Pacte::LastCheckedAt))
                    .check(Expr::col(Pacte::Objective).between(3, 10))
                    .check(Expr::col(Pacte::CurrentWins).gte(0))
                    .check(Expr::col(Pacte::CurrentWins).lte(Expr::col(Pacte::Objective)))
                    .check(
                        Expr::col(Pacte::Status).is_in(["pending", "active", "success", "failed"]),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pacte_status")
                    .table(Pacte::Table)
                    .col(Pacte::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_pacte_status")
                    .table(Pacte::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Pacte::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Pacte {
    Table,
    Id,
    Objective,
    Status,
    CurrentWins,
    BestStreakReached,
    InGame,
    CurrentGameId,
    MatchStartedAt,
    ResultPendingSince,
    ResultPollCount,
    WarningSent,
    ErrorCount,
    ChannelId,
    CreatedAt,
    StartedAt,
    CompletedAt,
    LastCheckedAt,
}
