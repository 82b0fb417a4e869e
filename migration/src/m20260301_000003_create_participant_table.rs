use sea_orm_migration::{prelude::*, schema::*};

use super::{m20260301_000001_create_user_table::User, m20260301_000002_create_pacte_table::Pacte};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participant::Table)
                    .if_not_exists()
                    .col(integer(Participant::PacteId))
                    .col(string(Participant::UserId))
                    .col(
                        timestamp_with_time_zone(Participant::JoinedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(timestamp_with_time_zone_null(Participant::SignedAt))
                    .col(timestamp_with_time_zone_null(Participant::LeftAt))
                    .col(timestamp_with_time_zone_null(Participant::KickedAt))
                    .col(text_null(Participant::KickReason))
                    .col(string_null(Participant::KickedBy))
                    .col(integer(Participant::PointsGained).default(0))
                    .primary_key(
                        Index::create()
                            .col(Participant::PacteId)
                            .col(Participant::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_pacte_id")
                            .from(Participant::Table, Participant::PacteId)
                            .to(Pacte::Table, Pacte::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participant_user_id")
                            .from(Participant::Table, Participant::UserId)
                            .to(User::Table, User::DiscordId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .check(
                        Expr::col(Participant::LeftAt)
                            .is_null()
                            .or(Expr::col(Participant::KickedAt).is_null()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participant_user_id")
                    .table(Participant::Table)
                    .col(Participant::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_participant_user_id")
                    .table(Participant::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Participant::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Participant {
    Table,
    PacteId,
    UserId,
    JoinedAt,
    SignedAt,
    LeftAt,
    KickedAt,
    KickReason,
    KickedBy,
    PointsGained,
}
