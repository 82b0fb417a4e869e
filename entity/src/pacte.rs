use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pacte")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub objective: i32,
    pub status: String,
    pub current_wins: i32,
    pub best_streak_reached: i32,
    pub in_game: bool,
    pub current_game_id: Option<String>,
    pub match_started_at: Option<DateTimeUtc>,
    pub result_pending_since: Option<DateTimeUtc>,
    pub result_poll_count: i32,
    pub warning_sent: bool,
    pub error_count: i32,
    pub channel_id: String,
    pub created_at: DateTimeUtc,
    pub started_at: Option<DateTimeUtc>,
    pub completed_at: Option<DateTimeUtc>,
    pub last_checked_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participant::Entity")]
    Participant,
    #[sea_orm(has_many = "super::game_history::Entity")]
    GameHistory,
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participant.def()
    }
}

impl Related<super::game_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
