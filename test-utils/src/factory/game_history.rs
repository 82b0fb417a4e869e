//! Ledger row factory for already-processed matches.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating processed-match ledger rows.
///
/// Defaults to a win processed now with a unique `EUW1_{id}` match id.
pub struct GameHistoryFactory<'a> {
    db: &'a DatabaseConnection,
    match_id: String,
    pacte_id: i32,
    result: String,
    processed_at: DateTime<Utc>,
}

impl<'a> GameHistoryFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, pacte_id: i32) -> Self {
        Self {
            db,
            match_id: format!("EUW1_{}", next_id()),
            pacte_id,
            result: "win".to_string(),
            processed_at: Utc::now(),
        }
    }

    pub fn match_id(mut self, match_id: impl Into<String>) -> Self {
        self.match_id = match_id.into();
        self
    }

    pub fn loss(mut self) -> Self {
        self.result = "loss".to_string();
        self
    }

    pub fn processed_at(mut self, at: DateTime<Utc>) -> Self {
        self.processed_at = at;
        self
    }

    pub async fn build(self) -> Result<entity::game_history::Model, DbErr> {
        entity::game_history::ActiveModel {
            match_id: ActiveValue::Set(self.match_id),
            pacte_id: ActiveValue::Set(self.pacte_id),
            result: ActiveValue::Set(self.result),
            processed_at: ActiveValue::Set(self.processed_at),
        }
        .insert(self.db)
        .await
    }
}

/// Records a won match for the pacte.
pub async fn create_game_history(
    db: &DatabaseConnection,
    pacte_id: i32,
) -> Result<entity::game_history::Model, DbErr> {
    GameHistoryFactory::new(db, pacte_id).build().await
}
