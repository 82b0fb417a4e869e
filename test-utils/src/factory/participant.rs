//! Participant factory for pacte membership rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating pacte participants.
///
/// Defaults to an unsigned, present member with no settled points.
pub struct ParticipantFactory<'a> {
    db: &'a DatabaseConnection,
    pacte_id: i32,
    user_id: String,
    signed_at: Option<DateTime<Utc>>,
    left_at: Option<DateTime<Utc>>,
    kicked_at: Option<DateTime<Utc>>,
    kick_reason: Option<String>,
    kicked_by: Option<String>,
    points_gained: i32,
}

impl<'a> ParticipantFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, pacte_id: i32, user_id: impl Into<String>) -> Self {
        Self {
            db,
            pacte_id,
            user_id: user_id.into(),
            signed_at: None,
            left_at: None,
            kicked_at: None,
            kick_reason: None,
            kicked_by: None,
            points_gained: 0,
        }
    }

    pub fn signed(mut self) -> Self {
        self.signed_at = Some(Utc::now());
        self
    }

    pub fn left(mut self) -> Self {
        self.left_at = Some(Utc::now());
        self
    }

    pub fn kicked(mut self, by: impl Into<String>, reason: impl Into<String>) -> Self {
        self.kicked_at = Some(Utc::now());
        self.kicked_by = Some(by.into());
        self.kick_reason = Some(reason.into());
        self
    }

    pub fn points_gained(mut self, points: i32) -> Self {
        self.points_gained = points;
        self
    }

    /// Builds and inserts the participant into the database.
    pub async fn build(self) -> Result<entity::participant::Model, DbErr> {
        entity::participant::ActiveModel {
            pacte_id: ActiveValue::Set(self.pacte_id),
            user_id: ActiveValue::Set(self.user_id),
            joined_at: ActiveValue::Set(Utc::now()),
            signed_at: ActiveValue::Set(self.signed_at),
            left_at: ActiveValue::Set(self.left_at),
            kicked_at: ActiveValue::Set(self.kicked_at),
            kick_reason: ActiveValue::Set(self.kick_reason),
            kicked_by: ActiveValue::Set(self.kicked_by),
            points_gained: ActiveValue::Set(self.points_gained),
        }
        .insert(self.db)
        .await
    }
}

/// Adds an unsigned participant to a pacte.
pub async fn create_participant(
    db: &DatabaseConnection,
    pacte_id: i32,
    user_id: &str,
) -> Result<entity::participant::Model, DbErr> {
    ParticipantFactory::new(db, pacte_id, user_id).build().await
}

/// Adds a participant who has already signed.
pub async fn create_signed_participant(
    db: &DatabaseConnection,
    pacte_id: i32,
    user_id: &str,
) -> Result<entity::participant::Model, DbErr> {
    ParticipantFactory::new(db, pacte_id, user_id)
        .signed()
        .build()
        .await
}
