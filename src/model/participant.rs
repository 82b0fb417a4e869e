use chrono::{DateTime, Utc};

/// Membership of a user in a pacte.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub pacte_id: i32,
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
    pub kicked_at: Option<DateTime<Utc>>,
    pub kick_reason: Option<String>,
    pub kicked_by: Option<String>,
    /// Settled point delta for this pacte, negative for penalties.
    pub points_gained: i32,
}

impl Participant {
    pub fn from_entity(entity: entity::participant::Model) -> Self {
        Self {
            pacte_id: entity.pacte_id,
            user_id: entity.user_id,
            joined_at: entity.joined_at,
            signed_at: entity.signed_at,
            left_at: entity.left_at,
            kicked_at: entity.kicked_at,
            kick_reason: entity.kick_reason,
            kicked_by: entity.kicked_by,
            points_gained: entity.points_gained,
        }
    }

    /// Left voluntarily or was excluded.
    pub fn has_departed(&self) -> bool {
        self.left_at.is_some() || self.kicked_at.is_some()
    }

    /// Signed and still taking part.
    pub fn is_active(&self) -> bool {
        self.signed_at.is_some() && !self.has_departed()
    }
}

/// An exclusion as shown in a pacte's kick history.
#[derive(Debug, Clone, PartialEq)]
pub struct KickRecord {
    pub user_id: String,
    pub summoner_name: String,
    pub kicked_at: DateTime<Utc>,
    pub kick_reason: Option<String>,
    pub kicked_by: Option<String>,
    pub points_gained: i32,
}
