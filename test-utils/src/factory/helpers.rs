//! Shared helper utilities for factory methods.
//!
//! Provides id generation used across all factories and convenience methods for
//! creating entities together with their dependencies.

use sea_orm::{DatabaseConnection, DbErr};

/// Counter for generating unique IDs in tests.
static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
///
/// # Returns
/// - `u64` - Next unique counter value
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates an active pacte with `players` registered users who have all signed.
///
/// # Arguments
/// - `db` - Database connection
/// - `objective` - Consecutive wins required
/// - `players` - Number of signed participants to create
///
/// # Returns
/// - `Ok((pacte, users))` - The active pacte and its participants' user rows
/// - `Err(DbErr)` - Database error during creation
pub async fn create_active_pacte_with_players(
    db: &DatabaseConnection,
    objective: i32,
    players: usize,
) -> Result<(entity::pacte::Model, Vec<entity::user::Model>), DbErr> {
    let pacte = crate::factory::pacte::PacteFactory::new(db)
        .objective(objective)
        .active()
        .build()
        .await?;

    let mut users = Vec::with_capacity(players);
    for _ in 0..players {
        let user = crate::factory::user::create_user(db).await?;
        crate::factory::participant::create_signed_participant(db, pacte.id, &user.discord_id)
            .await?;
        users.push(user);
    }

    Ok((pacte, users))
}

/// Creates a pending pacte whose participants have not signed yet.
///
/// # Arguments
/// - `db` - Database connection
/// - `objective` - Consecutive wins required
/// - `players` - Number of unsigned participants to create
///
/// # Returns
/// - `Ok((pacte, users))` - The pending pacte and its participants' user rows
/// - `Err(DbErr)` - Database error during creation
pub async fn create_pending_pacte_with_players(
    db: &DatabaseConnection,
    objective: i32,
    players: usize,
) -> Result<(entity::pacte::Model, Vec<entity::user::Model>), DbErr> {
    let pacte = crate::factory::pacte::PacteFactory::new(db)
        .objective(objective)
        .build()
        .await?;

    let mut users = Vec::with_capacity(players);
    for _ in 0..players {
        let user = crate::factory::user::create_user(db).await?;
        crate::factory::participant::create_participant(db, pacte.id, &user.discord_id).await?;
        users.push(user);
    }

    Ok((pacte, users))
}
