use super::*;

/// Tests statistics over signed pactes.
///
/// Expected: unsigned pacte ignored, success counted, points summed
#[tokio::test]
async fn aggregates_signed_pactes() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;

    let won = factory::pacte::PacteFactory::new(db)
        .status("success")
        .current_wins(3)
        .build()
        .await?;
    let lost = factory::pacte::PacteFactory::new(db)
        .status("failed")
        .best_streak_reached(2)
        .build()
        .await?;
    let expired = factory::pacte::PacteFactory::new(db)
        .status("failed")
        .build()
        .await?;

    factory::participant::ParticipantFactory::new(db, won.id, &user.discord_id)
        .signed()
        .points_gained(50)
        .build()
        .await?;
    factory::participant::ParticipantFactory::new(db, lost.id, &user.discord_id)
        .signed()
        .points_gained(-10)
        .build()
        .await?;
    factory::create_participant(db, expired.id, &user.discord_id).await?;

    let stats = UserRepository::new(db)
        .stats(&user.discord_id)
        .await?
        .unwrap();

    assert_eq!(stats.total_pactes, 2);
    assert_eq!(stats.pactes_success, 1);
    assert_eq!(stats.success_rate(), 50);
    assert_eq!(stats.best_streak, 3);
    assert_eq!(stats.points_from_pactes, 40);

    Ok(())
}

/// Tests statistics for an unknown user.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    assert!(UserRepository::new(db).stats("nobody").await?.is_none());

    Ok(())
}
