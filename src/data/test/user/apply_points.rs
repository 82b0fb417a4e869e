use super::*;

/// Tests that point deltas hit both counters.
///
/// Expected: Ok with total and monthly moved by the same delta
#[tokio::test]
async fn applies_delta_to_total_and_monthly() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::UserFactory::new(db)
        .points_total(100)
        .points_monthly(20)
        .build()
        .await?;

    let repo = UserRepository::new(db);
    repo.apply_points(&user.discord_id, -30).await?;

    let stored = repo.find_by_discord_id(&user.discord_id).await?.unwrap();
    assert_eq!(stored.points_total, 70);
    assert_eq!(stored.points_monthly, -10);

    Ok(())
}

/// Tests that the best streak only ever rises.
///
/// Expected: raised from 2 to 4, untouched when offered 3 afterwards
#[tokio::test]
async fn raise_best_streak_is_monotonic() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::UserFactory::new(db)
        .best_streak_ever(2)
        .build()
        .await?;
    let ids = vec![user.discord_id.clone()];

    let repo = UserRepository::new(db);
    repo.raise_best_streak(&ids, 4).await?;
    repo.raise_best_streak(&ids, 3).await?;

    let stored = repo.find_by_discord_id(&user.discord_id).await?.unwrap();
    assert_eq!(stored.best_streak_ever, 4);

    Ok(())
}
