use super::*;

/// Tests ledger aggregates.
///
/// Expected: counts per outcome, distinct pactes and time bounds
#[tokio::test]
async fn aggregates_ledger() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let first = factory::create_pacte(db).await?;
    let second = factory::create_pacte(db).await?;
    let now = Utc::now();
    let oldest = now - Duration::hours(5);

    factory::game_history::GameHistoryFactory::new(db, first.id)
        .processed_at(oldest)
        .build()
        .await?;
    factory::game_history::GameHistoryFactory::new(db, first.id)
        .loss()
        .processed_at(now - Duration::hours(1))
        .build()
        .await?;
    factory::game_history::GameHistoryFactory::new(db, second.id)
        .processed_at(now)
        .build()
        .await?;

    let stats = GameHistoryRepository::new(db).stats().await?;

    assert_eq!(stats.total, 3);
    assert_eq!(stats.wins, 2);
    assert_eq!(stats.losses, 1);
    assert_eq!(stats.distinct_pactes, 2);
    assert_eq!(stats.oldest, Some(oldest));
    assert_eq!(stats.newest, Some(now));

    Ok(())
}
