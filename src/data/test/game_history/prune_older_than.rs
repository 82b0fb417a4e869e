use super::*;

/// Tests pruning old ledger rows.
///
/// Expected: only rows older than the retention are removed
#[tokio::test]
async fn prunes_rows_past_retention() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::create_pacte(db).await?;
    let now = Utc::now();
    factory::game_history::GameHistoryFactory::new(db, pacte.id)
        .processed_at(now - Duration::days(31))
        .build()
        .await?;
    factory::game_history::GameHistoryFactory::new(db, pacte.id)
        .processed_at(now - Duration::days(29))
        .build()
        .await?;

    let repo = GameHistoryRepository::new(db);
    let removed = repo.prune_older_than(30, now).await?;

    assert_eq!(removed, 1);
    assert_eq!(repo.history_for_pacte(pacte.id).await?.len(), 1);

    Ok(())
}
