use super::*;

/// Tests recording a match once.
///
/// Expected: true on first insert, false on the duplicate, one row stored
#[tokio::test]
async fn records_match_once_per_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::create_pacte(db).await?;
    let repo = GameHistoryRepository::new(db);

    let first = repo
        .record("EUW1_1", pacte.id, MatchOutcome::Win, Utc::now())
        .await?;
    let second = repo
        .record("EUW1_1", pacte.id, MatchOutcome::Loss, Utc::now())
        .await?;

    assert!(first);
    assert!(!second);
    assert!(repo.is_processed("EUW1_1", pacte.id).await?);

    let history = repo.history_for_pacte(pacte.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outcome, MatchOutcome::Win);

    Ok(())
}

/// Tests that the same match may count for two different pactes.
///
/// Expected: true for both pactes
#[tokio::test]
async fn same_match_counts_for_distinct_pactes() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let first = factory::create_pacte(db).await?;
    let second = factory::create_pacte(db).await?;
    let repo = GameHistoryRepository::new(db);

    assert!(repo
        .record("EUW1_9", first.id, MatchOutcome::Win, Utc::now())
        .await?);
    assert!(repo
        .record("EUW1_9", second.id, MatchOutcome::Win, Utc::now())
        .await?);

    Ok(())
}
