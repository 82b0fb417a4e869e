use super::*;

/// Tests a voluntary departure from a pacte that keeps running.
///
/// Expected: Ok with malus recorded, user debited and pacte still active
#[tokio::test]
async fn leaves_and_debits_malus() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 4, 2).await?;
    let leaver = users[0].discord_id.clone();

    let repo = PacteRepository::new(db);
    let outcome = repo.leave(pacte.id, &leaver, 20, Utc::now()).await?;

    assert_eq!(outcome.remaining_count, 1);
    assert!(!outcome.pacte_failed);
    assert_eq!(outcome.malus, 20);

    let row = entity::prelude::Participant::find_by_id((pacte.id, leaver.clone()))
        .one(db)
        .await?
        .unwrap();
    assert!(row.left_at.is_some());
    assert_eq!(row.points_gained, -20);

    let user = entity::prelude::User::find_by_id(leaver).one(db).await?.unwrap();
    assert_eq!(user.points_total, -20);
    assert_eq!(user.points_monthly, -20);

    let stored = repo.find_by_id(pacte.id).await?.unwrap();
    assert_eq!(stored.status, PacteStatus::Active);

    Ok(())
}

/// Tests the last active participant leaving.
///
/// Expected: Ok with pacte_failed and the pacte stored as failed
#[tokio::test]
async fn last_departure_fails_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 1).await?;

    let repo = PacteRepository::new(db);
    let outcome = repo
        .leave(pacte.id, &users[0].discord_id, 10, Utc::now())
        .await?;

    assert_eq!(outcome.remaining_count, 0);
    assert!(outcome.pacte_failed);

    let stored = repo.find_by_id(pacte.id).await?.unwrap();
    assert_eq!(stored.status, PacteStatus::Failed);
    assert!(stored.completed_at.is_some());

    Ok(())
}

/// Tests leaving twice.
///
/// Expected: Err(NotActiveParticipant) on the second attempt with no second debit
#[tokio::test]
async fn rejects_second_departure() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 2).await?;
    let leaver = users[0].discord_id.clone();

    let repo = PacteRepository::new(db);
    repo.leave(pacte.id, &leaver, 10, Utc::now()).await?;
    let result = repo.leave(pacte.id, &leaver, 10, Utc::now()).await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::NotActiveParticipant(leaver.clone()))
    );

    let user = entity::prelude::User::find_by_id(leaver).one(db).await?.unwrap();
    assert_eq!(user.points_total, -10);

    Ok(())
}

/// Tests leaving a finished pacte.
///
/// Expected: Err(PacteClosed)
#[tokio::test]
async fn rejects_departure_from_closed_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let pacte = factory::pacte::PacteFactory::new(db)
        .status("success")
        .build()
        .await?;
    factory::create_signed_participant(db, pacte.id, &user.discord_id).await?;

    let result = PacteRepository::new(db)
        .leave(pacte.id, &user.discord_id, 10, Utc::now())
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::PacteClosed(pacte.id))
    );

    Ok(())
}

/// Tests a departure that leaves two active participants behind.
///
/// Expected: Ok with remaining_count 2 and the pacte still active
#[tokio::test]
async fn departure_with_two_remaining_keeps_pacte_active() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 3).await?;

    let repo = PacteRepository::new(db);
    let outcome = repo
        .leave(pacte.id, &users[2].discord_id, 10, Utc::now())
        .await?;

    assert_eq!(outcome.remaining_count, 2);
    assert!(!outcome.pacte_failed);

    let stored = repo.find_by_id(pacte.id).await?.unwrap();
    assert_eq!(stored.status, PacteStatus::Active);
    assert!(stored.completed_at.is_none());

    Ok(())
}
