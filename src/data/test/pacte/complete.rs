use super::*;

/// Tests completing a successful pacte.
///
/// Expected: Ok with every active participant paid and the pacte marked success
#[tokio::test]
async fn success_pays_active_participants() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 2).await?;
    let gone = factory::create_user(db).await?;
    factory::participant::ParticipantFactory::new(db, pacte.id, &gone.discord_id)
        .signed()
        .left()
        .points_gained(-10)
        .build()
        .await?;

    let repo = PacteRepository::new(db);
    let paid = repo.complete(pacte.id, true, 50, Utc::now()).await?;

    assert_eq!(paid.len(), 2);
    assert!(!paid.contains(&gone.discord_id));

    let stored = repo.find_by_id(pacte.id).await?.unwrap();
    assert_eq!(stored.status, PacteStatus::Success);
    assert!(stored.completed_at.is_some());

    for user in &users {
        let row = entity::prelude::User::find_by_id(user.discord_id.clone())
            .one(db)
            .await?
            .unwrap();
        assert_eq!(row.points_total, 50);
        assert_eq!(row.points_monthly, 50);
    }

    let departed = entity::prelude::Participant::find_by_id((pacte.id, gone.discord_id.clone()))
        .one(db)
        .await?
        .unwrap();
    assert_eq!(departed.points_gained, -10);

    Ok(())
}

/// Tests completing a failed pacte with a negative settlement.
///
/// Expected: Ok with participants debited and the pacte marked failed
#[tokio::test]
async fn failure_applies_negative_points() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 5, 1).await?;

    let repo = PacteRepository::new(db);
    repo.complete(pacte.id, false, -26, Utc::now()).await?;

    let stored = repo.find_by_id(pacte.id).await?.unwrap();
    assert_eq!(stored.status, PacteStatus::Failed);

    let participant =
        entity::prelude::Participant::find_by_id((pacte.id, users[0].discord_id.clone()))
            .one(db)
            .await?
            .unwrap();
    assert_eq!(participant.points_gained, -26);

    Ok(())
}

/// Tests completing the same pacte twice.
///
/// Expected: Err(AlreadyTerminal) and no second payment
#[tokio::test]
async fn rejects_second_completion() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 1).await?;

    let repo = PacteRepository::new(db);
    repo.complete(pacte.id, true, 50, Utc::now()).await?;
    let second = repo.complete(pacte.id, true, 50, Utc::now()).await;

    assert_eq!(
        second.unwrap_err().as_pacte_error(),
        Some(&PacteError::AlreadyTerminal(pacte.id))
    );

    let user = entity::prelude::User::find_by_id(users[0].discord_id.clone())
        .one(db)
        .await?
        .unwrap();
    assert_eq!(user.points_total, 50);

    Ok(())
}

/// Tests completing a pacte that never activated.
///
/// Expected: Err(NotActive)
#[tokio::test]
async fn rejects_completion_of_pending_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::create_pacte(db).await?;

    let result = PacteRepository::new(db)
        .complete(pacte.id, true, 50, Utc::now())
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::NotActive(pacte.id))
    );

    Ok(())
}
