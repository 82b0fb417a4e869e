use super::*;

/// Tests creating a pacte with registered, unattached users.
///
/// Verifies that the pacte starts pending with zeroed progress and one unsigned
/// participant row per user.
///
/// Expected: Ok with pending pacte and three unsigned participants
#[tokio::test]
async fn creates_pending_pacte_with_unsigned_participants() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let a = factory::create_user(db).await?;
    let b = factory::create_user(db).await?;
    let c = factory::create_user(db).await?;

    let repo = PacteRepository::new(db);
    let pacte = repo
        .create(
            5,
            &[a.discord_id.clone(), b.discord_id.clone(), c.discord_id.clone()],
            "42",
            Utc::now(),
        )
        .await?;

    assert_eq!(pacte.status, PacteStatus::Pending);
    assert_eq!(pacte.objective, 5);
    assert_eq!(pacte.current_wins, 0);
    assert_eq!(pacte.channel_id, "42");
    assert!(pacte.started_at.is_none());

    let participants = repo.participants(pacte.id).await?;
    assert_eq!(participants.len(), 3);
    assert!(participants.iter().all(|p| p.signed_at.is_none()));

    Ok(())
}

/// Tests that duplicate ids collapse into a single participant.
///
/// Expected: Ok with two participants for three ids containing one duplicate
#[tokio::test]
async fn collapses_duplicate_participants() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let a = factory::create_user(db).await?;
    let b = factory::create_user(db).await?;

    let repo = PacteRepository::new(db);
    let pacte = repo
        .create(
            3,
            &[a.discord_id.clone(), b.discord_id.clone(), a.discord_id.clone()],
            "42",
            Utc::now(),
        )
        .await?;

    assert_eq!(repo.participants(pacte.id).await?.len(), 2);

    Ok(())
}

/// Tests objective bounds.
///
/// Expected: Err(InvalidObjective) for 2 and 11
#[tokio::test]
async fn rejects_objective_out_of_range() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let repo = PacteRepository::new(db);

    for objective in [2, 11] {
        let result = repo
            .create(objective, &[user.discord_id.clone()], "42", Utc::now())
            .await;
        assert_eq!(
            result.unwrap_err().as_pacte_error(),
            Some(&PacteError::InvalidObjective(objective))
        );
    }

    Ok(())
}

/// Tests the participant count bounds.
///
/// Expected: Err(InvalidParticipantCount) for zero and six participants
#[tokio::test]
async fn rejects_invalid_participant_count() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = PacteRepository::new(db);

    let empty = repo.create(3, &[], "42", Utc::now()).await;
    assert_eq!(
        empty.unwrap_err().as_pacte_error(),
        Some(&PacteError::InvalidParticipantCount(0))
    );

    let mut ids = Vec::new();
    for _ in 0..6 {
        ids.push(factory::create_user(db).await?.discord_id);
    }
    let crowded = repo.create(3, &ids, "42", Utc::now()).await;
    assert_eq!(
        crowded.unwrap_err().as_pacte_error(),
        Some(&PacteError::InvalidParticipantCount(6))
    );

    Ok(())
}

/// Tests that unregistered users cannot be enrolled.
///
/// Expected: Err(UserNotRegistered) and no pacte row created
#[tokio::test]
async fn rejects_unregistered_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let repo = PacteRepository::new(db);

    let result = repo
        .create(
            3,
            &[user.discord_id.clone(), "ghost".to_string()],
            "42",
            Utc::now(),
        )
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::UserNotRegistered("ghost".to_string()))
    );
    assert!(entity::prelude::Pacte::find().all(db).await?.is_empty());

    Ok(())
}

/// Tests that a user cannot be in two open pactes at once.
///
/// Expected: Err(AlreadyInPacte) for a user already in an active pacte
#[tokio::test]
async fn rejects_user_already_in_open_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_, users) = factory::helpers::create_active_pacte_with_players(db, 3, 1).await?;
    let busy = users[0].discord_id.clone();

    let result = PacteRepository::new(db)
        .create(3, &[busy.clone()], "42", Utc::now())
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::AlreadyInPacte(busy))
    );

    Ok(())
}

/// Tests that membership in a finished pacte does not block a new one.
///
/// Expected: Ok when the user's only pacte has failed
#[tokio::test]
async fn allows_user_from_finished_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::create_user(db).await?;
    let old = factory::pacte::PacteFactory::new(db)
        .status("failed")
        .completed_at(Utc::now())
        .build()
        .await?;
    factory::create_signed_participant(db, old.id, &user.discord_id).await?;

    let result = PacteRepository::new(db)
        .create(3, &[user.discord_id.clone()], "42", Utc::now())
        .await;

    assert!(result.is_ok());

    Ok(())
}
