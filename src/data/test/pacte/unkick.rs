use super::*;

/// Tests that kicking then unkicking restores the user's points.
///
/// Expected: Ok with the malus refunded and the participant active again
#[tokio::test]
async fn unkick_refunds_kick_malus() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 4, 3).await?;
    let target = users[2].discord_id.clone();

    let repo = PacteRepository::new(db);
    repo.kick(pacte.id, &target, &users[0].discord_id, 15, "afk", Utc::now())
        .await?;
    let outcome = repo.unkick(pacte.id, &target).await?;

    assert_eq!(outcome.refunded, 15);

    let user = entity::prelude::User::find_by_id(target.clone())
        .one(db)
        .await?
        .unwrap();
    assert_eq!(user.points_total, 0);
    assert_eq!(user.points_monthly, 0);

    let active = repo.active_participants(pacte.id).await?;
    assert!(active.iter().any(|u| u.discord_id == target));
    assert!(repo.kick_history(pacte.id).await?.is_empty());

    Ok(())
}

/// Tests unkicking someone who was never kicked.
///
/// Expected: Err(NotKicked)
#[tokio::test]
async fn rejects_unkick_of_present_participant() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 2).await?;
    let target = users[0].discord_id.clone();

    let result = PacteRepository::new(db).unkick(pacte.id, &target).await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::NotKicked(target))
    );

    Ok(())
}

/// Tests unkicking on a finished pacte.
///
/// Expected: Err(PacteClosed)
#[tokio::test]
async fn rejects_unkick_on_closed_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let kicker = factory::create_user(db).await?;
    let target = factory::create_user(db).await?;
    let pacte = factory::pacte::PacteFactory::new(db)
        .status("failed")
        .build()
        .await?;
    factory::participant::ParticipantFactory::new(db, pacte.id, &target.discord_id)
        .signed()
        .kicked(&kicker.discord_id, "afk")
        .points_gained(-10)
        .build()
        .await?;

    let result = PacteRepository::new(db)
        .unkick(pacte.id, &target.discord_id)
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::PacteClosed(pacte.id))
    );

    Ok(())
}

/// Tests unkicking after a newcomer took the freed slot of a full pacte.
///
/// Expected: Err(PacteFull) and the target stays excluded with their malus
#[tokio::test]
async fn rejects_unkick_when_slot_was_taken() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 4, 5).await?;
    let target = users[4].discord_id.clone();
    let newcomer = factory::create_user(db).await?;

    let repo = PacteRepository::new(db);
    repo.kick(pacte.id, &target, &users[0].discord_id, 15, "afk", Utc::now())
        .await?;
    repo.join(pacte.id, &newcomer.discord_id, Utc::now()).await?;
    repo.sign(pacte.id, &newcomer.discord_id, Utc::now()).await?;

    let result = repo.unkick(pacte.id, &target).await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::PacteFull)
    );
    assert_eq!(repo.active_participants(pacte.id).await?.len(), 5);
    assert_eq!(repo.kick_history(pacte.id).await?.len(), 1);

    let user = entity::prelude::User::find_by_id(target).one(db).await?.unwrap();
    assert_eq!(user.points_total, -15);

    Ok(())
}

/// Tests unkicking a user who has since entered another pacte.
///
/// Expected: Err(AlreadyInPacte) and the user keeps a single open membership
#[tokio::test]
async fn rejects_unkick_of_user_in_another_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 4, 3).await?;
    let target = users[2].discord_id.clone();

    let repo = PacteRepository::new(db);
    repo.kick(pacte.id, &target, &users[0].discord_id, 15, "afk", Utc::now())
        .await?;
    let other = repo
        .create(3, &[target.clone()], "channel-elsewhere", Utc::now())
        .await?;

    let result = repo.unkick(pacte.id, &target).await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::AlreadyInPacte(target.clone()))
    );
    assert_eq!(
        repo.current_for_user(&target).await?.map(|p| p.id),
        Some(other.id)
    );
    assert_eq!(repo.active_participants(pacte.id).await?.len(), 2);

    Ok(())
}
