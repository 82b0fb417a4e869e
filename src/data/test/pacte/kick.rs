use super::*;

/// Tests excluding a participant.
///
/// Expected: Ok with kick columns stamped and the target debited
#[tokio::test]
async fn kicks_participant() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 4, 3).await?;
    let kicker = users[0].discord_id.clone();
    let target = users[1].discord_id.clone();

    let repo = PacteRepository::new(db);
    let outcome = repo
        .kick(pacte.id, &target, &kicker, 15, "afk", Utc::now())
        .await?;

    assert_eq!(outcome.remaining_count, 2);
    assert!(!outcome.pacte_failed);

    let history = repo.kick_history(pacte.id).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].user_id, target);
    assert_eq!(history[0].kicked_by.as_deref(), Some(kicker.as_str()));
    assert_eq!(history[0].kick_reason.as_deref(), Some("afk"));
    assert_eq!(history[0].points_gained, -15);

    let user = entity::prelude::User::find_by_id(target).one(db).await?.unwrap();
    assert_eq!(user.points_total, -15);

    Ok(())
}

/// Tests a participant kicking themselves.
///
/// Expected: Err(CannotKickSelf)
#[tokio::test]
async fn rejects_self_kick() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 2).await?;
    let me = users[0].discord_id.clone();

    let result = PacteRepository::new(db)
        .kick(pacte.id, &me, &me, 10, "", Utc::now())
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::CannotKickSelf)
    );

    Ok(())
}

/// Tests a kick requested by someone outside the pacte.
///
/// Expected: Err(NotActiveParticipant) naming the kicker, target untouched
#[tokio::test]
async fn rejects_kick_by_outsider() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 2).await?;
    let outsider = factory::create_user(db).await?;
    let target = users[0].discord_id.clone();

    let repo = PacteRepository::new(db);
    let result = repo
        .kick(pacte.id, &target, &outsider.discord_id, 10, "", Utc::now())
        .await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::NotActiveParticipant(outsider.discord_id.clone()))
    );
    assert!(repo.kick_history(pacte.id).await?.is_empty());

    Ok(())
}

/// Tests kicking the last other participant of a two-player pacte.
///
/// The kicker remains, so the pacte keeps running.
///
/// Expected: Ok with one remaining and the pacte still active
#[tokio::test]
async fn kick_keeps_pacte_with_one_remaining() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (pacte, users) = factory::helpers::create_active_pacte_with_players(db, 3, 2).await?;

    let repo = PacteRepository::new(db);
    let outcome = repo
        .kick(
            pacte.id,
            &users[1].discord_id,
            &users[0].discord_id,
            10,
            "toxic",
            Utc::now(),
        )
        .await?;

    assert_eq!(outcome.remaining_count, 1);
    assert!(!outcome.pacte_failed);
    assert_eq!(
        repo.find_by_id(pacte.id).await?.unwrap().status,
        PacteStatus::Active
    );

    Ok(())
}
