use super::*;

/// Tests recording a detected live match.
///
/// Expected: Ok with in_game set and the game id stored
#[tokio::test]
async fn match_started_sets_in_game() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db).active().build().await?;
    let now = Utc::now();

    let updated = PacteRepository::new(db)
        .apply_update(
            pacte.id,
            PacteUpdate::MatchStarted {
                game_id: "7000".to_string(),
            },
            now,
        )
        .await?;

    assert!(updated.in_game);
    assert_eq!(updated.current_game_id.as_deref(), Some("7000"));
    assert_eq!(updated.match_started_at, Some(now));

    Ok(())
}

/// Tests that a win clears the in-game state and advances the counters.
///
/// Expected: Ok with current_wins 2, best 2, not in game
#[tokio::test]
async fn record_win_advances_streak() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db)
        .objective(5)
        .active()
        .current_wins(1)
        .in_game("7000", Utc::now())
        .build()
        .await?;

    let updated = PacteRepository::new(db)
        .apply_update(
            pacte.id,
            PacteUpdate::RecordWin {
                current_wins: 2,
                best_streak_reached: 2,
            },
            Utc::now(),
        )
        .await?;

    assert_eq!(updated.current_wins, 2);
    assert_eq!(updated.best_streak_reached, 2);
    assert!(!updated.in_game);
    assert!(updated.current_game_id.is_none());
    assert!(updated.result_pending_since.is_none());

    Ok(())
}

/// Tests a win beyond the objective.
///
/// Expected: Err(InvariantViolation) and the row unchanged
#[tokio::test]
async fn rejects_wins_above_objective() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db)
        .objective(3)
        .active()
        .current_wins(3)
        .build()
        .await?;

    let repo = PacteRepository::new(db);
    let result = repo
        .apply_update(
            pacte.id,
            PacteUpdate::RecordWin {
                current_wins: 4,
                best_streak_reached: 4,
            },
            Utc::now(),
        )
        .await;

    assert!(matches!(
        result.unwrap_err().as_pacte_error(),
        Some(PacteError::InvariantViolation { .. })
    ));
    assert_eq!(repo.find_by_id(pacte.id).await?.unwrap().current_wins, 3);

    Ok(())
}

/// Tests that the best streak never decreases.
///
/// Expected: Err(InvariantViolation) for a loss lowering best_streak_reached
#[tokio::test]
async fn rejects_lowering_best_streak() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db)
        .objective(5)
        .active()
        .current_wins(1)
        .best_streak_reached(3)
        .build()
        .await?;

    let result = PacteRepository::new(db)
        .apply_update(
            pacte.id,
            PacteUpdate::RecordLoss {
                best_streak_reached: 2,
            },
            Utc::now(),
        )
        .await;

    assert!(matches!(
        result.unwrap_err().as_pacte_error(),
        Some(PacteError::InvariantViolation { .. })
    ));

    Ok(())
}

/// Tests that a loss resets the streak but keeps the best.
///
/// Expected: Ok with current_wins 0 and best_streak_reached 2
#[tokio::test]
async fn record_loss_resets_streak() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db)
        .objective(5)
        .active()
        .current_wins(2)
        .build()
        .await?;

    let updated = PacteRepository::new(db)
        .apply_update(
            pacte.id,
            PacteUpdate::RecordLoss {
                best_streak_reached: 2,
            },
            Utc::now(),
        )
        .await?;

    assert_eq!(updated.current_wins, 0);
    assert_eq!(updated.best_streak_reached, 2);

    Ok(())
}

/// Tests updates on a pacte that is not active.
///
/// Expected: Err(NotActive) for pending and finished pactes
#[tokio::test]
async fn rejects_updates_on_inactive_pacte() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pending = factory::create_pacte(db).await?;
    let done = factory::pacte::PacteFactory::new(db)
        .status("success")
        .build()
        .await?;

    let repo = PacteRepository::new(db);
    for id in [pending.id, done.id] {
        let result = repo
            .apply_update(id, PacteUpdate::MarkChecked, Utc::now())
            .await;
        assert_eq!(
            result.unwrap_err().as_pacte_error(),
            Some(&PacteError::NotActive(id))
        );
    }

    Ok(())
}

/// Tests the error counter lifecycle.
///
/// Expected: IncrementErrorCount raises it, MarkChecked clears it and stamps the check
#[tokio::test]
async fn error_count_cleared_by_successful_check() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db)
        .active()
        .error_count(2)
        .build()
        .await?;
    let repo = PacteRepository::new(db);

    let raised = repo
        .apply_update(pacte.id, PacteUpdate::IncrementErrorCount, Utc::now())
        .await?;
    assert_eq!(raised.error_count, 3);

    let now = Utc::now();
    let checked = repo
        .apply_update(pacte.id, PacteUpdate::MarkChecked, now)
        .await?;
    assert_eq!(checked.error_count, 0);
    assert_eq!(checked.last_checked_at, Some(now));

    Ok(())
}

/// Tests the technical reset.
///
/// Expected: Ok with in-game state and error count cleared, progress kept
#[tokio::test]
async fn technical_reset_clears_match_state() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let pacte = factory::pacte::PacteFactory::new(db)
        .objective(5)
        .active()
        .current_wins(2)
        .in_game("7000", Utc::now())
        .error_count(5)
        .build()
        .await?;

    let updated = PacteRepository::new(db)
        .apply_update(pacte.id, PacteUpdate::TechnicalReset, Utc::now())
        .await?;

    assert!(!updated.in_game);
    assert!(updated.current_game_id.is_none());
    assert_eq!(updated.error_count, 0);
    assert_eq!(updated.current_wins, 2);

    Ok(())
}
