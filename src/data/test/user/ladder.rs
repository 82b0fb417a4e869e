use super::*;

/// Tests ladder ordering and filtering.
///
/// Expected: positive scores only, highest first, ranks starting at 1
#[tokio::test]
async fn ranks_positive_scores_descending() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let low = factory::user::UserFactory::new(db).points_total(10).build().await?;
    let high = factory::user::UserFactory::new(db).points_total(90).build().await?;
    factory::user::UserFactory::new(db).points_total(0).build().await?;
    factory::user::UserFactory::new(db).points_total(-20).build().await?;

    let ladder = UserRepository::new(db).ladder(LadderKind::Total, 10).await?;

    assert_eq!(ladder.len(), 2);
    assert_eq!(ladder[0].rank, 1);
    assert_eq!(ladder[0].discord_id, high.discord_id);
    assert_eq!(ladder[0].points, 90);
    assert_eq!(ladder[1].rank, 2);
    assert_eq!(ladder[1].discord_id, low.discord_id);

    Ok(())
}

/// Tests the monthly ladder and the row limit.
///
/// Expected: ranked by monthly points, truncated to the limit
#[tokio::test]
async fn monthly_ladder_respects_limit() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let top = factory::user::UserFactory::new(db)
        .points_total(5)
        .points_monthly(40)
        .build()
        .await?;
    factory::user::UserFactory::new(db)
        .points_total(500)
        .points_monthly(30)
        .build()
        .await?;

    let ladder = UserRepository::new(db).ladder(LadderKind::Monthly, 1).await?;

    assert_eq!(ladder.len(), 1);
    assert_eq!(ladder[0].discord_id, top.discord_id);
    assert_eq!(ladder[0].points, 40);

    Ok(())
}
