use super::*;

/// Tests expiry of pending pactes past the signature window.
///
/// Expected: Ok with only the old pending pacte failed
#[tokio::test]
async fn expires_only_old_pending_pactes() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let old = factory::pacte::PacteFactory::new(db)
        .created_at(now - Duration::minutes(10))
        .build()
        .await?;
    let fresh = factory::pacte::PacteFactory::new(db)
        .created_at(now - Duration::minutes(1))
        .build()
        .await?;
    let old_active = factory::pacte::PacteFactory::new(db)
        .created_at(now - Duration::minutes(10))
        .active()
        .build()
        .await?;

    let repo = PacteRepository::new(db);
    let expired = repo.expire_unsigned(Duration::minutes(5), now).await?;

    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, old.id);

    assert_eq!(
        repo.find_by_id(old.id).await?.unwrap().status,
        PacteStatus::Failed
    );
    assert_eq!(
        repo.find_by_id(fresh.id).await?.unwrap().status,
        PacteStatus::Pending
    );
    assert_eq!(
        repo.find_by_id(old_active.id).await?.unwrap().status,
        PacteStatus::Active
    );

    Ok(())
}

/// Tests expiry with nothing to expire.
///
/// Expected: Ok with an empty list
#[tokio::test]
async fn returns_empty_when_nothing_expired() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_pacte(db).await?;

    let expired = PacteRepository::new(db)
        .expire_unsigned(Duration::minutes(5), Utc::now())
        .await?;

    assert!(expired.is_empty());

    Ok(())
}
