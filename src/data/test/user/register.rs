use super::*;

fn param(discord_id: &str, puuid: &str) -> RegisterUserParam {
    RegisterUserParam {
        discord_id: discord_id.to_string(),
        riot_puuid: puuid.to_string(),
        summoner_name: "Faker#KR1".to_string(),
    }
}

/// Tests registering a new player.
///
/// Expected: Ok with zeroed counters
#[tokio::test]
async fn registers_new_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = UserRepository::new(db)
        .register(param("100", "puuid-a"), Utc::now())
        .await?;

    assert_eq!(user.discord_id, "100");
    assert_eq!(user.riot_puuid, "puuid-a");
    assert_eq!(user.points_total, 0);
    assert_eq!(user.best_streak_ever, 0);

    Ok(())
}

/// Tests registering twice with the same Discord account.
///
/// Expected: Err(AlreadyRegistered)
#[tokio::test]
async fn rejects_duplicate_discord_id() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    repo.register(param("100", "puuid-a"), Utc::now()).await?;
    let result = repo.register(param("100", "puuid-b"), Utc::now()).await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::AlreadyRegistered("100".to_string()))
    );

    Ok(())
}

/// Tests linking a game account that belongs to someone else.
///
/// Expected: Err(AccountAlreadyLinked)
#[tokio::test]
async fn rejects_account_linked_elsewhere() -> Result<(), AppError> {
    let test = TestBuilder::new().with_pacte_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    repo.register(param("100", "puuid-a"), Utc::now()).await?;
    let result = repo.register(param("200", "puuid-a"), Utc::now()).await;

    assert_eq!(
        result.unwrap_err().as_pacte_error(),
        Some(&PacteError::AccountAlreadyLinked)
    );

    Ok(())
}
