use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::EntityTrait;
use test_utils::{builder::TestBuilder, factory};

use crate::{
    data::pacte::PacteRepository,
    error::{observer::ObserverError, pacte::PacteError, AppError},
    model::pacte::PacteStatus,
    service::{
        observer::{Account, CompletedMatch, GameObserver, LiveMatch},
        pacte::PacteService,
        user::UserService,
    },
};


/// Observer that only knows a fixed set of accounts.
struct AccountDirectory {
    accounts: Vec<Account>,
}

#[async_trait]
impl GameObserver for AccountDirectory {
    async fn live_match(
        &self,
        _account_id: &str,
        _platform: &str,
    ) -> Result<Option<LiveMatch>, ObserverError> {
        Ok(None)
    }

    async fn last_completed_match(
        &self,
        _account_ids: &[String],
        _lookback: u32,
    ) -> Result<Option<CompletedMatch>, ObserverError> {
        Ok(None)
    }

    async fn resolve_account(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Account>, ObserverError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| {
                a.game_name.eq_ignore_ascii_case(game_name) && a.tag_line.eq_ignore_ascii_case(tag_line)
            })
            .cloned())
    }
}

fn directory() -> AccountDirectory {
    AccountDirectory {
        accounts: vec![Account {
            puuid: "puuid-faker".to_string(),
            game_name: "Faker".to_string(),
            tag_line: "KR1".to_string(),
        }],
    }
}
