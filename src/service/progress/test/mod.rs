use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use test_utils::{builder::TestBuilder, factory};

use crate::{
    data::game_history::GameHistoryRepository,
    error::{observer::ObserverError, AppError},
    model::{
        event::{PacteEvent, PacteEventKind},
        game_history::RejectReason,
        pacte::{Pacte, PacteStatus},
    },
    service::{
        event::EventBus,
        observer::{Account, CompletedMatch, GameObserver, LiveMatch, ARAM_QUEUE_ID},
        progress::{EnginePolicy, ProgressEngine, TickOutcome},
    },
};


/// Scripted observer: live matches per account, one completed match for everybody.
#[derive(Default)]
struct MockObserver {
    live: Mutex<HashMap<String, String>>,
    completed: Mutex<Option<CompletedMatch>>,
    failing: Mutex<HashSet<String>>,
}

impl MockObserver {
    fn put_in_game(&self, accounts: &[String], game_id: &str) {
        let mut live = self.live.lock().unwrap();
        for account in accounts {
            live.insert(account.clone(), game_id.to_string());
        }
    }

    fn end_game(&self) {
        self.live.lock().unwrap().clear();
    }

    fn complete(&self, result: Option<CompletedMatch>) {
        *self.completed.lock().unwrap() = result;
    }

    fn fail_for(&self, account: &str) {
        self.failing.lock().unwrap().insert(account.to_string());
    }
}

#[async_trait]
impl GameObserver for MockObserver {
    async fn live_match(
        &self,
        account_id: &str,
        _platform: &str,
    ) -> Result<Option<LiveMatch>, ObserverError> {
        if self.failing.lock().unwrap().contains(account_id) {
            return Err(ObserverError::Timeout);
        }

        Ok(self
            .live
            .lock()
            .unwrap()
            .get(account_id)
            .map(|game_id| LiveMatch {
                game_id: game_id.clone(),
                queue_id: ARAM_QUEUE_ID,
                started_at: None,
            }))
    }

    async fn last_completed_match(
        &self,
        _account_ids: &[String],
        _lookback: u32,
    ) -> Result<Option<CompletedMatch>, ObserverError> {
        Ok(self.completed.lock().unwrap().clone())
    }

    async fn resolve_account(
        &self,
        _game_name: &str,
        _tag_line: &str,
    ) -> Result<Option<Account>, ObserverError> {
        Ok(None)
    }
}

/// Policy without check throttling or lookup delay so every cycle does work.
fn test_policy() -> EnginePolicy {
    EnginePolicy {
        min_check_interval: Duration::zero(),
        lookup_delay: Duration::zero(),
        ..EnginePolicy::default()
    }
}

struct Harness {
    engine: ProgressEngine,
    observer: Arc<MockObserver>,
    events: tokio::sync::broadcast::Receiver<PacteEvent>,
}

fn harness(db: &DatabaseConnection, policy: EnginePolicy) -> Harness {
    let observer = Arc::new(MockObserver::default());
    let bus = EventBus::new(64);
    let events = bus.subscribe();
    let engine = ProgressEngine::new(db.clone(), observer.clone(), bus, policy, "euw1");

    Harness {
        engine,
        observer,
        events,
    }
}

impl Harness {
    async fn cycle(&self, pacte_id: i32, now: DateTime<Utc>) -> Result<Option<TickOutcome>, AppError> {
        let report = self.engine.run_cycle(now).await?.unwrap();
        Ok(report.outcome_for(pacte_id))
    }

    fn drain(&mut self) -> Vec<PacteEventKind> {
        let mut kinds = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            kinds.push(event.kind);
        }
        kinds
    }

    /// Plays one full match: detection, exit, grace tick, result lookup.
    async fn play(
        &self,
        pacte_id: i32,
        accounts: &[String],
        match_id: &str,
        win: bool,
        now: &mut DateTime<Utc>,
    ) -> Result<Option<TickOutcome>, AppError> {
        self.observer.put_in_game(accounts, match_id);
        assert_eq!(self.cycle(pacte_id, *now).await?, Some(TickOutcome::MatchStarted));

        *now += Duration::minutes(18);
        self.observer.end_game();
        assert_eq!(self.cycle(pacte_id, *now).await?, Some(TickOutcome::AwaitingResult));

        *now += Duration::minutes(1);
        self.observer.complete(Some(CompletedMatch {
            match_id: match_id.to_string(),
            win,
            ended_at: *now - Duration::seconds(50),
            duration_seconds: 1080,
        }));
        let outcome = self.cycle(pacte_id, *now).await?;
        self.observer.complete(None);

        Ok(outcome)
    }
}

fn puuids(users: &[entity::user::Model]) -> Vec<String> {
    users.iter().map(|u| u.riot_puuid.clone()).collect()
}
