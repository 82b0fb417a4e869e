//! Pacte progress engine.
//!
//! One cycle walks every checkable pacte in turn and moves it through its in-game
//! state machine:
//!
//! - idle: the group is not in a live match; the time limit and the warning window are
//!   evaluated here
//! - in game: every active participant was seen in the same live match
//! - awaiting result: the group left the match, the result lookup waits `lookup_delay`
//!   and gives up after `give_up_after` (or `max_empty_polls`)
//!
//! A group seen in a different live match while a result is pending settles that result
//! first, then tracks the new match with a fresh grace window.
//!
//! A found result goes through the ledger gate and is applied together with the
//! ledger record in a single transaction. Events are published only after the commit,
//! so subscribers never hear about a change that was rolled back.

pub mod policy;

#[cfg(test)]
mod test;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    data::{game_history::GameHistoryRepository, pacte::PacteRepository, user::UserRepository},
    error::{pacte::PacteError, AppError},
    model::{
        event::{PacteEvent, PacteEventKind},
        game_history::{LedgerValidation, MatchOutcome, RejectReason},
        pacte::Pacte,
        update::PacteUpdate,
        user::User,
    },
    service::{
        event::EventBus,
        observer::{CompletedMatch, GameObserver},
        points,
    },
};

pub use policy::EnginePolicy;

/// What a single tick did to a pacte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No active participant left to observe.
    Skipped,
    /// Nothing to do.
    Idle,
    MatchStarted,
    /// Still playing the known live match.
    InGame,
    /// Out of the match, result not available yet.
    AwaitingResult,
    ResultUndetectable,
    ResultRejected(RejectReason),
    Win,
    Loss,
    Succeeded,
    TimedOut,
    WarningSent,
    /// The tick failed; the error was counted.
    Failed,
}

/// Summary of one engine cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub outcomes: Vec<(i32, TickOutcome)>,
}

impl CycleReport {
    pub fn checked(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == TickOutcome::Failed)
            .count()
    }

    /// Outcome recorded for a pacte in this cycle.
    pub fn outcome_for(&self, pacte_id: i32) -> Option<TickOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == pacte_id)
            .map(|(_, outcome)| *outcome)
    }
}

/// Drives active pactes from the observed game state.
pub struct ProgressEngine {
    db: DatabaseConnection,
    observer: Arc<dyn GameObserver>,
    bus: EventBus,
    policy: EnginePolicy,
    platform: String,
    cycle_lock: Mutex<()>,
}

impl ProgressEngine {
    /// Creates a new ProgressEngine.
    ///
    /// # Arguments
    /// - `db` - Database connection
    /// - `observer` - Source of live and completed match data
    /// - `bus` - Where events are published after commit
    /// - `policy` - Timing and threshold tunables
    /// - `platform` - Platform routing value used for live match lookups
    pub fn new(
        db: DatabaseConnection,
        observer: Arc<dyn GameObserver>,
        bus: EventBus,
        policy: EnginePolicy,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            db,
            observer,
            bus,
            policy,
            platform: platform.into(),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Runs one cycle over every checkable pacte.
    ///
    /// Pactes are processed one after another and a failing pacte never stops the
    /// cycle. A call made while another cycle is still running returns immediately.
    ///
    /// # Returns
    /// - `Ok(Some(CycleReport))` - The cycle ran
    /// - `Ok(None)` - Another cycle was already running
    /// - `Err(AppError)` - The checkable pactes could not be listed
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<Option<CycleReport>, AppError> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            tracing::debug!("Progress cycle still running, skipping this tick");
            return Ok(None);
        };

        let pactes = PacteRepository::new(&self.db)
            .list_checkable(self.policy.min_check_interval, now)
            .await?;

        let mut report = CycleReport::default();
        for pacte in pactes {
            let outcome = match self.tick(&pacte, now).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    if let Err(e) = self.record_failure(&pacte, &err, now).await {
                        tracing::error!(
                            "Failed to record progress error for pacte {}: {}",
                            pacte.id,
                            e
                        );
                    }
                    TickOutcome::Failed
                }
            };
            report.outcomes.push((pacte.id, outcome));
        }

        if report.checked() > 0 {
            tracing::debug!(
                "Progress cycle checked {} pacte(s), {} failed",
                report.checked(),
                report.failed()
            );
        }

        Ok(Some(report))
    }

    /// Advances a single pacte.
    async fn tick(&self, pacte: &Pacte, now: DateTime<Utc>) -> Result<TickOutcome, AppError> {
        let repo = PacteRepository::new(&self.db);

        let players = repo.active_participants(pacte.id).await?;
        if players.is_empty() {
            return Ok(TickOutcome::Skipped);
        }

        let outcome = if let Some(game_id) = self.group_live_match(&players).await? {
            if pacte.in_game && pacte.current_game_id.as_deref() == Some(game_id.as_str()) {
                TickOutcome::InGame
            } else {
                if pacte.in_game {
                    // Requeued before the previous result was looked up.
                    let settled = self.settle_previous_match(pacte, &players, now).await?;
                    if matches!(settled, TickOutcome::Succeeded | TickOutcome::TimedOut) {
                        return Ok(settled);
                    }
                }
                self.start_match(pacte, &players, game_id, now).await?
            }
        } else if pacte.in_game {
            self.await_result(pacte, &players, now).await?
        } else {
            self.check_clock(pacte, now).await?
        };

        // Applied results stamp the check inside their own transaction.
        if !matches!(
            outcome,
            TickOutcome::Win | TickOutcome::Loss | TickOutcome::Succeeded | TickOutcome::TimedOut
        ) {
            repo.apply_update(pacte.id, PacteUpdate::MarkChecked, now)
                .await?;
        }

        Ok(outcome)
    }

    /// Game id shared by every player's live match, if they are all in the same one.
    async fn group_live_match(&self, players: &[User]) -> Result<Option<String>, AppError> {
        let mut shared: Option<String> = None;

        for player in players {
            let Some(live) = self
                .observer
                .live_match(&player.riot_puuid, &self.platform)
                .await?
            else {
                return Ok(None);
            };

            match &shared {
                Some(game_id) if *game_id != live.game_id => return Ok(None),
                Some(_) => {}
                None => shared = Some(live.game_id),
            }
        }

        Ok(shared)
    }

    /// Stamps a newly detected live match with its own grace window.
    async fn start_match(
        &self,
        pacte: &Pacte,
        players: &[User],
        game_id: String,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, AppError> {
        let update = PacteUpdate::MatchStarted {
            game_id: game_id.clone(),
        };
        PacteRepository::new(&self.db)
            .apply_update(pacte.id, update, now)
            .await?;
        tracing::info!("Pacte {} entered live match {}", pacte.id, game_id);
        self.publish(
            pacte,
            PacteEventKind::MatchStarted {
                game_id,
                participants: discord_ids(players),
            },
        );

        Ok(TickOutcome::MatchStarted)
    }

    /// Resolves the match the group left for a new one, without waiting for the delay.
    async fn settle_previous_match(
        &self,
        pacte: &Pacte,
        players: &[User],
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, AppError> {
        let Some(result) = self.find_result(pacte, players).await? else {
            tracing::warn!(
                "Pacte {} started a new match before the result of game {:?} was published",
                pacte.id,
                pacte.current_game_id
            );
            self.publish(
                pacte,
                PacteEventKind::ResultUndetectable {
                    game_id: pacte.current_game_id.clone(),
                },
            );
            return Ok(TickOutcome::ResultUndetectable);
        };

        self.settle_result(pacte, players, &result, now).await
    }

    /// The group's latest completed match, unless it ended before the tracked one began.
    async fn find_result(
        &self,
        pacte: &Pacte,
        players: &[User],
    ) -> Result<Option<CompletedMatch>, AppError> {
        let account_ids: Vec<String> = players.iter().map(|p| p.riot_puuid.clone()).collect();

        Ok(self
            .observer
            .last_completed_match(&account_ids, self.policy.lookback)
            .await?
            .filter(|m| pacte.match_started_at.is_none_or(|started| m.ended_at >= started)))
    }

    /// The group left its match; look for the result once the grace period allows it.
    async fn await_result(
        &self,
        pacte: &Pacte,
        players: &[User],
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, AppError> {
        let repo = PacteRepository::new(&self.db);

        let Some(pending_since) = pacte.result_pending_since else {
            repo.apply_update(pacte.id, PacteUpdate::ResultPending, now)
                .await?;
            return Ok(TickOutcome::AwaitingResult);
        };

        if now - pending_since < self.policy.lookup_delay {
            return Ok(TickOutcome::AwaitingResult);
        }

        let Some(result) = self.find_result(pacte, players).await? else {
            let polls = pacte.result_poll_count + 1;
            let exhausted = self.policy.max_empty_polls.is_some_and(|max| polls >= max);

            if now - pending_since >= self.policy.give_up_after || exhausted {
                repo.apply_update(pacte.id, PacteUpdate::ClearInGame, now)
                    .await?;
                tracing::warn!(
                    "Pacte {} gave up on the result of game {:?} after {} lookup(s)",
                    pacte.id,
                    pacte.current_game_id,
                    polls
                );
                self.publish(
                    pacte,
                    PacteEventKind::ResultUndetectable {
                        game_id: pacte.current_game_id.clone(),
                    },
                );
                return Ok(TickOutcome::ResultUndetectable);
            }

            repo.apply_update(pacte.id, PacteUpdate::EmptyResultPoll, now)
                .await?;
            return Ok(TickOutcome::AwaitingResult);
        };

        self.settle_result(pacte, players, &result, now).await
    }

    /// Passes a found result through the ledger gate and applies it.
    async fn settle_result(
        &self,
        pacte: &Pacte,
        players: &[User],
        result: &CompletedMatch,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, AppError> {
        let verdict = GameHistoryRepository::new(&self.db)
            .stale_after(self.policy.ledger_stale_window)
            .validate_for_processing(&result.match_id, pacte.id, result.ended_at, now)
            .await?;

        if let LedgerValidation::Rejected(reason) = verdict {
            tracing::warn!(
                "Pacte {} ignoring match {}: {:?}",
                pacte.id,
                result.match_id,
                reason
            );
            PacteRepository::new(&self.db)
                .apply_update(pacte.id, PacteUpdate::ClearInGame, now)
                .await?;
            return Ok(TickOutcome::ResultRejected(reason));
        }

        self.apply_result(pacte, players, result, now).await
    }

    /// Records the match and moves the counters in one transaction.
    async fn apply_result(
        &self,
        pacte: &Pacte,
        players: &[User],
        result: &CompletedMatch,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, AppError> {
        let outcome = MatchOutcome::from_win(result.win);
        let ids = discord_ids(players);

        let txn = self.db.begin().await?;
        let pactes = PacteRepository::new(&txn);
        let users = UserRepository::new(&txn);

        let recorded = GameHistoryRepository::new(&txn)
            .record(&result.match_id, pacte.id, outcome, now)
            .await?;
        if !recorded {
            drop(txn);
            PacteRepository::new(&self.db)
                .apply_update(pacte.id, PacteUpdate::ClearInGame, now)
                .await?;
            return Ok(TickOutcome::ResultRejected(RejectReason::AlreadyProcessed));
        }

        let (tick, event) = match outcome {
            MatchOutcome::Win => {
                let current_wins = pacte.current_wins + 1;
                let best_streak_reached = pacte.best_streak_reached.max(current_wins);

                pactes
                    .apply_update(
                        pacte.id,
                        PacteUpdate::RecordWin {
                            current_wins,
                            best_streak_reached,
                        },
                        now,
                    )
                    .await?;
                users.raise_best_streak(&ids, best_streak_reached).await?;
                pactes
                    .apply_update(pacte.id, PacteUpdate::MarkChecked, now)
                    .await?;

                if current_wins >= pacte.objective {
                    let reward = points::settle(pacte.objective, best_streak_reached, true);
                    let paid = pactes.complete(pacte.id, true, reward, now).await?;
                    (
                        TickOutcome::Succeeded,
                        PacteEventKind::Succeeded {
                            objective: pacte.objective,
                            points_per_participant: reward,
                            participants: paid,
                        },
                    )
                } else {
                    (
                        TickOutcome::Win,
                        PacteEventKind::Win {
                            current_wins,
                            objective: pacte.objective,
                            match_point: current_wins == pacte.objective - 1,
                        },
                    )
                }
            }
            MatchOutcome::Loss => {
                let lost_streak = pacte.current_wins;
                let best_streak_reached = pacte.best_streak_reached.max(lost_streak);

                pactes
                    .apply_update(
                        pacte.id,
                        PacteUpdate::RecordLoss {
                            best_streak_reached,
                        },
                        now,
                    )
                    .await?;
                users.raise_best_streak(&ids, best_streak_reached).await?;
                pactes
                    .apply_update(pacte.id, PacteUpdate::MarkChecked, now)
                    .await?;

                if self.is_expired(pacte, now) {
                    let settlement = points::settle(pacte.objective, best_streak_reached, false);
                    let paid = pactes.complete(pacte.id, false, settlement, now).await?;
                    (
                        TickOutcome::TimedOut,
                        PacteEventKind::TimedOut {
                            objective: pacte.objective,
                            best_streak_reached,
                            points_per_participant: settlement,
                            participants: paid,
                        },
                    )
                } else {
                    (
                        TickOutcome::Loss,
                        PacteEventKind::Loss {
                            lost_streak,
                            best_streak_reached,
                            so_close: lost_streak == pacte.objective - 1,
                        },
                    )
                }
            }
        };

        txn.commit().await?;

        tracing::info!(
            "Pacte {} applied match {} ({}): {}",
            pacte.id,
            result.match_id,
            outcome.as_str(),
            event.name()
        );
        self.publish(pacte, event);

        Ok(tick)
    }

    /// Time limit and warning checks for a pacte that is not in game.
    async fn check_clock(&self, pacte: &Pacte, now: DateTime<Utc>) -> Result<TickOutcome, AppError> {
        let Some(started_at) = pacte.started_at else {
            return Ok(TickOutcome::Idle);
        };
        let repo = PacteRepository::new(&self.db);

        if self.is_expired(pacte, now) {
            let settlement = points::settle(pacte.objective, pacte.best_streak_reached, false);
            let paid = repo.complete(pacte.id, false, settlement, now).await?;
            tracing::info!(
                "Pacte {} timed out at {}/{}",
                pacte.id,
                pacte.best_streak_reached,
                pacte.objective
            );
            self.publish(
                pacte,
                PacteEventKind::TimedOut {
                    objective: pacte.objective,
                    best_streak_reached: pacte.best_streak_reached,
                    points_per_participant: settlement,
                    participants: paid,
                },
            );
            return Ok(TickOutcome::TimedOut);
        }

        let remaining = started_at + self.policy.pacte_duration - now;
        if !pacte.warning_sent && remaining <= self.policy.warning_window {
            repo.apply_update(pacte.id, PacteUpdate::MarkWarningSent, now)
                .await?;
            self.publish(
                pacte,
                PacteEventKind::TimeRunningOut {
                    remaining_minutes: remaining.num_minutes(),
                    current_wins: pacte.current_wins,
                    objective: pacte.objective,
                },
            );
            return Ok(TickOutcome::WarningSent);
        }

        Ok(TickOutcome::Idle)
    }

    /// Counts a failed tick and resets an in-game pacte that keeps failing.
    async fn record_failure(
        &self,
        pacte: &Pacte,
        err: &AppError,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(PacteError::NotActive(_) | PacteError::AlreadyTerminal(_)) =
            err.as_pacte_error()
        {
            tracing::debug!("Pacte {} finished during its check: {}", pacte.id, err);
            return Ok(());
        }

        tracing::error!("Progress check failed for pacte {}: {}", pacte.id, err);

        let repo = PacteRepository::new(&self.db);
        let updated = repo
            .apply_update(pacte.id, PacteUpdate::IncrementErrorCount, now)
            .await?;

        if updated.in_game && updated.error_count >= self.policy.error_threshold {
            repo.apply_update(pacte.id, PacteUpdate::TechnicalReset, now)
                .await?;
            tracing::warn!(
                "Pacte {} reset after {} consecutive errors",
                pacte.id,
                updated.error_count
            );
            self.publish(
                pacte,
                PacteEventKind::TechnicalReset {
                    error_count: updated.error_count,
                },
            );
        }

        Ok(())
    }

    fn is_expired(&self, pacte: &Pacte, now: DateTime<Utc>) -> bool {
        pacte
            .elapsed(now)
            .is_some_and(|elapsed| elapsed >= self.policy.pacte_duration)
    }

    fn publish(&self, pacte: &Pacte, kind: PacteEventKind) {
        self.bus.publish(PacteEvent {
            pacte_id: pacte.id,
            channel_id: pacte.channel_id.clone(),
            kind,
        });
    }
}

fn discord_ids(players: &[User]) -> Vec<String> {
    players.iter().map(|p| p.discord_id.clone()).collect()
}
