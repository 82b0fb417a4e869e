//! Riot Games API implementation of `GameObserver`.
//!
//! Live matches come from the spectator endpoint on the platform host (`euw1`, `na1`,
//! ...). Match history and account lookups go to the regional host the platform routes
//! to. Every request goes through the injected `RetryPolicy`.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{header::RETRY_AFTER, Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

use crate::{
    error::observer::ObserverError,
    service::observer::{
        retry::RetryPolicy, Account, CompletedMatch, GameObserver, LiveMatch, ARAM_QUEUE_ID,
        REMAKE_MAX_DURATION_SECONDS,
    },
};

/// Regional routing value serving match and account data for a platform.
pub fn regional_route(platform: &str) -> Option<&'static str> {
    match platform.to_ascii_lowercase().as_str() {
        "euw1" | "eun1" | "ru" | "tr1" => Some("europe"),
        "na1" | "br1" | "la1" | "la2" => Some("americas"),
        "jp1" | "kr" => Some("asia"),
        "oc1" => Some("sea"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveGameDto {
    game_id: i64,
    #[serde(default)]
    game_queue_config_id: Option<i64>,
    /// Milliseconds since the epoch, 0 while the game is loading.
    #[serde(default)]
    game_start_time: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchDto {
    metadata: MatchMetadataDto,
    info: MatchInfoDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchMetadataDto {
    match_id: String,
    participants: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchInfoDto {
    #[serde(default)]
    game_end_timestamp: Option<i64>,
    game_duration: i64,
    queue_id: i64,
    participants: Vec<MatchParticipantDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchParticipantDto {
    puuid: String,
    win: bool,
    #[serde(default)]
    game_ended_in_early_surrender: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    puuid: String,
    #[serde(default)]
    game_name: Option<String>,
    #[serde(default)]
    tag_line: Option<String>,
}

impl ActiveGameDto {
    fn into_live_match(self) -> Option<LiveMatch> {
        let queue_id = self.game_queue_config_id?;
        if queue_id != ARAM_QUEUE_ID {
            return None;
        }

        let started_at = if self.game_start_time > 0 {
            DateTime::from_timestamp_millis(self.game_start_time)
        } else {
            None
        };

        Some(LiveMatch {
            game_id: self.game_id.to_string(),
            queue_id,
            started_at,
        })
    }
}

impl MatchDto {
    /// The match as seen by the group, `None` unless it is a full ARAM everybody played.
    fn group_result(&self, account_ids: &[String]) -> Option<CompletedMatch> {
        if self.info.queue_id != ARAM_QUEUE_ID {
            return None;
        }
        if !account_ids
            .iter()
            .all(|id| self.metadata.participants.contains(id))
        {
            return None;
        }

        let remake = self.info.game_duration < REMAKE_MAX_DURATION_SECONDS
            || self
                .info
                .participants
                .iter()
                .any(|p| p.game_ended_in_early_surrender);
        if remake {
            return None;
        }

        let reference = account_ids.first()?;
        let win = self
            .info
            .participants
            .iter()
            .find(|p| &p.puuid == reference)?
            .win;
        let ended_at = DateTime::from_timestamp_millis(self.info.game_end_timestamp?)?;

        Some(CompletedMatch {
            match_id: self.metadata.match_id.clone(),
            win,
            ended_at,
            duration_seconds: self.info.game_duration,
        })
    }
}

/// `GameObserver` backed by the Riot Games HTTP API.
pub struct RiotObserver {
    client: Client,
    api_key: String,
    regional: &'static str,
    retry: RetryPolicy,
}

impl RiotObserver {
    /// Creates an observer for the given home platform.
    ///
    /// # Arguments
    /// - `api_key` - Value for the `X-Riot-Token` header
    /// - `platform` - Home platform, decides the regional host for match data
    /// - `timeout` - Per-request timeout
    /// - `retry` - Policy applied to every request
    ///
    /// # Returns
    /// - `Ok(RiotObserver)` - Ready to use
    /// - `Err(ObserverError::UnknownPlatform)` - Platform has no regional route
    /// - `Err(ObserverError::Transport)` - HTTP client could not be built
    pub fn new(
        api_key: impl Into<String>,
        platform: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, ObserverError> {
        let regional = regional_route(platform)
            .ok_or_else(|| ObserverError::UnknownPlatform(platform.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ObserverError::Transport(e.to_string()))?;

        tracing::info!(
            "Riot observer initialized for platform {} (region {})",
            platform,
            regional
        );

        Ok(Self {
            client,
            api_key: api_key.into(),
            regional,
            retry,
        })
    }

    /// GETs `url` and decodes the body, mapping 404 to `None`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        label: &str,
        url: &str,
    ) -> Result<Option<T>, ObserverError> {
        let client = &self.client;
        let api_key = self.api_key.as_str();

        self.retry
            .run(label, || async move {
                let response = client
                    .get(url)
                    .header("X-Riot-Token", api_key)
                    .send()
                    .await?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .map(Duration::from_secs);
                    return Err(ObserverError::RateLimited { retry_after });
                }
                if !status.is_success() {
                    return Err(ObserverError::Http {
                        status: status.as_u16(),
                    });
                }

                Ok(Some(response.json::<T>().await?))
            })
            .await
    }

    async fn recent_match_ids(
        &self,
        account_id: &str,
        count: u32,
    ) -> Result<Vec<String>, ObserverError> {
        let url = format!(
            "https://{}.api.riotgames.com/lol/match/v5/matches/by-puuid/{}/ids?queue={}&count={}",
            self.regional, account_id, ARAM_QUEUE_ID, count
        );

        Ok(self
            .get_json::<Vec<String>>("match ids", &url)
            .await?
            .unwrap_or_default())
    }

    async fn match_details(&self, match_id: &str) -> Result<Option<MatchDto>, ObserverError> {
        let url = format!(
            "https://{}.api.riotgames.com/lol/match/v5/matches/{}",
            self.regional, match_id
        );

        self.get_json("match details", &url).await
    }
}

#[async_trait]
impl GameObserver for RiotObserver {
    async fn live_match(
        &self,
        account_id: &str,
        platform: &str,
    ) -> Result<Option<LiveMatch>, ObserverError> {
        let url = format!(
            "https://{}.api.riotgames.com/lol/spectator/v5/active-games/by-summoner/{}",
            platform.to_ascii_lowercase(),
            account_id
        );

        let game = self.get_json::<ActiveGameDto>("live match", &url).await?;

        Ok(game.and_then(ActiveGameDto::into_live_match))
    }

    async fn last_completed_match(
        &self,
        account_ids: &[String],
        lookback: u32,
    ) -> Result<Option<CompletedMatch>, ObserverError> {
        if account_ids.is_empty() {
            return Ok(None);
        }

        let mut histories = Vec::with_capacity(account_ids.len());
        for account_id in account_ids {
            histories.push(self.recent_match_ids(account_id, lookback).await?);
        }

        let (reference, others) = histories.split_at(1);
        let shared = reference[0]
            .iter()
            .filter(|id| others.iter().all(|history| history.contains(*id)));

        for match_id in shared {
            let Some(details) = self.match_details(match_id).await? else {
                continue;
            };
            match details.group_result(account_ids) {
                Some(result) => return Ok(Some(result)),
                None => tracing::debug!("Skipping match {}: not a counted group ARAM", match_id),
            }
        }

        Ok(None)
    }

    async fn resolve_account(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Account>, ObserverError> {
        let mut url = Url::parse(&format!("https://{}.api.riotgames.com", self.regional))
            .map_err(|e| ObserverError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ObserverError::Transport("cannot build account URL".to_string()))?
            .extend([
                "riot",
                "account",
                "v1",
                "accounts",
                "by-riot-id",
                game_name,
                tag_line,
            ]);

        let account = self
            .get_json::<AccountDto>("account lookup", url.as_str())
            .await?;

        Ok(account.map(|dto| Account {
            puuid: dto.puuid,
            game_name: dto.game_name.unwrap_or_else(|| game_name.to_string()),
            tag_line: dto.tag_line.unwrap_or_else(|| tag_line.to_string()),
        }))
    }
}
