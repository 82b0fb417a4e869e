//! Posts progress events to the channel of the pacte they belong to.

use serenity::{
    all::{ChannelId, CreateMessage},
    http::Http,
};
use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::{
    model::event::{PacteEvent, PacteEventKind},
    util::parse::parse_u64_from_string,
};

/// Forwards every event from the bus to Discord until the bus closes.
///
/// A subscriber that falls behind loses the oldest events; that is logged and the
/// loop carries on with the newest ones.
pub async fn run(http: Arc<Http>, mut events: Receiver<PacteEvent>) {
    tracing::info!("Pacte notifier started");

    loop {
        match events.recv().await {
            Ok(event) => post(&http, &event).await,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Notifier fell behind, {} event(s) dropped", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::info!("Pacte notifier stopped");
}

async fn post(http: &Arc<Http>, event: &PacteEvent) {
    let channel_id = match parse_u64_from_string(&event.channel_id) {
        Ok(id) => ChannelId::new(id),
        Err(e) => {
            tracing::error!("Cannot notify pacte {}: {}", event.pacte_id, e);
            return;
        }
    };

    let message = CreateMessage::new().content(render(event));

    if let Err(e) = channel_id.send_message(http, message).await {
        tracing::error!(
            "Failed to post {} for pacte {} to channel {}: {}",
            event.kind.name(),
            event.pacte_id,
            event.channel_id,
            e
        );
    }
}

/// Plain-text message for an event.
pub fn render(event: &PacteEvent) -> String {
    let id = event.pacte_id;

    match &event.kind {
        PacteEventKind::MatchStarted { participants, .. } => format!(
            "Pacte #{}: {} entered an ARAM together. Good luck!",
            id,
            mentions(participants)
        ),
        PacteEventKind::Win {
            current_wins,
            objective,
            match_point,
        } => {
            let mut text = format!("Pacte #{}: win! Streak {}/{}.", id, current_wins, objective);
            if *match_point {
                text.push_str(" One more win to complete the pacte.");
            }
            text
        }
        PacteEventKind::Loss {
            lost_streak,
            best_streak_reached,
            so_close,
        } => {
            let mut text = format!(
                "Pacte #{}: loss. The streak of {} is reset, best so far {}.",
                id, lost_streak, best_streak_reached
            );
            if *so_close {
                text.push_str(" So close!");
            }
            text
        }
        PacteEventKind::Succeeded {
            objective,
            points_per_participant,
            participants,
        } => format!(
            "Pacte #{} succeeded: {} wins in a row! {} earn {} points each.",
            id,
            objective,
            mentions(participants),
            signed(*points_per_participant)
        ),
        PacteEventKind::TimedOut {
            objective,
            best_streak_reached,
            points_per_participant,
            participants,
        } => format!(
            "Pacte #{} failed: time is up at best streak {}/{}. {} get {} points each.",
            id,
            best_streak_reached,
            objective,
            mentions(participants),
            signed(*points_per_participant)
        ),
        PacteEventKind::TimeRunningOut {
            remaining_minutes,
            current_wins,
            objective,
        } => format!(
            "Pacte #{}: {}h{:02} left, streak {}/{}.",
            id,
            remaining_minutes / 60,
            remaining_minutes % 60,
            current_wins,
            objective
        ),
        PacteEventKind::ResultUndetectable { game_id } => format!(
            "Pacte #{}: the result of game {} could not be found, it is not counted.",
            id,
            game_id.as_deref().unwrap_or("?")
        ),
        PacteEventKind::TechnicalReset { error_count } => format!(
            "Pacte #{}: tracking of the current game was reset after {} errors.",
            id, error_count
        ),
        PacteEventKind::SignatureExpired => format!(
            "Pacte #{} expired: not everybody signed within 5 minutes.",
            id
        ),
    }
}

fn mentions(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join(" ")
}

fn signed(points: i32) -> String {
    if points > 0 {
        format!("+{}", points)
    } else {
        points.to_string()
    }
}
