use chrono::{DateTime, Duration, Utc};
use serenity::all::{Context, Message};

use crate::{
    bot::{command, command::Command, handler::Handler},
    error::AppError,
    model::{game_history::MatchOutcome, pacte::PacteHistoryEntry, user::LadderKind},
    service::{
        maintenance::SIGNATURE_WINDOW_MINUTES,
        pacte::{PacteOverview, PacteService},
        user::UserService,
    },
};

/// Handle message creation in a channel
pub async fn handle_message(handler: &Handler, ctx: Context, message: Message) {
    // Commands are only accepted in guild channels
    if message.author.bot || message.guild_id.is_none() {
        return;
    }

    let Some(command) = command::parse(&message.content) else {
        return;
    };

    let user_id = message.author.id.to_string();
    let channel_id = message.channel_id.to_string();

    tracing::debug!("Command {:?} from {} in {}", command, user_id, channel_id);

    let reply = match execute(handler, command, &user_id, &channel_id, Utc::now()).await {
        Ok(Some(reply)) => reply,
        Ok(None) => return,
        Err(err) => match err.as_pacte_error() {
            Some(rule) => rule.to_string(),
            None => {
                tracing::error!("Command from {} failed: {}", user_id, err);
                "Something went wrong, please try again later.".to_string()
            }
        },
    };

    if let Err(e) = message.reply(&ctx.http, reply).await {
        tracing::error!("Failed to reply in channel {}: {}", channel_id, e);
    }
}

/// Runs a command and returns the reply, `None` to stay silent.
async fn execute(
    handler: &Handler,
    command: Command,
    user_id: &str,
    channel_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>, AppError> {
    let pactes = PacteService::new(&handler.db, handler.policy.kick_multiplier);
    let users = UserService::new(&handler.db);

    let reply = match command {
        Command::Sign => {
            let Some((pacte, outcome)) = pactes.sign_in_channel(channel_id, user_id, now).await?
            else {
                return Ok(None);
            };

            if outcome.activated {
                format!(
                    "Pacte #{} is active! {} ARAM wins in a row within {} hours.",
                    pacte.id,
                    pacte.objective,
                    handler.policy.pacte_duration.num_hours()
                )
            } else {
                format!(
                    "Signature recorded for pacte #{} ({}/{}).",
                    pacte.id, outcome.signed_count, outcome.total_count
                )
            }
        }
        Command::Create { objective, invited } => {
            let pacte = pactes
                .create(user_id, objective, &invited, channel_id, now)
                .await?;
            format!(
                "Pacte #{} created: {} ARAM wins in a row. Every participant writes \"je signe\" here within {} minutes.",
                pacte.id, pacte.objective, SIGNATURE_WINDOW_MINUTES
            )
        }
        Command::Join { pacte_id } => {
            pactes.join(pacte_id, user_id, now).await?;
            format!(
                "You joined pacte #{}. Write \"je signe\" to confirm.",
                pacte_id
            )
        }
        Command::Leave => {
            let (pacte, outcome) = pactes.leave(user_id, now).await?;
            let mut text = format!("You left pacte #{} (-{} points).", pacte.id, outcome.malus);
            if outcome.pacte_failed {
                text.push_str(" Nobody is left, the pacte failed.");
            }
            text
        }
        Command::Kick { target, reason } => {
            let (pacte, outcome) = pactes.kick(user_id, &target, &reason, now).await?;
            let mut text = format!(
                "<@{}> was excluded from pacte #{} (-{} points). Reason: {}",
                target, pacte.id, outcome.malus, reason
            );
            if outcome.pacte_failed {
                text.push_str("\nNobody is left, the pacte failed.");
            }
            text
        }
        Command::Unkick { target } => {
            let (pacte, outcome) = pactes.unkick(user_id, &target).await?;
            format!(
                "<@{}> is back in pacte #{}, {} points refunded.",
                target, pacte.id, outcome.refunded
            )
        }
        Command::Status => match pactes.overview(user_id).await? {
            Some(overview) => render_overview(&overview, handler.policy.pacte_duration, now),
            None => "You are not in any pacte.".to_string(),
        },
        Command::Register { riot_id } => {
            let user = users
                .register(handler.observer.as_ref(), user_id, &riot_id, now)
                .await?;
            format!("Account {} linked.", user.summoner_name)
        }
        Command::Unregister => {
            users.unregister(user_id).await?;
            "Your account was unlinked.".to_string()
        }
        Command::Ladder(kind) => {
            let entries = users.ladder(kind).await?;
            if entries.is_empty() {
                "Nobody has points yet.".to_string()
            } else {
                let title = match kind {
                    LadderKind::Total => "Ladder",
                    LadderKind::Monthly => "Monthly ladder",
                };
                let lines: Vec<String> = entries
                    .iter()
                    .map(|e| {
                        format!(
                            "{}. {} - {} pts (best streak {})",
                            e.rank, e.summoner_name, e.points, e.best_streak_ever
                        )
                    })
                    .collect();
                format!("{}\n{}", title, lines.join("\n"))
            }
        }
        Command::Stats => {
            let stats = users.stats(user_id).await?;
            format!(
                "{}: {} pts ({} this month). Pactes: {} ({} succeeded, {}%). Best streak: {}.",
                stats.user.summoner_name,
                stats.user.points_total,
                stats.user.points_monthly,
                stats.total_pactes,
                stats.pactes_success,
                stats.success_rate(),
                stats.user.best_streak_ever.max(stats.best_streak)
            )
        }
        Command::History { player, limit } => {
            let entries = pactes.history(player.as_deref(), limit).await?;
            if entries.is_empty() {
                "No pacte found.".to_string()
            } else {
                render_history(&entries)
            }
        }
        Command::Usage(usage) => usage.to_string(),
    };

    Ok(Some(reply))
}

fn render_history(entries: &[PacteHistoryEntry]) -> String {
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            let pacte = &entry.pacte;
            let mut players = entry
                .participants
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if entry.participants.len() > 3 {
                players.push_str(", ...");
            }

            let mut line = format!(
                "#{} {} ({}): objective {}, best streak {}",
                pacte.id,
                pacte.created_at.format("%d/%m/%Y"),
                pacte.status.as_str(),
                pacte.objective,
                pacte.best_streak_reached
            );
            if let Some(points) = entry.points_gained {
                line.push_str(&format!(", {:+} pts", points));
            }
            line.push_str(&format!(". Players: {}", players));
            line
        })
        .collect();

    format!("Pacte history\n{}", lines.join("\n"))
}

fn render_overview(overview: &PacteOverview, duration: Duration, now: DateTime<Utc>) -> String {
    let pacte = &overview.pacte;
    let players: Vec<&str> = overview
        .players
        .iter()
        .map(|p| p.summoner_name.as_str())
        .collect();

    let mut text = format!(
        "Pacte #{} ({}): streak {}/{}, best {}.\nPlayers: {}",
        pacte.id,
        pacte.status.as_str(),
        pacte.current_wins,
        pacte.objective,
        pacte.best_streak_reached,
        players.join(", ")
    );

    if let Some(elapsed) = pacte.elapsed(now) {
        let left = (duration - elapsed).num_minutes().max(0);
        text.push_str(&format!("\nTime left: {}h{:02}", left / 60, left % 60));
    }
    if !overview.games.is_empty() {
        let results: Vec<&str> = overview
            .games
            .iter()
            .map(|g| match g.outcome {
                MatchOutcome::Win => "W",
                MatchOutcome::Loss => "L",
            })
            .collect();
        text.push_str(&format!("\nGames: {}", results.join(" ")));
    }
    if pacte.in_game {
        text.push_str("\nIn game right now.");
    }
    for kick in &overview.kicks {
        text.push_str(&format!(
            "\nExcluded: {} ({})",
            kick.summoner_name,
            kick.kick_reason.as_deref().unwrap_or("no reason")
        ));
    }

    text
}
