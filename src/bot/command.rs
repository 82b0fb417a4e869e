//! Text command parsing.
//!
//! Parsing is pure so every command shape can be tested without Discord.

use crate::model::user::LadderKind;

pub const CREATE_USAGE: &str = "Usage: !pacte create <objective 3-10> @player ...";
pub const JOIN_USAGE: &str = "Usage: !pacte join <pacte id>";
pub const KICK_USAGE: &str = "Usage: !pacte kick @player <reason>";
pub const UNKICK_USAGE: &str = "Usage: !pacte unkick @player";
pub const REGISTER_USAGE: &str = "Usage: !register GameName#TAG";
pub const HISTORY_USAGE: &str = "Usage: !history [@player] [count 1-20]";

/// Pactes listed by `!history` when no count is given.
pub const DEFAULT_HISTORY_LIMIT: u64 = 10;
pub const PACTE_USAGE: &str =
    "Usage: !pacte create | join | leave | kick | unkick | status";

/// A recognised command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// "je signe", signs the caller's pending pacte in the channel.
    Sign,
    Create {
        objective: i32,
        /// Discord ids of the mentioned players.
        invited: Vec<String>,
    },
    Join {
        pacte_id: i32,
    },
    Leave,
    Kick {
        target: String,
        reason: String,
    },
    Unkick {
        target: String,
    },
    Status,
    Register {
        riot_id: String,
    },
    Unregister,
    Ladder(LadderKind),
    Stats,
    History {
        /// Discord id of the player to filter on.
        player: Option<String>,
        limit: u64,
    },
    /// A known command with malformed arguments.
    Usage(&'static str),
}

/// Parses a message, `None` when it is not addressed to the bot.
pub fn parse(content: &str) -> Option<Command> {
    let content = content.trim();

    if content.eq_ignore_ascii_case("je signe") {
        return Some(Command::Sign);
    }

    let mut words = content.split_whitespace();
    let command = match words.next()? {
        "!pacte" => parse_pacte(words),
        "!register" => {
            let riot_id = words.collect::<Vec<_>>().join(" ");
            if riot_id.contains('#') {
                Command::Register { riot_id }
            } else {
                Command::Usage(REGISTER_USAGE)
            }
        }
        "!unregister" => Command::Unregister,
        "!ladder" => match words.next() {
            Some(kind) if kind.eq_ignore_ascii_case("monthly") => {
                Command::Ladder(LadderKind::Monthly)
            }
            _ => Command::Ladder(LadderKind::Total),
        },
        "!stats" => Command::Stats,
        "!history" => parse_history(words),
        _ => return None,
    };

    Some(command)
}

fn parse_pacte<'a>(mut words: impl Iterator<Item = &'a str>) -> Command {
    let Some(sub) = words.next() else {
        return Command::Usage(PACTE_USAGE);
    };

    match sub.to_ascii_lowercase().as_str() {
        "create" => {
            let Some(objective) = words.next().and_then(|w| w.parse::<i32>().ok()) else {
                return Command::Usage(CREATE_USAGE);
            };
            let invited = words.filter_map(parse_mention).collect();
            Command::Create { objective, invited }
        }
        "join" => match words.next().and_then(|w| w.trim_start_matches('#').parse().ok()) {
            Some(pacte_id) => Command::Join { pacte_id },
            None => Command::Usage(JOIN_USAGE),
        },
        "leave" => Command::Leave,
        "kick" => {
            let Some(target) = words.next().and_then(parse_mention) else {
                return Command::Usage(KICK_USAGE);
            };
            let reason = words.collect::<Vec<_>>().join(" ");
            if reason.is_empty() {
                return Command::Usage(KICK_USAGE);
            }
            Command::Kick { target, reason }
        }
        "unkick" => match words.next().and_then(parse_mention) {
            Some(target) => Command::Unkick { target },
            None => Command::Usage(UNKICK_USAGE),
        },
        "status" => Command::Status,
        _ => Command::Usage(PACTE_USAGE),
    }
}

fn parse_history<'a>(words: impl Iterator<Item = &'a str>) -> Command {
    let mut player = None;
    let mut limit = DEFAULT_HISTORY_LIMIT;

    for word in words {
        if let Some(id) = parse_mention(word) {
            player = Some(id);
            continue;
        }
        match word.parse::<u64>() {
            Ok(count) if (1..=20).contains(&count) => limit = count,
            _ => return Command::Usage(HISTORY_USAGE),
        }
    }

    Command::History { player, limit }
}

/// Discord id from a user mention, `<@123>` or `<@!123>`.
pub fn parse_mention(token: &str) -> Option<String> {
    let id = token
        .strip_prefix("<@")?
        .strip_suffix('>')?
        .trim_start_matches('!');

    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(id.to_string())
}
