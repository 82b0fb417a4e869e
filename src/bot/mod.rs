//! Discord collaborator of the pacte bot.
//!
//! The bot reads plain text commands in guild channels, forwards them to the pacte and
//! user services, and posts the progress engine's events back to each pacte's channel.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Guild availability
//! - `GUILD_MESSAGES` - Receive messages posted in guild channels
//! - `MESSAGE_CONTENT` - Read the text of those messages (privileged intent)
//!
//! `MESSAGE_CONTENT` must be enabled in the Discord Developer Portal for the bot
//! application, otherwise every command arrives empty.

pub mod command;
pub mod handler;
pub mod notifier;
pub mod start;
