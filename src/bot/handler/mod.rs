use sea_orm::DatabaseConnection;
use serenity::all::{Context, EventHandler, Message, Ready};
use serenity::async_trait;
use std::sync::Arc;

use crate::service::{observer::GameObserver, progress::EnginePolicy};

pub mod message;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub db: DatabaseConnection,
    /// Used to resolve Riot IDs on registration.
    pub observer: Arc<dyn GameObserver>,
    /// Kick multiplier and pacte duration shown to players.
    pub policy: EnginePolicy,
}

impl Handler {
    pub fn new(
        db: DatabaseConnection,
        observer: Arc<dyn GameObserver>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            db,
            observer,
            policy,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(ctx, ready).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, ctx: Context, message: Message) {
        message::handle_message(self, ctx, message).await;
    }
}
