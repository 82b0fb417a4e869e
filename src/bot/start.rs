use sea_orm::DatabaseConnection;
use serenity::{
    all::{Client, GatewayIntents},
    http::Http,
};
use std::sync::Arc;

use crate::{
    bot::handler::Handler,
    config::Config,
    error::AppError,
    service::observer::GameObserver,
};

/// Builds the Discord client without connecting it.
///
/// The returned HTTP client is shared with the notifier so events can be posted
/// before the gateway connection is up.
///
/// # Arguments
/// - `config` - Application configuration
/// - `db` - Database connection for the command handlers
/// - `observer` - Game observer used for registration
///
/// # Returns
/// - `Ok((Client, Arc<Http>))` - Client ready to start and its HTTP handle
/// - `Err(AppError)` - Client construction failed
pub async fn init_bot(
    config: &Config,
    db: DatabaseConnection,
    observer: Arc<dyn GameObserver>,
) -> Result<(Client, Arc<Http>), AppError> {
    // MESSAGE_CONTENT is privileged and must be enabled in the Developer Portal
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let handler = Handler::new(db, observer, config.engine.clone());

    let client = Client::builder(&config.discord_bot_token, intents)
        .event_handler(handler)
        .await?;

    let http = client.http.clone();

    Ok((client, http))
}

/// Connects the bot and runs it until shutdown.
///
/// Call from a spawned task, this only returns when the connection ends.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
