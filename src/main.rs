mod bot;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod startup;
mod util;

use std::sync::Arc;

use crate::{
    config::Config,
    error::AppError,
    service::{
        event::EventBus,
        observer::{riot::RiotObserver, GameObserver},
        progress::ProgressEngine,
    },
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::from_env()?;
    let db = startup::connect_to_database(&config).await?;

    let observer: Arc<dyn GameObserver> = Arc::new(RiotObserver::new(
        config.riot_api_key.clone(),
        &config.riot_platform,
        config.riot_timeout,
        config.riot_retry.clone(),
    )?);
    let bus = EventBus::default();

    // Initialize Discord bot and extract HTTP client
    let (bot_client, discord_http) =
        bot::start::init_bot(&config, db.clone(), observer.clone()).await?;

    tokio::spawn(bot::notifier::run(discord_http, bus.subscribe()));

    let engine = Arc::new(ProgressEngine::new(
        db.clone(),
        observer,
        bus.clone(),
        config.engine.clone(),
        config.riot_platform.clone(),
    ));
    scheduler::pacte_progress::start_scheduler(engine).await?;
    scheduler::maintenance::start_scheduler(db, bus).await?;

    tracing::info!("Pacte bot running on platform {}", config.riot_platform);

    bot::start::start_bot(bot_client).await
}
