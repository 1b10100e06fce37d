use anyhow::Result;
use chrono::Utc;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::prelude::*;
use std::sync::Arc;
use tokio::sync::mpsc;

use checkin::core::Config;
use checkin::features::checkin::scheduler::supervise;
use checkin::features::checkin::{CheckInMachine, CheckInScheduler, Contacts, StateStore};
use checkin::gateway::{DiscordGateway, ReplyForwarder, REPLY_CHANNEL_CAPACITY};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting check-in bot...");
    info!(
        "👤 Primary contact: {}, secondary contact: {}",
        config.primary_contact, config.secondary_contact
    );
    if config.primary_contact == config.secondary_contact {
        warn!("Primary and secondary contact are the same user; escalations go to the person being checked on");
    }

    let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);

    let intents = GatewayIntents::DIRECT_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(ReplyForwarder::new(reply_tx))
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let store = StateStore::new(config.state_file.clone(), config.policy.prompt_interval);
    let state = store.load(Utc::now()).await;

    let machine = CheckInMachine::new(
        Contacts {
            primary: config.primary_contact,
            secondary: config.secondary_contact,
        },
        config.policy,
    );
    let gateway = Arc::new(DiscordGateway::new(client.cache_and_http.http.clone()));
    let scheduler = CheckInScheduler::new(machine, store, gateway, state, config.check_interval);
    let scheduler_task = tokio::spawn(scheduler.run(reply_rx));

    info!("Establishing WebSocket connection to Discord gateway...");

    // Neither side is expected to return; exit so a process supervisor restarts the bot
    supervise(client.start(), scheduler_task).await
}
