use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use vitrina::core::{config, init_logger};
use vitrina::storage::create_pool;
use vitrina::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    // Build the pool; this also applies migrations and seeds the stock row
    let db_pool = Arc::new(create_pool(&config::DATABASE_PATH)?);
    log::info!("Database ready at {}", config::DATABASE_PATH.as_str());

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    log::info!("Starting vitrina bot (owner id: {})", *config::OWNER_ID);

    Dispatcher::builder(bot, schema(HandlerDeps::new(db_pool)))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
