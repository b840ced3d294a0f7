//! Bot construction and command definitions
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command registration in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
///
/// Single-argument commands take the whole rest of the line, so
/// `/stock` keeps line breaks and `/loc` accepts multi-word locations.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the welcome menu")]
    Start,
    #[command(description = "replace the stock text (owner only)")]
    Stock(String),
    #[command(description = "register an operator handle (owner only)")]
    AddOperator(String),
    #[command(description = "set your location (operators)")]
    Loc(String),
    #[command(description = "mark yourself online (operators)")]
    Online,
    #[command(description = "mark yourself offline (operators)")]
    Offline,
    #[command(description = "set your delivery status (operators)")]
    Delivery(String),
    #[command(description = "add a link to the board (owner only)")]
    Link(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (missing token, invalid URL)
pub fn create_bot() -> anyhow::Result<Bot> {
    if config::BOT_TOKEN.is_empty() {
        return Err(anyhow::anyhow!("BOT_TOKEN environment variable not set"));
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(config::BOT_TOKEN.clone(), client);

    // Check if local Bot API server is configured
    let bot = if let Ok(bot_api_url) = std::env::var("BOT_API_URL") {
        log::info!("Using custom Bot API URL: {}", bot_api_url);
        let url = url::Url::parse(&bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
        bot.set_api_url(url)
    } else {
        bot
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
///
/// # Arguments
/// * `bot` - Bot instance to configure
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "show the welcome menu"),
        BotCommand::new("stock", "replace the stock text (owner only)"),
        BotCommand::new("addoperator", "register an operator handle (owner only)"),
        BotCommand::new("loc", "set your location (operators)"),
        BotCommand::new("online", "mark yourself online (operators)"),
        BotCommand::new("offline", "mark yourself offline (operators)"),
        BotCommand::new("delivery", "set your delivery status (operators)"),
        BotCommand::new("link", "add a link to the board (owner only)"),
    ])
    .await?;

    Ok(())
}
