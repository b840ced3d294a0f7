//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use super::bot::Command;
use super::commands::{
    handle_add_operator, handle_delivery, handle_link, handle_loc, handle_set_online, handle_start, handle_stock,
};
use super::menu::handle_menu_callback;
use super::types::{HandlerDeps, HandlerError};

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with
/// teloxide's Dispatcher. The same schema is used in production and can
/// be used in integration tests.
///
/// # Arguments
/// * `deps` - Handler dependencies (database pool)
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Command handler
        .branch(command_handler(deps_commands))
        // Callback query handler for the menu buttons
        .branch(callback_handler(deps_callback))
}

/// Handler for bot commands (/start, /stock, /online, etc.)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => handle_start(&bot, &msg).await?,
                    Command::Stock(text) => handle_stock(&bot, &msg, &deps, &text).await?,
                    Command::AddOperator(handle) => handle_add_operator(&bot, &msg, &deps, &handle).await?,
                    Command::Loc(location) => handle_loc(&bot, &msg, &deps, &location).await?,
                    Command::Online => handle_set_online(&bot, &msg, &deps, true).await?,
                    Command::Offline => handle_set_online(&bot, &msg, &deps, false).await?,
                    Command::Delivery(token) => handle_delivery(&bot, &msg, &deps, &token).await?,
                    Command::Link(args) => handle_link(&bot, &msg, &deps, &args).await?,
                }
                Ok(())
            }
        },
    ))
}

/// Handler for callback queries (inline keyboard buttons)
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let result: teloxide::RequestError = match handle_menu_callback(bot, q, deps.db_pool.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            Err(Box::new(result) as HandlerError)
        }
    })
}
