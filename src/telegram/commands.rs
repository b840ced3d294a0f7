//! Command handlers: admin edits and operator self-service
//!
//! Admin commands (/stock, /addoperator, /link) are guarded by the
//! configured owner id and silently ignored for everyone else.
//! Self-service commands (/loc, /online, /offline, /delivery) only act
//! when the sender's handle matches a registered operator row.

use std::path::Path;

use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use crate::core::config;
use crate::core::error::AppResult;
use crate::storage::db::{self, DbConnection};
use crate::storage::get_connection;

use super::menu::{main_menu, HOME_CAPTION};
use super::types::HandlerDeps;

/// Returns true when the message sender is the configured owner.
///
/// Messages without a sender (channel posts) never pass the guard.
fn is_owner(msg: &Message) -> bool {
    msg.from
        .as_ref()
        .and_then(|u| i64::try_from(u.id.0).ok())
        .map(|id| id == *config::OWNER_ID)
        .unwrap_or(false)
}

/// Normalizes a Telegram handle to its stored '@'-prefixed form.
pub(crate) fn normalize_handle(raw: &str) -> String {
    format!("@{}", raw.trim().trim_start_matches('@'))
}

/// Parses the /delivery argument. Only an explicit affirmative token
/// enables delivery; anything else disables it.
pub(crate) fn parse_delivery_flag(token: &str) -> bool {
    matches!(token.trim().to_ascii_lowercase().as_str(), "yes" | "on" | "true")
}

/// Splits the /link argument line into (name, url): the last
/// whitespace-separated token is the URL, everything before it is the
/// display name. Returns None when fewer than two tokens are present.
pub(crate) fn split_link_args(args: &str) -> Option<(String, String)> {
    let mut parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let url = parts.pop()?.to_string();
    Some((parts.join(" "), url))
}

/// Resolves a sender's handle to a registered operator row.
///
/// Backfills the stored `user_id` when it is missing or stale, so the
/// row carries the operator's Telegram id from their first interaction
/// on.
///
/// # Returns
///
/// The stored '@'-prefixed handle when registered, `None` otherwise.
pub fn resolve_registered_handle(
    conn: &DbConnection,
    raw_username: &str,
    user_id: Option<i64>,
) -> rusqlite::Result<Option<String>> {
    let handle = normalize_handle(raw_username);
    match db::get_operator(conn, &handle)? {
        Some(op) => {
            if let Some(id) = user_id {
                if op.user_id != Some(id) {
                    db::set_operator_user_id(conn, &handle, id)?;
                }
            }
            Ok(Some(handle))
        }
        None => Ok(None),
    }
}

/// Resolves the sender of a message to a registered operator handle.
///
/// Senders without a username cannot be matched and resolve to `None`.
fn resolve_operator(conn: &DbConnection, msg: &Message) -> rusqlite::Result<Option<String>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(None);
    };
    let Some(raw_username) = user.username.as_deref() else {
        log::debug!("Self-service command from user without a handle, ignoring");
        return Ok(None);
    };

    let resolved = resolve_registered_handle(conn, raw_username, i64::try_from(user.id.0).ok())?;
    if resolved.is_none() {
        log::debug!("Self-service command from unregistered handle @{}, ignoring", raw_username);
    }
    Ok(resolved)
}

/// /start: sends the welcome banner with the main menu.
///
/// When the banner photo is missing the welcome goes out as plain text,
/// so a fresh deployment works before any assets are in place.
pub async fn handle_start(bot: &Bot, msg: &Message) -> AppResult<()> {
    let banner = Path::new(config::BANNER_PATH.as_str());
    if banner.exists() {
        bot.send_photo(msg.chat.id, InputFile::file(banner))
            .caption(HOME_CAPTION)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(main_menu())
            .await?;
    } else {
        log::warn!("Banner file {} not found, sending text welcome", config::BANNER_PATH.as_str());
        bot.send_message(msg.chat.id, HOME_CAPTION)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(main_menu())
            .await?;
    }
    Ok(())
}

/// /stock: replaces the stock text (owner only).
///
/// The new text comes from the command argument, or from the
/// replied-to message so multi-line texts survive untouched.
pub async fn handle_stock(bot: &Bot, msg: &Message, deps: &HandlerDeps, arg: &str) -> AppResult<()> {
    if !is_owner(msg) {
        log::debug!("/stock from non-owner chat {}, ignoring", msg.chat.id);
        return Ok(());
    }

    let arg = arg.trim();
    let text = if !arg.is_empty() {
        arg.to_string()
    } else if let Some(reply_text) = msg.reply_to_message().and_then(|m| m.text()) {
        reply_text.to_string()
    } else {
        bot.send_message(
            msg.chat.id,
            "❗ Usage: /stock <text>, or reply to the stock text with /stock.",
        )
        .await?;
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    db::set_stock_text(&conn, &text)?;

    bot.send_message(msg.chat.id, "✅ Stock saved").await?;
    Ok(())
}

/// /addoperator: registers an operator handle (owner only). Idempotent.
pub async fn handle_add_operator(bot: &Bot, msg: &Message, deps: &HandlerDeps, arg: &str) -> AppResult<()> {
    if !is_owner(msg) {
        log::debug!("/addoperator from non-owner chat {}, ignoring", msg.chat.id);
        return Ok(());
    }

    let arg = arg.trim();
    let Some(raw_handle) = arg.split_whitespace().next() else {
        bot.send_message(msg.chat.id, "❗ Usage: /addoperator <handle>").await?;
        return Ok(());
    };
    let handle = normalize_handle(raw_handle);

    let conn = get_connection(&deps.db_pool)?;
    db::add_operator(&conn, &handle)?;

    bot.send_message(msg.chat.id, format!("✅ Operator added: {}", handle)).await?;
    Ok(())
}

/// /loc: stores the sender operator's free-text location.
pub async fn handle_loc(bot: &Bot, msg: &Message, deps: &HandlerDeps, arg: &str) -> AppResult<()> {
    let conn = get_connection(&deps.db_pool)?;
    let Some(handle) = resolve_operator(&conn, msg)? else {
        return Ok(());
    };

    let location = arg.trim();
    if location.is_empty() {
        bot.send_message(msg.chat.id, "❗ Usage: /loc <location>").await?;
        return Ok(());
    }

    db::set_operator_location(&conn, &handle, location)?;

    bot.send_message(msg.chat.id, "📍 Location saved").await?;
    Ok(())
}

/// /online and /offline: flips the sender operator's availability.
pub async fn handle_set_online(bot: &Bot, msg: &Message, deps: &HandlerDeps, online: bool) -> AppResult<()> {
    let conn = get_connection(&deps.db_pool)?;
    let Some(handle) = resolve_operator(&conn, msg)? else {
        return Ok(());
    };

    db::set_operator_online(&conn, &handle, online)?;

    let status = if online { "🟢 ONLINE" } else { "🔴 OFFLINE" };
    bot.send_message(msg.chat.id, status).await?;
    Ok(())
}

/// /delivery: sets the sender operator's delivery flag.
pub async fn handle_delivery(bot: &Bot, msg: &Message, deps: &HandlerDeps, arg: &str) -> AppResult<()> {
    let conn = get_connection(&deps.db_pool)?;
    let Some(handle) = resolve_operator(&conn, msg)? else {
        return Ok(());
    };

    let arg = arg.trim();
    if arg.is_empty() {
        bot.send_message(msg.chat.id, "❗ Usage: /delivery <yes|no>").await?;
        return Ok(());
    }

    db::set_operator_delivery(&conn, &handle, parse_delivery_flag(arg))?;

    bot.send_message(msg.chat.id, "🚚 Delivery saved").await?;
    Ok(())
}

/// /link: appends a link board entry (owner only).
pub async fn handle_link(bot: &Bot, msg: &Message, deps: &HandlerDeps, arg: &str) -> AppResult<()> {
    if !is_owner(msg) {
        log::debug!("/link from non-owner chat {}, ignoring", msg.chat.id);
        return Ok(());
    }

    let Some((name, url)) = split_link_args(arg) else {
        bot.send_message(msg.chat.id, "❗ Usage: /link <name> <url>").await?;
        return Ok(());
    };

    let conn = get_connection(&deps.db_pool)?;
    db::add_link(&conn, &name, &url)?;

    bot.send_message(msg.chat.id, "✅ Link added").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_handle_adds_prefix() {
        assert_eq!(normalize_handle("foo"), "@foo");
        assert_eq!(normalize_handle("@foo"), "@foo");
        assert_eq!(normalize_handle("  @foo "), "@foo");
    }

    #[test]
    fn test_parse_delivery_flag_affirmatives() {
        assert!(parse_delivery_flag("yes"));
        assert!(parse_delivery_flag("ON"));
        assert!(parse_delivery_flag("True"));
    }

    #[test]
    fn test_parse_delivery_flag_everything_else_is_false() {
        assert!(!parse_delivery_flag("no"));
        assert!(!parse_delivery_flag("off"));
        assert!(!parse_delivery_flag("maybe"));
        assert!(!parse_delivery_flag(""));
    }

    #[test]
    fn test_split_link_args_last_token_is_url() {
        assert_eq!(
            split_link_args("Main channel https://t.me/example"),
            Some(("Main channel".to_string(), "https://t.me/example".to_string()))
        );
    }

    #[test]
    fn test_split_link_args_requires_name_and_url() {
        assert_eq!(split_link_args("https://t.me/example"), None);
        assert_eq!(split_link_args(""), None);
        assert_eq!(split_link_args("   "), None);
    }
}
