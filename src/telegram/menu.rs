//! Menus and list rendering
//!
//! The welcome message carries the main menu keyboard; every other
//! screen is reached by editing that message in place and offers a
//! single Back button. Rendering is deterministic given the current
//! rows; nothing is cached.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::RequestError;

use crate::storage::db::{self, DbPool, Link, Operator};

use super::cb;

/// Caption of the welcome screen. MarkdownV2, with the reserved
/// characters escaped inline.
pub const HOME_CAPTION: &str = "🛍 *Welcome to Vitrina Market*\n\n\
    Your trusted marketplace\\.\n\
    Fast • Discreet • Reliable\n\n\
    Please choose an option below\\.";

/// Main menu keyboard: one row with the three directory screens.
pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        cb("📦 Stock", "stock"),
        cb("👤 Operators", "operators"),
        cb("🔗 Links", "links"),
    ]])
}

/// Back-only keyboard shown on every non-home screen.
pub fn back_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![cb("🔙 Back", "back")]])
}

/// Renders the operator directory, one line per operator.
pub fn render_operators(operators: &[Operator]) -> String {
    if operators.is_empty() {
        return "👤 Operators\n\nNo info yet.".to_string();
    }

    let mut out = vec!["👤 Operators\n".to_string()];
    for op in operators {
        out.push(format!(
            "{} | 📍 {} | {} | 🚚 {}",
            op.username,
            op.location.as_deref().unwrap_or("Not specified"),
            if op.online { "🟢 Online" } else { "🔴 Offline" },
            if op.delivery { "Available" } else { "Not available" },
        ));
    }
    out.join("\n")
}

/// Renders the link board as name/url pairs.
pub fn render_links(links: &[Link]) -> String {
    if links.is_empty() {
        return "🔗 Links\n\nNo info yet.".to_string();
    }

    let mut out = vec!["🔗 Useful Links\n".to_string()];
    for link in links {
        out.push(format!("📢 {}\n🔗 {}\n", link.name, link.url));
    }
    out.join("\n")
}

/// Maps pool/query errors into a RequestError so they surface through
/// the dispatcher's error handler.
fn db_err(e: impl std::fmt::Display) -> RequestError {
    RequestError::from(std::sync::Arc::new(std::io::Error::other(e.to_string())))
}

/// Edit caption if present, else fallback to editing text.
///
/// The welcome message is a photo, so screens normally live in its
/// caption; the fallback covers the bannerless text welcome.
pub(crate) async fn edit_caption_or_text(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: String,
    keyboard: InlineKeyboardMarkup,
    parse_mode: Option<ParseMode>,
) -> ResponseResult<()> {
    let mut caption_req = bot
        .edit_message_caption(chat_id, message_id)
        .caption(text.clone())
        .reply_markup(keyboard.clone());
    if let Some(mode) = parse_mode {
        caption_req = caption_req.parse_mode(mode);
    }

    match caption_req.await {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut text_req = bot
                .edit_message_text(chat_id, message_id, text)
                .reply_markup(keyboard);
            if let Some(mode) = parse_mode {
                text_req = text_req.parse_mode(mode);
            }
            text_req.await?;
            Ok(())
        }
    }
}

/// Handles callback queries from the menu inline keyboards.
///
/// Switches the welcome message between the home screen and the three
/// directory screens. Unknown callback data is logged and ignored.
pub async fn handle_menu_callback(bot: Bot, q: CallbackQuery, db_pool: Arc<DbPool>) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    if let Some(data) = q.data {
        let chat_id = q.message.as_ref().map(|m| m.chat().id);
        let message_id = q.message.as_ref().map(|m| m.id());

        if let (Some(chat_id), Some(message_id)) = (chat_id, message_id) {
            match data.as_str() {
                "stock" => {
                    let conn = db::get_connection(&db_pool).map_err(db_err)?;
                    let text = db::get_stock_text(&conn).map_err(db_err)?;
                    edit_caption_or_text(&bot, chat_id, message_id, text, back_menu(), None).await?;
                }
                "operators" => {
                    let conn = db::get_connection(&db_pool).map_err(db_err)?;
                    let operators = db::list_operators(&conn).map_err(db_err)?;
                    edit_caption_or_text(&bot, chat_id, message_id, render_operators(&operators), back_menu(), None)
                        .await?;
                }
                "links" => {
                    let conn = db::get_connection(&db_pool).map_err(db_err)?;
                    let links = db::list_links(&conn).map_err(db_err)?;
                    edit_caption_or_text(&bot, chat_id, message_id, render_links(&links), back_menu(), None).await?;
                }
                "back" => {
                    edit_caption_or_text(
                        &bot,
                        chat_id,
                        message_id,
                        HOME_CAPTION.to_string(),
                        main_menu(),
                        Some(ParseMode::MarkdownV2),
                    )
                    .await?;
                }
                other => {
                    log::warn!("Unknown callback data: {}", other);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn operator(username: &str, location: Option<&str>, online: bool, delivery: bool) -> Operator {
        Operator {
            username: username.to_string(),
            user_id: None,
            location: location.map(|s| s.to_string()),
            online,
            delivery,
        }
    }

    #[test]
    fn test_home_caption_is_valid_markdown_v2() {
        // Reserved characters that appear in prose must be escaped;
        // '*' is used in balanced pairs for bold.
        let bytes = HOME_CAPTION.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            if matches!(b, b'.' | b'!' | b'-' | b'(' | b')' | b'#' | b'+' | b'=' | b'_') {
                assert_eq!(bytes.get(i - 1), Some(&b'\\'), "unescaped reserved character at byte {}", i);
            }
        }
        assert_eq!(HOME_CAPTION.matches('*').count() % 2, 0);
    }

    #[test]
    fn test_main_menu_callback_data() {
        let keyboard = main_menu();

        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 3);

        let texts: Vec<&str> = keyboard.inline_keyboard[0].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["📦 Stock", "👤 Operators", "🔗 Links"]);
    }

    #[test]
    fn test_back_menu_is_single_button() {
        let keyboard = back_menu();

        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 1);
        assert_eq!(keyboard.inline_keyboard[0][0].text, "🔙 Back");
    }

    #[test]
    fn test_render_operators_empty() {
        assert_eq!(render_operators(&[]), "👤 Operators\n\nNo info yet.");
    }

    #[test]
    fn test_render_operators_lines() {
        let rows = vec![
            operator("@alice", Some("North side"), true, true),
            operator("@bob", None, false, false),
        ];

        let text = render_operators(&rows);
        assert_eq!(
            text,
            "👤 Operators\n\n\
             @alice | 📍 North side | 🟢 Online | 🚚 Available\n\
             @bob | 📍 Not specified | 🔴 Offline | 🚚 Not available"
        );
    }

    #[test]
    fn test_render_operators_is_deterministic() {
        let rows = vec![operator("@alice", Some("North side"), true, false)];
        assert_eq!(render_operators(&rows), render_operators(&rows));
    }

    #[test]
    fn test_render_links_empty() {
        assert_eq!(render_links(&[]), "🔗 Links\n\nNo info yet.");
    }

    #[test]
    fn test_render_links_pairs() {
        let rows = vec![
            Link {
                id: 1,
                name: "Main channel".to_string(),
                url: "https://t.me/example".to_string(),
            },
            Link {
                id: 2,
                name: "Backup".to_string(),
                url: "https://t.me/example2".to_string(),
            },
        ];

        let text = render_links(&rows);
        assert_eq!(
            text,
            "🔗 Useful Links\n\n\
             📢 Main channel\n🔗 https://t.me/example\n\n\
             📢 Backup\n🔗 https://t.me/example2\n"
        );
    }
}
