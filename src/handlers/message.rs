use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{Message, ParseMode};
use teloxide::Bot;

use crate::command::Command;
use crate::error::HandlerResult;
use crate::services::osint::LookupKind;
use crate::state::AppState;
use crate::utils::keyboard;

use super::{admin, help, lookup, start, status, verify, RequestContext};

const UNKNOWN_COMMAND: &str =
    "❌ <b>Unknown command!</b>\nUse <code>/help</code> to see available commands.";

const FALLBACK: &str = "🤖 <b>OSINT Bot</b>\n\n\
                        I can help you lookup information.\n\
                        Use <code>/help</code> to see all commands.";

/// The command router. Dispatch priority: slash commands, fixed menu
/// buttons, pending session markers, lookup-initiating buttons, fallback.
/// Everything except /start sits behind the join-verification gate.
pub async fn handle(bot: Throttle<Bot>, msg: Message, ctx: RequestContext) -> HandlerResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let text = text.trim();
    let chat_id = msg.chat.id;
    let state = AppState::get()?;

    state.users.touch(ctx.user.id.0).await?;

    if let Some(cmd) = Command::parse(text) {
        if !matches!(cmd, Command::Start) && !verify::gate(&bot, chat_id, &ctx).await? {
            return Ok(());
        }

        return match cmd {
            Command::Start => start::handle(&bot, &msg, &ctx).await,
            Command::Help => help::handle(&bot, chat_id, &ctx).await,
            Command::Status => status::handle(&bot, chat_id, &ctx).await,
            Command::Stats => admin::handle_stats(&bot, chat_id, &ctx).await,
            Command::Lookup(kind, arg) => lookup::handle(&bot, chat_id, &ctx, kind, &arg).await,
            Command::Premium(arg) => admin::handle_premium(&bot, chat_id, &ctx, &arg).await,
            Command::AddCredit(arg) => admin::handle_add_credit(&bot, chat_id, &ctx, &arg).await,
            Command::Broadcast(text) => admin::handle_broadcast(&bot, chat_id, &ctx, &text).await,
        };
    }

    if text.starts_with('/') {
        if !verify::gate(&bot, chat_id, &ctx).await? {
            return Ok(());
        }
        bot.send_message(chat_id, UNKNOWN_COMMAND)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    // Fixed menu buttons outrank a pending session marker.
    match text {
        keyboard::HELP_BUTTON => {
            if verify::gate(&bot, chat_id, &ctx).await? {
                help::handle(&bot, chat_id, &ctx).await?;
            }
            return Ok(());
        }
        keyboard::CREDITS_BUTTON => {
            if verify::gate(&bot, chat_id, &ctx).await? {
                status::handle(&bot, chat_id, &ctx).await?;
            }
            return Ok(());
        }
        _ => {}
    }

    // A pending marker consumes the whole message as the lookup argument.
    if let Some(kind) = state.sessions.take(chat_id.0) {
        if !verify::gate(&bot, chat_id, &ctx).await? {
            return Ok(());
        }
        return lookup::handle(&bot, chat_id, &ctx, kind, text).await;
    }

    if let Some(kind) = LookupKind::from_button(text) {
        if !verify::gate(&bot, chat_id, &ctx).await? {
            return Ok(());
        }
        state.sessions.set(chat_id.0, kind);
        bot.send_message(chat_id, kind.prompt()).await?;
        return Ok(());
    }

    if !verify::gate(&bot, chat_id, &ctx).await? {
        return Ok(());
    }
    bot.send_message(chat_id, FALLBACK)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}
