use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{ChatId, ParseMode, Recipient, UserId};
use teloxide::Bot;

use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::state::AppState;
use crate::utils::keyboard;

use super::RequestContext;

/// Join gate for everything except /start. Returns `true` when the caller
/// may proceed with the command. An unverified user never proceeds in the
/// same update: if the membership check passes they are verified and told
/// so, and their next message goes through.
pub async fn gate(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
) -> HandlerResult<bool> {
    let state = AppState::get()?;
    let user = state.users.ensure(&ctx.user).await?;
    if user.verified {
        return Ok(true);
    }

    run_check(bot, chat_id, ctx).await?;
    Ok(false)
}

/// One round of the verification flow: check membership, then either confirm
/// or (re-)send the join prompt. Idempotent, retry without limit.
pub async fn run_check(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
) -> HandlerResult<()> {
    let config = AppConfig::get()?;
    let state = AppState::get()?;
    state.users.ensure(&ctx.user).await?;

    let joined = match is_channel_member(bot, ctx.user.id).await {
        Ok(joined) => joined,
        Err(e) => {
            warn!("Channel membership check failed for {}: {e}", ctx.user.id);
            false
        }
    };

    if joined {
        state.users.mark_verified(ctx.user.id.0).await?;

        bot.send_message(
            chat_id,
            format!(
                "✅ <b>Verification Successful!</b>\n\n\
                 Welcome to <b>{channel}</b>\n\
                 You can now use all bot features!\n\n\
                 🎁 <i>You have received {hours} hours of premium access!</i>\n\
                 Use <code>/help</code> to see available commands.",
                channel = config.channel.username,
                hours = state.users.free_trial_hours(),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
    } else {
        bot.send_message(
            chat_id,
            format!(
                "🔒 <b>Channel Membership Required</b>\n\n\
                 To use this bot, you must join our channel:\n\
                 <b>{channel}</b>\n\n\
                 1. Click \"Join Channel\" below\n\
                 2. After joining, click \"Check Membership\"\n\n\
                 <i>This helps us keep the bot free and updated!</i>",
                channel = config.channel.username,
            ),
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard::join_menu(&config.channel.username, ctx.user.id)?)
        .await?;
    }

    Ok(())
}

/// Retry variant used by the callback button: same check, but failure sends
/// the "not joined yet" instructions instead of repeating the full prompt.
pub async fn run_callback_check(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
) -> HandlerResult<()> {
    let config = AppConfig::get()?;
    let state = AppState::get()?;
    state.users.ensure(&ctx.user).await?;

    let joined = match is_channel_member(bot, ctx.user.id).await {
        Ok(joined) => joined,
        Err(e) => {
            warn!("Channel membership check failed for {}: {e}", ctx.user.id);
            false
        }
    };

    if joined {
        state.users.mark_verified(ctx.user.id.0).await?;

        bot.send_message(
            chat_id,
            format!(
                "✅ <b>Verification Successful!</b>\n\n\
                 Welcome to <b>{}</b>! You can now use all bot features.\n\n\
                 Use <code>/help</code> to see available commands.",
                config.channel.username,
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
    } else {
        bot.send_message(
            chat_id,
            "❌ <b>Not Joined Yet!</b>\n\n\
             I don't see you in the channel. Please:\n\
             1. Click the \"Join Channel\" button\n\
             2. Wait a few seconds\n\
             3. Click \"Check Membership\" again",
        )
        .parse_mode(ParseMode::Html)
        .await?;
    }

    Ok(())
}

async fn is_channel_member(bot: &Throttle<Bot>, user_id: UserId) -> BotResult<bool> {
    let config = AppConfig::get()?;
    let member = bot
        .get_chat_member(
            Recipient::ChannelUsername(config.channel.username.clone()),
            user_id,
        )
        .await?;

    // member / administrator / creator count; restricted, left and banned
    // do not.
    Ok(member.kind.is_privileged() || member.kind.is_member())
}
