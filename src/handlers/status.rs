use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html::escape;
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::state::AppState;

use super::RequestContext;

pub async fn handle(bot: &Throttle<Bot>, chat_id: ChatId, ctx: &RequestContext) -> HandlerResult<()> {
    let state = AppState::get()?;

    let Some(user) = state.users.load(ctx.user.id.0).await? else {
        bot.send_message(
            chat_id,
            "❌ <b>User not found!</b>\nUse <code>/start</code> to begin.",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    };

    let premium_status = if user.premium {
        let expiry = user
            .premium_expiry
            .map(|e| e.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        format!("✅ <b>Premium Active</b>\nExpires: {expiry}")
    } else {
        "❌ <b>Premium Expired</b>".to_string()
    };

    let username = if user.username.is_empty() {
        "N/A".to_string()
    } else {
        escape(&user.username)
    };

    bot.send_message(
        chat_id,
        format!(
            "👤 <b>Account Status</b>\n\n\
             <b>User ID:</b> {id}\n\
             <b>Name:</b> {first} {last}\n\
             <b>Username:</b> @{username}\n\n\
             <b>Premium Status:</b>\n{premium_status}\n\n\
             <b>Credits:</b> {credits} remaining today\n\
             <b>API Usage:</b> {usage} requests\n\
             <b>Joined:</b> {joined}\n\
             <b>Last Active:</b> {active}\n\n\
             <b>Verification:</b> {verified}",
            id = user.id,
            first = escape(&user.first_name),
            last = escape(&user.last_name),
            credits = user.credits,
            usage = user.usage_count,
            joined = user.join_date.format("%Y-%m-%d"),
            active = user.last_active.format("%Y-%m-%d %H:%M UTC"),
            verified = if user.verified {
                "✅ Verified"
            } else {
                "❌ Not Verified"
            },
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}
