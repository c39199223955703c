use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{Message, ParseMode};
use teloxide::utils::html::escape;
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::state::AppState;
use crate::utils::keyboard;

use super::{verify, RequestContext};

pub async fn handle(bot: &Throttle<Bot>, msg: &Message, ctx: &RequestContext) -> HandlerResult<()> {
    let state = AppState::get()?;

    // /start resets any half-finished button flow.
    state.sessions.clear(msg.chat.id.0);

    let user = match state.users.load(ctx.user.id.0).await? {
        None => {
            let user = state.users.create(&ctx.user).await?;

            bot.send_message(
                msg.chat.id,
                format!(
                    "👋 <b>Welcome to OSINT Bot!</b>\n\n\
                     I can help you with various information lookups:\n\
                     • 📱 Indian Number Details\n\
                     • 🚗 Vehicle RC Details\n\
                     • 📮 Pincode Information\n\
                     • 💳 FamPay Account Details\n\
                     • 🪪 Aadhaar Information\n\n\
                     🎁 <b>You've received {} hours of premium access!</b>\n\
                     Use <code>/help</code> to see all commands.",
                    state.users.free_trial_hours(),
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard::main_menu())
            .await?;

            user
        }
        Some(user) => {
            let premium_status = if user.premium {
                let expiry = user
                    .premium_expiry
                    .map(|e| e.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "never".to_string());
                format!("✅ <b>Premium Active</b> (Expires: {expiry})")
            } else {
                "❌ <b>Premium Expired</b>".to_string()
            };

            bot.send_message(
                msg.chat.id,
                format!(
                    "👋 <b>Welcome back, {name}!</b>\n\n\
                     {premium_status}\n\
                     💰 Credits: {credits}\n\
                     📊 API Usage: {usage} requests\n\
                     👤 Verification: {verified}\n\n\
                     Use <code>/help</code> to see available commands.",
                    name = escape(user.display_name()),
                    credits = user.credits,
                    usage = user.usage_count,
                    verified = if user.verified {
                        "✅ Verified"
                    } else {
                        "❌ Not Verified"
                    },
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard::main_menu())
            .await?;

            user
        }
    };

    if !user.verified {
        verify::run_check(bot, msg.chat.id, ctx).await?;
    }

    Ok(())
}
