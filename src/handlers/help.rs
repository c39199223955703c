use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{ChatId, ParseMode};
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::state::AppState;

use super::RequestContext;

pub async fn handle(bot: &Throttle<Bot>, chat_id: ChatId, ctx: &RequestContext) -> HandlerResult<()> {
    let state = AppState::get()?;
    let is_premium = state
        .users
        .load(ctx.user.id.0)
        .await?
        .map(|user| user.premium)
        .unwrap_or(false);

    let mut text = String::from("🤖 <b>OSINT Bot Help Menu</b>\n\n");

    text += "<b>🔍 Information Lookup Commands:</b>\n";
    text += "<code>/number 9876543210</code> - Indian number details\n";
    text += "<code>/vehicle UP26R4007</code> - Vehicle RC details\n";
    text += "<code>/pincode 560001</code> - Pincode information\n";

    if is_premium {
        text += "<code>/fampay loverajoriya@fam</code> - FamPay details\n";
        text += "<code>/aadhaar 413129678885</code> - Aadhaar details\n";
    } else {
        text += "\n<b>⭐ Premium Features:</b>\n";
        text += "• FamPay account lookup\n";
        text += "• Aadhaar information\n";
        text += "• Unlimited API requests\n";
    }

    text += "\n<b>👤 User Commands:</b>\n";
    text += "<code>/start</code> - Start the bot\n";
    text += "<code>/help</code> - Show this menu\n";
    text += "<code>/status</code> - Your account status\n";

    if ctx.is_admin {
        text += "\n<b>👑 Admin Commands:</b>\n";
        text += "<code>/premium user_id</code> - Grant premium\n";
        text += "<code>/addcredit user_id</code> - Top up credits\n";
        text += "<code>/broadcast message</code> - Send message to all users\n";
        text += "<code>/stats</code> - Bot statistics\n";
    }

    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}
