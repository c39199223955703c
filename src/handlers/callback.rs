use teloxide::adaptors::Throttle;
use teloxide::payloads::{AnswerCallbackQuerySetters, SendMessageSetters};
use teloxide::prelude::Requester;
use teloxide::types::{CallbackQuery, ParseMode};
use teloxide::Bot;

use crate::error::HandlerResult;

use super::{verify, RequestContext};

pub async fn handle(
    bot: Throttle<Bot>,
    query: CallbackQuery,
    ctx: RequestContext,
) -> HandlerResult<()> {
    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };

    bot.answer_callback_query(query.id.clone())
        .text("Processing...")
        .await?;

    if let Some(encoded) = data.strip_prefix("verify_join_") {
        // The button encodes the user it was issued for; anyone else
        // clicking it is rejected.
        if encoded.parse::<u64>() != Ok(ctx.user.id.0) {
            bot.send_message(chat_id, "❌ <b>This button is not for you!</b>")
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }

        verify::run_callback_check(&bot, chat_id, &ctx).await?;
    }

    Ok(())
}
