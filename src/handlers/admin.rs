use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::html::escape;
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::services::user::UserRecord;
use crate::state::AppState;

use super::RequestContext;

async fn refuse_non_admin(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
) -> HandlerResult<bool> {
    if ctx.is_admin {
        return Ok(false);
    }
    bot.send_message(chat_id, "❌ <b>Admin only command!</b>")
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(true)
}

pub async fn handle_premium(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
    arg: &str,
) -> HandlerResult<()> {
    if refuse_non_admin(bot, chat_id, ctx).await? {
        return Ok(());
    }

    let state = AppState::get()?;

    let Ok(target_id) = arg.parse::<u64>() else {
        bot.send_message(
            chat_id,
            format!(
                "👑 <b>Usage:</b> <code>/premium 123456789</code>\n\n\
                 <i>Grant {} days premium to a user</i>",
                state.users.paid_premium_days(),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    };

    let Some(target) = state.users.grant_premium(target_id).await? else {
        bot.send_message(chat_id, format!("❌ <b>User {target_id} not found!</b>"))
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    };

    let expiry = target
        .premium_expiry
        .map(|e| e.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "never".to_string());

    // Confirmation and notification are independent sends; neither failure
    // rolls back the grant or blocks the other.
    if let Err(e) = bot
        .send_message(
            chat_id,
            format!(
                "✅ <b>Premium Granted!</b>\n\n\
                 User: {}\n\
                 Premium until: {expiry}",
                escape(target.display_name()),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await
    {
        warn!("Failed to confirm premium grant to admin: {e}");
    }

    if let Err(e) = bot
        .send_message(
            ChatId(target_id as i64),
            format!(
                "🎉 <b>Premium Activated!</b>\n\n\
                 You have been granted {} days of premium access!\n\
                 Valid until: <b>{expiry}</b>\n\n\
                 Enjoy unlimited access to all features! 🚀",
                state.users.paid_premium_days(),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await
    {
        warn!("Failed to notify user {target_id} of premium grant: {e}");
    }

    Ok(())
}

pub async fn handle_add_credit(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
    arg: &str,
) -> HandlerResult<()> {
    if refuse_non_admin(bot, chat_id, ctx).await? {
        return Ok(());
    }

    let state = AppState::get()?;

    let Ok(target_id) = arg.parse::<u64>() else {
        bot.send_message(
            chat_id,
            format!(
                "👑 <b>Usage:</b> <code>/addcredit 123456789</code>\n\n\
                 <i>Top up a user's balance by {} credits</i>",
                state.users.free_daily_credits(),
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    };

    let Some(target) = state.users.add_credits(target_id).await? else {
        bot.send_message(chat_id, format!("❌ <b>User {target_id} not found!</b>"))
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    };

    bot.send_message(
        chat_id,
        format!(
            "✅ <b>Credits Added!</b>\n\n\
             User: {}\n\
             New balance: {} credits",
            escape(target.display_name()),
            target.credits,
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

/// Sends one message per recipient; one bad recipient must not abort the
/// batch. The returned count is attempted, not delivered: it is fixed
/// before any send resolves. Outbound pacing is the Throttle adaptor's job.
async fn deliver_broadcast<F, Fut, E>(recipients: Vec<UserRecord>, send: F) -> usize
where
    F: Fn(u64) -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let attempted = recipients.len();
    for user in recipients {
        if let Err(e) = send(user.id).await {
            warn!("Broadcast to {} failed: {e}", user.id);
        }
    }
    attempted
}

pub async fn handle_broadcast(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
    text: &str,
) -> HandlerResult<()> {
    if refuse_non_admin(bot, chat_id, ctx).await? {
        return Ok(());
    }

    if text.is_empty() {
        bot.send_message(
            chat_id,
            "📢 <b>Usage:</b> <code>/broadcast Your message here</code>\n\n\
             <i>Send message to all users</i>",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    bot.send_message(
        chat_id,
        "📢 <b>Broadcasting message...</b>\n\n<i>This may take a moment</i>",
    )
    .parse_mode(ParseMode::Html)
    .await?;

    let state = AppState::get()?;
    let users = state.users.all_users().await?;

    let announcement = format!("📢 <b>Announcement</b>\n\n{text}");
    let attempted = deliver_broadcast(users, |id| {
        let announcement = announcement.clone();
        async move {
            bot.send_message(ChatId(id as i64), announcement)
                .parse_mode(ParseMode::Html)
                .await
                .map(drop)
        }
    })
    .await;

    let preview: String = text.chars().take(50).collect();
    let ellipsis = if text.chars().count() > 50 { "..." } else { "" };

    bot.send_message(
        chat_id,
        format!(
            "✅ <b>Broadcast Complete!</b>\n\n\
             Message sent to {attempted} users\n\
             Message: \"{}{ellipsis}\"",
            escape(&preview),
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

pub async fn handle_stats(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
) -> HandlerResult<()> {
    if refuse_non_admin(bot, chat_id, ctx).await? {
        return Ok(());
    }

    let state = AppState::get()?;
    let stats = state.users.stats().await?;

    bot.send_message(
        chat_id,
        format!(
            "📊 <b>Bot Statistics</b>\n\n\
             <b>Total Users:</b> {total}\n\
             <b>Premium Users:</b> {premium} ({percent}%)\n\
             <b>Verified Users:</b> {verified}\n\
             <b>Total API Calls:</b> {lookups}\n\
             <b>Average per User:</b> {average}",
            total = stats.total_users,
            premium = stats.premium_users,
            percent = stats.premium_percent(),
            verified = stats.verified_users,
            lookups = stats.total_lookups,
            average = stats.lookups_per_user(),
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recipient(id: u64) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id,
            username: String::new(),
            first_name: format!("User{id}"),
            last_name: String::new(),
            credits: 5,
            credits_reset_on: now.date_naive(),
            premium: false,
            premium_expiry: None,
            verified: true,
            usage_count: 0,
            join_date: now,
            last_active: now,
        }
    }

    #[tokio::test]
    async fn broadcast_counts_every_recipient_even_when_a_send_fails() {
        let recipients = vec![recipient(1), recipient(2), recipient(3)];
        let sends = Arc::new(AtomicUsize::new(0));

        let counter = sends.clone();
        let attempted = deliver_broadcast(recipients, |id| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if id == 2 {
                    Err("blocked by recipient")
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(attempted, 3);
        assert_eq!(sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn broadcast_with_no_users_reports_zero() {
        let attempted =
            deliver_broadcast(Vec::new(), |_id| async { Ok::<(), &str>(()) }).await;
        assert_eq!(attempted, 0);
    }
}
