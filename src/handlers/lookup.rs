use teloxide::adaptors::Throttle;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;
use teloxide::types::{ChatId, ParseMode};
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::services::osint::LookupKind;
use crate::services::user::{QuotaOutcome, UserRecord};
use crate::state::AppState;

use super::{verify, RequestContext};

/// Why a lookup attempt stops before reaching the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refusal {
    Premium,
    Quota,
    BadArgument(&'static str),
}

/// Precondition order after the join gate: premium feature, quota, argument
/// format. The quota refusal is checked before the argument format, but the
/// actual decrement happens after validation so a bad argument never costs
/// a credit.
fn precheck(user: &UserRecord, kind: LookupKind, arg: &str) -> Option<Refusal> {
    if kind.premium_only() && !user.premium {
        return Some(Refusal::Premium);
    }
    if !user.premium && user.credits == 0 {
        return Some(Refusal::Quota);
    }
    if let Err(hint) = kind.validate(arg) {
        return Some(Refusal::BadArgument(hint));
    }
    None
}

fn limit_text(free_daily: u32) -> String {
    format!(
        "❌ <b>Free Limit Exceeded!</b>\n\n\
         You've used all {free_daily} free lookups for today.\n\
         Premium users get unlimited access!",
    )
}

/// One lookup attempt. The upstream client is only called once every
/// refusal branch has been cleared and a credit (for free users) is spent.
pub async fn handle(
    bot: &Throttle<Bot>,
    chat_id: ChatId,
    ctx: &RequestContext,
    kind: LookupKind,
    arg: &str,
) -> HandlerResult<()> {
    let state = AppState::get()?;

    let user = state.users.ensure(&ctx.user).await?;
    if !user.verified {
        verify::run_check(bot, chat_id, ctx).await?;
        return Ok(());
    }

    match precheck(&user, kind, arg) {
        Some(Refusal::Premium) => {
            bot.send_message(
                chat_id,
                format!(
                    "⭐ <b>Premium Feature!</b>\n\n\
                     {} lookup is available only for premium users.\n\n\
                     Upgrade to get:\n\
                     • FamPay account lookup\n\
                     • Aadhaar information\n\
                     • Unlimited API requests\n\
                     • Priority support",
                    kind.title()
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            return Ok(());
        }
        Some(Refusal::Quota) => {
            bot.send_message(chat_id, limit_text(state.users.free_daily_credits()))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
        Some(Refusal::BadArgument(hint)) => {
            bot.send_message(chat_id, hint)
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
        None => {}
    }

    // A racing request may drain the last credit between the precheck and
    // the locked decrement, so exhaustion is re-checked here.
    if state.users.spend_credit(ctx.user.id.0).await? == QuotaOutcome::Exhausted {
        bot.send_message(chat_id, limit_text(state.users.free_daily_credits()))
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    bot.send_message(chat_id, format!("🔍 Searching {} details...", kind.title()))
        .await?;

    match state.osint.lookup(kind, arg).await {
        Ok(report) => {
            state.users.record_usage(ctx.user.id.0).await?;
            bot.send_message(chat_id, report)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Err(e) => {
            error!("{} lookup for {:?} failed: {e}", kind.title(), arg);
            bot.send_message(chat_id, kind.error_text())
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(credits: u32, premium: bool) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: 7,
            username: "tester".into(),
            first_name: "Tester".into(),
            last_name: String::new(),
            credits,
            credits_reset_on: now.date_naive(),
            premium,
            premium_expiry: None,
            verified: true,
            usage_count: 0,
            join_date: now,
            last_active: now,
        }
    }

    #[test]
    fn exhausted_user_is_refused_before_argument_validation() {
        // "98765" is too short for a number lookup, but the quota refusal
        // outranks the format check.
        let refusal = precheck(&user(0, false), LookupKind::Number, "98765");
        assert_eq!(refusal, Some(Refusal::Quota));
    }

    #[test]
    fn bad_argument_with_credits_left_gets_the_usage_hint() {
        let refusal = precheck(&user(3, false), LookupKind::Number, "98765");
        assert!(matches!(refusal, Some(Refusal::BadArgument(_))));
    }

    #[test]
    fn premium_gate_outranks_quota_and_format() {
        let refusal = precheck(&user(0, false), LookupKind::Aadhaar, "bad");
        assert_eq!(refusal, Some(Refusal::Premium));
    }

    #[test]
    fn exhausted_user_never_clears_the_precheck() {
        // `handle` only calls the upstream client once `precheck` returns
        // `None`; an exhausted free user stops here even with a valid
        // argument.
        assert!(precheck(&user(0, false), LookupKind::Number, "9876543210").is_some());
        assert!(precheck(&user(1, false), LookupKind::Number, "9876543210").is_none());
    }

    #[test]
    fn premium_user_clears_every_refusal_branch() {
        assert_eq!(
            precheck(&user(0, true), LookupKind::Aadhaar, "123456789012"),
            None
        );
    }
}
