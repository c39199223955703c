use teloxide::adaptors::Throttle;
use teloxide::prelude::Requester;
use teloxide::types::BotCommand;
use teloxide::Bot;

use crate::error::HandlerResult;
use crate::services::osint::LookupKind;

/// Everything the router can dispatch from a slash command. Parsing is done
/// by hand because the argument rules are uneven: lookup and admin commands
/// take the first whitespace token only (multi-word arguments are truncated
/// by design), while /broadcast takes the whole remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Stats,
    Lookup(LookupKind, String),
    Premium(String),
    AddCredit(String),
    Broadcast(String),
}

impl Command {
    /// `None` means the text is not a recognized slash command.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };
        // Accept the /command@botname form used in groups.
        let head = head.split('@').next().unwrap_or(head);
        let first_token = rest.split_whitespace().next().unwrap_or("").to_string();

        match head {
            "/start" => Some(Command::Start),
            "/help" => Some(Command::Help),
            "/status" => Some(Command::Status),
            "/stats" => Some(Command::Stats),
            "/number" => Some(Command::Lookup(LookupKind::Number, first_token)),
            "/vehicle" => Some(Command::Lookup(LookupKind::Vehicle, first_token)),
            "/pincode" => Some(Command::Lookup(LookupKind::Pincode, first_token)),
            "/fampay" => Some(Command::Lookup(LookupKind::Fampay, first_token)),
            "/aadhaar" => Some(Command::Lookup(LookupKind::Aadhaar, first_token)),
            "/premium" => Some(Command::Premium(first_token)),
            "/addcredit" => Some(Command::AddCredit(first_token)),
            "/broadcast" => Some(Command::Broadcast(rest.to_string())),
            _ => None,
        }
    }
}

pub async fn setup_commands(bot: &Throttle<Bot>) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(user_commands()).await?;
    Ok(())
}

fn user_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Start the bot"),
        BotCommand::new("help", "Show all commands"),
        BotCommand::new("status", "Your account status"),
        BotCommand::new("number", "Indian number details"),
        BotCommand::new("vehicle", "Vehicle RC details"),
        BotCommand::new("pincode", "Pincode information"),
        BotCommand::new("fampay", "FamPay details (premium)"),
        BotCommand::new("aadhaar", "Aadhaar details (premium)"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_keywords() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/status"), Some(Command::Status));
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
    }

    #[test]
    fn parses_bot_suffix_form() {
        assert_eq!(Command::parse("/start@osintallinbot"), Some(Command::Start));
    }

    #[test]
    fn lookup_takes_first_token_only() {
        assert_eq!(
            Command::parse("/vehicle UP26R 4007"),
            Some(Command::Lookup(LookupKind::Vehicle, "UP26R".to_string()))
        );
        assert_eq!(
            Command::parse("/number 9876543210"),
            Some(Command::Lookup(LookupKind::Number, "9876543210".to_string()))
        );
    }

    #[test]
    fn missing_argument_yields_empty_string() {
        assert_eq!(
            Command::parse("/pincode"),
            Some(Command::Lookup(LookupKind::Pincode, String::new()))
        );
        assert_eq!(Command::parse("/premium"), Some(Command::Premium(String::new())));
    }

    #[test]
    fn broadcast_keeps_full_remainder() {
        assert_eq!(
            Command::parse("/broadcast hello everyone out there"),
            Some(Command::Broadcast("hello everyone out there".to_string()))
        );
    }

    #[test]
    fn unknown_slash_command_is_none() {
        assert_eq!(Command::parse("/frobnicate"), None);
        assert_eq!(Command::parse("hello"), None);
    }
}
