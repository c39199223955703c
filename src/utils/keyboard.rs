use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, UserId,
};
use url::Url;

use crate::services::osint::LookupKind;

pub const HELP_BUTTON: &str = "❓ Help";
pub const CREDITS_BUTTON: &str = "💰 My Credits";

pub fn main_menu() -> KeyboardMarkup {
    let mut keyboard = KeyboardMarkup::new([
        vec![
            KeyboardButton::new(LookupKind::Number.button_label()),
            KeyboardButton::new(LookupKind::Vehicle.button_label()),
        ],
        vec![
            KeyboardButton::new(LookupKind::Pincode.button_label()),
            KeyboardButton::new(LookupKind::Fampay.button_label()),
        ],
        vec![KeyboardButton::new(LookupKind::Aadhaar.button_label())],
        vec![
            KeyboardButton::new(CREDITS_BUTTON),
            KeyboardButton::new(HELP_BUTTON),
        ],
    ]);
    keyboard.resize_keyboard = true;
    keyboard
}

/// Join prompt: one URL button into the channel and one callback button that
/// encodes the verifying user's ID so nobody can confirm for someone else.
pub fn join_menu(channel: &str, user_id: UserId) -> Result<InlineKeyboardMarkup, url::ParseError> {
    let link = Url::parse(&format!("https://t.me/{}", channel.trim_start_matches('@')))?;

    Ok(InlineKeyboardMarkup::new([
        vec![InlineKeyboardButton::url("✅ Join Channel", link)],
        vec![InlineKeyboardButton::callback(
            "🔁 Check Membership",
            format!("verify_join_{}", user_id.0),
        )],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_menu_lists_every_lookup_button() {
        let menu = main_menu();
        assert!(menu.resize_keyboard);
        let labels: Vec<&str> = menu
            .keyboard
            .iter()
            .flatten()
            .map(|button| button.text.as_str())
            .collect();
        for kind in LookupKind::ALL {
            assert!(labels.contains(&kind.button_label()));
        }
        assert!(labels.contains(&HELP_BUTTON));
        assert!(labels.contains(&CREDITS_BUTTON));
    }

    #[test]
    fn join_menu_encodes_user_id() {
        let menu = join_menu("@ronjumodz", UserId(42)).unwrap();
        let rows = &menu.inline_keyboard;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].text, "🔁 Check Membership");
        match &rows[1][0].kind {
            teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, "verify_join_42");
            }
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    #[test]
    fn menu_buttons_round_trip_through_labels() {
        for kind in LookupKind::ALL {
            assert_eq!(LookupKind::from_button(kind.button_label()), Some(kind));
        }
    }
}
