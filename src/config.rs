use std::net::SocketAddr;
use std::sync::OnceLock;

use teloxide::types::UserId;
use url::Url;

use crate::error::{BotError, BotResult};

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
    pub channel: ChannelConfig,
    pub admin: AdminConfig,
    pub osint: OsintConfig,
    pub quota: QuotaConfig,
}

impl AppConfig {
    pub fn set_global(config: AppConfig) -> BotResult<()> {
        APP_CONFIG
            .set(config)
            .map_err(|_| BotError::AppState("Failed to set global app config".to_string()))
    }

    pub fn get() -> BotResult<&'static AppConfig> {
        APP_CONFIG
            .get()
            .ok_or_else(|| BotError::AppState("App config not initialized".to_string()))
    }
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    /// Public URL Telegram delivers updates to, e.g. `https://bot.example.com/webhook`.
    pub webhook_url: Url,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Channel users must join before lookups unlock, with leading `@`.
    pub username: String,
}

#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub telegram_user_id: UserId,
}

#[derive(Clone, Debug)]
pub struct OsintConfig {
    pub base_url: Url,
}

#[derive(Clone, Debug)]
pub struct QuotaConfig {
    pub free_daily_credits: u32,
    pub premium_daily_credits: u32,
    pub free_trial_hours: i64,
    pub paid_premium_days: i64,
}

fn required(key: &str) -> BotResult<String> {
    std::env::var(key).map_err(|_| BotError::Config(format!("Missing {key}")))
}

fn parsed<T: std::str::FromStr>(key: &str, value: String) -> BotResult<T> {
    value
        .parse::<T>()
        .map_err(|_| BotError::Config(format!("Invalid {key}")))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> BotResult<T> {
    match std::env::var(key) {
        Ok(value) => parsed(key, value),
        Err(_) => Ok(default),
    }
}

pub fn build_config() -> BotResult<AppConfig> {
    info!("Building AppConfig...");

    let channel = required("CHANNEL_USERNAME")?;
    if !channel.starts_with('@') {
        return Err(BotError::Config(
            "CHANNEL_USERNAME must start with '@'".to_string(),
        ));
    }

    let config = AppConfig {
        telegram: TelegramConfig {
            token: required("TELEGRAM_BOT_TOKEN")?,
            webhook_url: parsed("WEBHOOK_URL", required("WEBHOOK_URL")?)?,
        },
        server: ServerConfig {
            addr: parsed_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
        },
        channel: ChannelConfig { username: channel },
        admin: AdminConfig {
            telegram_user_id: UserId(parsed(
                "ADMIN_TELEGRAM_USER_ID",
                required("ADMIN_TELEGRAM_USER_ID")?,
            )?),
        },
        osint: OsintConfig {
            base_url: parsed("OSINT_API_BASE_URL", required("OSINT_API_BASE_URL")?)?,
        },
        quota: QuotaConfig {
            free_daily_credits: parsed_or("FREE_DAILY_CREDITS", 5)?,
            premium_daily_credits: parsed_or("PREMIUM_DAILY_CREDITS", 100)?,
            free_trial_hours: parsed_or("FREE_TRIAL_HOURS", 24)?,
            paid_premium_days: parsed_or("PAID_PREMIUM_DAYS", 30)?,
        },
    };

    info!("AppConfig built");

    Ok(config)
}
