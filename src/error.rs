use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("App state error: {0}")]
    AppState(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("OSINT API error: {0}")]
    Osint(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BotResult<T> = Result<T, BotError>;

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
