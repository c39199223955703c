use bot::BotService;
use state::AppState;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

mod bot;
mod command;
mod config;
mod error;
mod handlers;
mod services;
mod state;
mod storage;
mod utils;
mod web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init_timed();

    info!("Starting bot...");

    let config = config::build_config()?;
    config::AppConfig::set_global(config)?;
    let config = config::AppConfig::get()?;

    info!("Initializing AppState...");
    AppState::set_global(AppState::new(config)?)?;

    info!("Initializing BotService...");
    let service = BotService::new(config)?;

    info!("Bot instance created");

    service
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("bot terminated: {e}"))
}
