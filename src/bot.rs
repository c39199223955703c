use teloxide::adaptors::throttle::Limits;
use teloxide::adaptors::Throttle;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::Bot;

use crate::command;
use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::handlers::get_handler;
use crate::web;

pub struct BotService {
    pub bot: Throttle<Bot>,
}

impl BotService {
    pub fn new(config: &AppConfig) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .pool_idle_timeout(std::time::Duration::from_secs(60))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .build()?;

        let bot = Bot::with_client(config.telegram.token.clone(), client).throttle(Limits::default());

        Ok(Self { bot })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(_) => info!("Successfully connected to Telegram API"),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {e}").into());
            }
        }

        command::setup_commands(&self.bot).await?;

        let config = AppConfig::get()?;
        let options = webhooks::Options::new(config.server.addr, config.telegram.webhook_url.clone());

        // axum_to_router registers the webhook with Telegram and hands back
        // the update route; the ops routes are merged into the same server.
        let (listener, stop_flag, router) = webhooks::axum_to_router(self.bot.clone(), options).await?;
        let router = router.merge(web::ops_router(self.bot.clone()));

        let tcp = tokio::net::TcpListener::bind(config.server.addr).await?;
        info!("Webhook server listening on {}", config.server.addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(tcp, router)
                .with_graceful_shutdown(stop_flag)
                .await
            {
                error!("Webhook server error: {e}");
            }
        });

        Dispatcher::builder(self.bot.clone(), get_handler())
            .dependencies(dptree::deps![])
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;

        Ok(())
    }
}
