//! Thin ops glue around the webhook server: registration management, health
//! probe, and a status page. None of this touches command logic.

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use teloxide::adaptors::Throttle;
use teloxide::prelude::Requester;
use teloxide::Bot;

use crate::config::AppConfig;
use crate::state::AppState;

pub fn ops_router(bot: Throttle<Bot>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status_page))
        .route("/setup", get(setup_webhook))
        .route("/remove", get(remove_webhook))
        .with_state(bot)
}

async fn user_count() -> usize {
    match AppState::get() {
        Ok(state) => state.users.count().await.unwrap_or(0),
        Err(_) => 0,
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "users": user_count().await }))
}

async fn status_page() -> Html<String> {
    let channel = AppConfig::get()
        .map(|c| c.channel.username.clone())
        .unwrap_or_default();

    Html(format!(
        "<html>\
           <head><title>OSINT Bot Status</title></head>\
           <body>\
             <h1>🤖 OSINT Telegram Bot</h1>\
             <p>Status: <strong>Running</strong></p>\
             <p>Total Users: {users}</p>\
             <p>Channel: {channel}</p>\
             <br>\
             <p>Webhook: <a href=\"/setup\">/setup</a></p>\
             <p>Remove: <a href=\"/remove\">/remove</a></p>\
             <p>Health: <a href=\"/health\">/health</a></p>\
           </body>\
         </html>",
        users = user_count().await,
    ))
}

/// Re-registers the webhook with the configured public URL. The URL comes
/// from config, never from the inbound request.
async fn setup_webhook(State(bot): State<Throttle<Bot>>) -> Json<Value> {
    let url = match AppConfig::get() {
        Ok(config) => config.telegram.webhook_url.clone(),
        Err(e) => return Json(json!({ "success": false, "error": e.to_string() })),
    };

    match bot.set_webhook(url.clone()).await {
        Ok(_) => Json(json!({
            "success": true,
            "message": "Webhook set successfully!",
            "webhookUrl": url.as_str(),
        })),
        Err(e) => Json(json!({
            "success": false,
            "message": "Failed to set webhook",
            "error": e.to_string(),
        })),
    }
}

async fn remove_webhook(State(bot): State<Throttle<Bot>>) -> Json<Value> {
    match bot.delete_webhook().await {
        Ok(_) => Json(json!({ "success": true, "message": "Webhook removed successfully!" })),
        Err(e) => Json(json!({
            "success": false,
            "message": "Failed to remove webhook",
            "error": e.to_string(),
        })),
    }
}
