mod admin;
mod callback;
mod help;
mod lookup;
mod message;
mod start;
mod status;
mod verify;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::dptree;
use teloxide::types::{Update, User};

use crate::config::AppConfig;

/// Per-update context extracted once before any branch runs.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub user: User,
    pub is_admin: bool,
}

pub fn get_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .filter_map(|update: Update| {
            let config = AppConfig::get().ok()?;
            let user = update.from()?.clone();
            let is_admin = user.id == config.admin.telegram_user_id;
            Some(RequestContext { user, is_admin })
        })
        .branch(Update::filter_message().endpoint(message::handle))
        .branch(Update::filter_callback_query().endpoint(callback::handle))
}
