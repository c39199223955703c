use std::sync::{Arc, OnceLock};

use crate::config::AppConfig;
use crate::error::{BotError, BotResult};
use crate::services::osint::OsintClient;
use crate::services::session::SessionService;
use crate::services::user::UserService;
use crate::storage::{KvStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub sessions: SessionService,
    pub osint: OsintClient,
}

static APP_STATE: OnceLock<AppState> = OnceLock::new();

impl AppState {
    pub fn new(config: &AppConfig) -> BotResult<Self> {
        // Swap this for a durable KvStore implementation to survive restarts;
        // nothing above the trait needs to change.
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());

        Ok(Self {
            users: UserService::new(store, config.quota.clone()),
            sessions: SessionService::new(),
            osint: OsintClient::new(&config.osint)?,
        })
    }

    pub fn set_global(state: AppState) -> BotResult<()> {
        APP_STATE
            .set(state)
            .map_err(|_| BotError::AppState("Failed to set global app state".into()))
    }

    pub fn get() -> BotResult<AppState> {
        APP_STATE
            .get()
            .cloned()
            .ok_or_else(|| BotError::AppState("App state not initialized".into()))
    }
}
