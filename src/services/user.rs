use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::QuotaConfig;
use crate::error::BotResult;
use crate::storage::KvStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Remaining free lookups for the current UTC day.
    pub credits: u32,
    /// Day the credit balance was last reset; compared lazily on load.
    pub credits_reset_on: NaiveDate,
    pub premium: bool,
    pub premium_expiry: Option<DateTime<Utc>>,
    pub verified: bool,
    /// Successful lookups ever performed. Statistics only; quota is `credits`.
    pub usage_count: u64,
    pub join_date: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl UserRecord {
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            "User"
        } else {
            &self.first_name
        }
    }
}

/// Outcome of the quota gate for one lookup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaOutcome {
    /// Premium bypasses the balance entirely.
    Premium,
    /// One credit spent; remaining balance attached.
    Spent(u32),
    Exhausted,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn KvStore>,
    quota: QuotaConfig,
    /// Per-user mutation locks. Updates for one user can arrive
    /// concurrently, and the credit decrement is a read-check-write on the
    /// store; without per-user serialization two requests could double-spend.
    locks: Arc<DashMap<u64, Arc<Mutex<()>>>>,
}

impl UserService {
    pub fn new(store: Arc<dyn KvStore>, quota: QuotaConfig) -> Self {
        Self {
            store,
            quota,
            locks: Arc::new(DashMap::new()),
        }
    }

    fn key(id: u64) -> String {
        format!("user:{id}")
    }

    fn user_lock(&self, id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn free_daily_credits(&self) -> u32 {
        self.quota.free_daily_credits
    }

    pub fn free_trial_hours(&self) -> i64 {
        self.quota.free_trial_hours
    }

    pub fn paid_premium_days(&self) -> i64 {
        self.quota.paid_premium_days
    }

    /// Loads a record, applying lazy premium expiry and the lazy daily
    /// credit reset. Normalized records are written back immediately so a
    /// later crash cannot resurrect expired premium.
    pub async fn load(&self, id: u64) -> BotResult<Option<UserRecord>> {
        let Some(raw) = self.store.get(&Self::key(id)).await? else {
            return Ok(None);
        };
        let mut user: UserRecord =
            serde_json::from_str(&raw).map_err(crate::storage::StorageError::from)?;

        if self.normalize(&mut user, Utc::now()) {
            self.save(&user).await?;
        }

        Ok(Some(user))
    }

    fn normalize(&self, user: &mut UserRecord, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if user.premium {
            if let Some(expiry) = user.premium_expiry {
                if expiry < now {
                    user.premium = false;
                    user.premium_expiry = None;
                    changed = true;
                }
            }
        }

        let today = now.date_naive();
        if user.credits_reset_on < today {
            user.credits = self.quota.free_daily_credits;
            user.credits_reset_on = today;
            changed = true;
        }

        changed
    }

    pub async fn save(&self, user: &UserRecord) -> BotResult<()> {
        let raw = serde_json::to_string(user).map_err(crate::storage::StorageError::from)?;
        self.store.put(&Self::key(user.id), raw).await?;
        Ok(())
    }

    /// Lazily creates the record on first interaction. New users start with
    /// the free-trial premium window and a full daily credit balance.
    pub async fn create(&self, tg_user: &teloxide::types::User) -> BotResult<UserRecord> {
        let now = Utc::now();
        let user = UserRecord {
            id: tg_user.id.0,
            username: tg_user.username.clone().unwrap_or_default(),
            first_name: tg_user.first_name.clone(),
            last_name: tg_user.last_name.clone().unwrap_or_default(),
            credits: self.quota.free_daily_credits,
            credits_reset_on: now.date_naive(),
            premium: true,
            premium_expiry: Some(now + Duration::hours(self.quota.free_trial_hours)),
            verified: false,
            usage_count: 0,
            join_date: now,
            last_active: now,
        };
        self.save(&user).await?;
        Ok(user)
    }

    pub async fn ensure(&self, tg_user: &teloxide::types::User) -> BotResult<UserRecord> {
        match self.load(tg_user.id.0).await? {
            Some(user) => Ok(user),
            None => self.create(tg_user).await,
        }
    }

    /// Updates `last_active` if a record exists; a no-op before first /start.
    pub async fn touch(&self, id: u64) -> BotResult<()> {
        let lock = self.user_lock(id);
        let _guard = lock.lock().await;

        if let Some(mut user) = self.load(id).await? {
            user.last_active = Utc::now();
            self.save(&user).await?;
        }
        Ok(())
    }

    /// The quota gate. Runs the whole read-check-decrement-write sequence
    /// under the per-user lock so concurrent lookups for one user cannot
    /// observe a stale balance.
    pub async fn spend_credit(&self, id: u64) -> BotResult<QuotaOutcome> {
        let lock = self.user_lock(id);
        let _guard = lock.lock().await;

        let Some(mut user) = self.load(id).await? else {
            return Ok(QuotaOutcome::Exhausted);
        };
        if user.premium {
            return Ok(QuotaOutcome::Premium);
        }
        if user.credits == 0 {
            return Ok(QuotaOutcome::Exhausted);
        }
        user.credits -= 1;
        self.save(&user).await?;
        Ok(QuotaOutcome::Spent(user.credits))
    }

    /// Counts one successful lookup. Only called after the OSINT call
    /// completed; refusals and failures never reach this.
    pub async fn record_usage(&self, id: u64) -> BotResult<()> {
        let lock = self.user_lock(id);
        let _guard = lock.lock().await;

        if let Some(mut user) = self.load(id).await? {
            user.usage_count += 1;
            user.last_active = Utc::now();
            self.save(&user).await?;
        }
        Ok(())
    }

    /// Marks the user verified, granting the free-trial premium window if
    /// they do not already hold premium.
    pub async fn mark_verified(&self, id: u64) -> BotResult<Option<UserRecord>> {
        let lock = self.user_lock(id);
        let _guard = lock.lock().await;

        let Some(mut user) = self.load(id).await? else {
            return Ok(None);
        };
        user.verified = true;
        if !user.premium {
            user.premium = true;
            user.premium_expiry = Some(Utc::now() + Duration::hours(self.quota.free_trial_hours));
        }
        self.save(&user).await?;
        Ok(Some(user))
    }

    /// Admin grant: paid premium for the configured number of days plus a
    /// refill to the premium credit constant.
    pub async fn grant_premium(&self, id: u64) -> BotResult<Option<UserRecord>> {
        let lock = self.user_lock(id);
        let _guard = lock.lock().await;

        let Some(mut user) = self.load(id).await? else {
            return Ok(None);
        };
        user.premium = true;
        user.premium_expiry = Some(Utc::now() + Duration::days(self.quota.paid_premium_days));
        user.credits = self.quota.premium_daily_credits;
        self.save(&user).await?;
        Ok(Some(user))
    }

    /// Admin top-up by the free daily credit constant.
    pub async fn add_credits(&self, id: u64) -> BotResult<Option<UserRecord>> {
        let lock = self.user_lock(id);
        let _guard = lock.lock().await;

        let Some(mut user) = self.load(id).await? else {
            return Ok(None);
        };
        user.credits += self.quota.free_daily_credits;
        self.save(&user).await?;
        Ok(Some(user))
    }

    pub async fn all_users(&self) -> BotResult<Vec<UserRecord>> {
        let mut users = Vec::new();
        for key in self.store.keys("user:").await? {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => users.push(user),
                Err(e) => warn!("Skipping malformed user record {key}: {e}"),
            }
        }
        Ok(users)
    }

    pub async fn count(&self) -> BotResult<usize> {
        Ok(self.store.keys("user:").await?.len())
    }

    pub async fn stats(&self) -> BotResult<BotStats> {
        let users = self.all_users().await?;
        Ok(BotStats {
            total_users: users.len() as u64,
            premium_users: users.iter().filter(|u| u.premium).count() as u64,
            verified_users: users.iter().filter(|u| u.verified).count() as u64,
            total_lookups: users.iter().map(|u| u.usage_count).sum(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotStats {
    pub total_users: u64,
    pub premium_users: u64,
    pub verified_users: u64,
    pub total_lookups: u64,
}

impl BotStats {
    /// Integer percentage, 0 for an empty user set.
    pub fn premium_percent(&self) -> u64 {
        if self.total_users == 0 {
            0
        } else {
            self.premium_users * 100 / self.total_users
        }
    }

    pub fn lookups_per_user(&self) -> u64 {
        if self.total_users == 0 {
            0
        } else {
            self.total_lookups / self.total_users
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use teloxide::types::UserId;

    fn quota() -> QuotaConfig {
        QuotaConfig {
            free_daily_credits: 5,
            premium_daily_credits: 100,
            free_trial_hours: 24,
            paid_premium_days: 30,
        }
    }

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()), quota())
    }

    fn tg_user(id: u64) -> teloxide::types::User {
        teloxide::types::User {
            id: UserId(id),
            is_bot: false,
            first_name: "Alice".to_string(),
            last_name: None,
            username: Some("alice".to_string()),
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[tokio::test]
    async fn new_users_get_free_trial_premium() {
        let users = service();
        let user = users.create(&tg_user(1)).await.unwrap();

        assert!(user.premium);
        assert!(user.premium_expiry.unwrap() > Utc::now());
        assert_eq!(user.credits, 5);
        assert!(!user.verified);
    }

    #[tokio::test]
    async fn premium_expiry_is_lazy_on_load() {
        let users = service();
        let mut user = users.create(&tg_user(1)).await.unwrap();
        user.premium_expiry = Some(Utc::now() - Duration::hours(1));
        users.save(&user).await.unwrap();

        let loaded = users.load(1).await.unwrap().unwrap();
        assert!(!loaded.premium);
        assert!(loaded.premium_expiry.is_none());

        // The normalization must have been persisted too.
        let reloaded = users.load(1).await.unwrap().unwrap();
        assert!(!reloaded.premium);
    }

    #[tokio::test]
    async fn credits_reset_on_a_new_day() {
        let users = service();
        let mut user = users.create(&tg_user(1)).await.unwrap();
        user.credits = 0;
        user.credits_reset_on = Utc::now().date_naive() - Duration::days(1);
        users.save(&user).await.unwrap();

        let loaded = users.load(1).await.unwrap().unwrap();
        assert_eq!(loaded.credits, 5);
        assert_eq!(loaded.credits_reset_on, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn free_quota_exhausts_after_configured_limit() {
        let users = service();
        let mut user = users.create(&tg_user(1)).await.unwrap();
        user.premium = false;
        user.premium_expiry = None;
        users.save(&user).await.unwrap();

        for remaining in (0..5).rev() {
            assert_eq!(
                users.spend_credit(1).await.unwrap(),
                QuotaOutcome::Spent(remaining)
            );
        }
        assert_eq!(users.spend_credit(1).await.unwrap(), QuotaOutcome::Exhausted);
    }

    #[tokio::test]
    async fn premium_users_never_spend_credits() {
        let users = service();
        users.create(&tg_user(1)).await.unwrap();

        for _ in 0..20 {
            assert_eq!(users.spend_credit(1).await.unwrap(), QuotaOutcome::Premium);
        }
        assert_eq!(users.load(1).await.unwrap().unwrap().credits, 5);
    }

    #[tokio::test]
    async fn verification_grants_trial_when_not_premium() {
        let users = service();
        let mut user = users.create(&tg_user(1)).await.unwrap();
        user.premium = false;
        user.premium_expiry = None;
        users.save(&user).await.unwrap();

        let verified = users.mark_verified(1).await.unwrap().unwrap();
        assert!(verified.verified);
        assert!(verified.premium);
        assert!(verified.premium_expiry.is_some());
    }

    #[tokio::test]
    async fn grant_premium_refills_credits_and_sets_expiry() {
        let users = service();
        let mut user = users.create(&tg_user(1)).await.unwrap();
        user.premium = false;
        user.premium_expiry = None;
        user.credits = 0;
        users.save(&user).await.unwrap();

        let granted = users.grant_premium(1).await.unwrap().unwrap();
        assert!(granted.premium);
        assert_eq!(granted.credits, 100);
        assert!(granted.premium_expiry.unwrap() > Utc::now() + Duration::days(29));

        assert!(users.grant_premium(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stats_guard_zero_users() {
        let users = service();
        let stats = users.stats().await.unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.premium_percent(), 0);
        assert_eq!(stats.lookups_per_user(), 0);
    }

    #[tokio::test]
    async fn stats_aggregate_over_all_records() {
        let users = service();
        users.create(&tg_user(1)).await.unwrap();
        users.create(&tg_user(2)).await.unwrap();
        users.record_usage(1).await.unwrap();
        users.record_usage(1).await.unwrap();
        users.mark_verified(2).await.unwrap();

        let stats = users.stats().await.unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.premium_users, 2);
        assert_eq!(stats.verified_users, 1);
        assert_eq!(stats.total_lookups, 2);
        assert_eq!(stats.premium_percent(), 100);
    }
}
