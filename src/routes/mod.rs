// Route exports
pub mod admin;
pub mod messaging;
pub mod payments;
pub mod profile;
pub mod registry;

use actix_web::web;
use chrono::Utc;
use std::sync::Arc;

use crate::core::Ranker;
use crate::error::ApiError;
use crate::models::{FilterCriteria, Profile, Subscription};
use crate::services::{CacheKey, CacheManager, PaystackClient, ProfileStore};

/// Premium plan recorded on activation
#[derive(Debug, Clone)]
pub struct SubscriptionPlan {
    pub amount_usd: f64,
    pub period: String,
}

impl SubscriptionPlan {
    pub fn activate_now(&self) -> Subscription {
        Subscription {
            date: Utc::now(),
            amount_usd: self.amount_usd,
            period: self.period.clone(),
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    /// `None` when Redis is unavailable
    pub cache: Option<Arc<CacheManager>>,
    pub paystack: Arc<PaystackClient>,
    pub ranker: Ranker,
    pub default_criteria: FilterCriteria,
    pub plan: SubscriptionPlan,
}

impl AppState {
    /// Fetch a profile, going through the snapshot cache when it is enabled
    pub async fn load_profile(&self, id: &str) -> Result<Profile, ApiError> {
        let key = CacheKey::profile(id);

        let Some(cache) = &self.cache else {
            return Ok(self.store.get_profile(id).await?);
        };
        if let Ok(profile) = cache.get::<Profile>(&key).await {
            return Ok(profile);
        }

        let token = cache.fill_token();
        let profile = self.store.get_profile(id).await?;
        if let Err(e) = cache.fill(&key, &profile, token).await {
            tracing::warn!("Failed to cache profile {}: {}", id, e);
        }

        Ok(profile)
    }

    /// Drop the cached snapshot after any write touching `id`
    pub async fn invalidate_profile(&self, id: &str) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate(&CacheKey::profile(id)).await {
                tracing::warn!("Failed to invalidate cached profile {}: {}", id, e);
            }
        }
    }

    /// Callers without a premium subscription get `premium_required`
    pub async fn require_premium(&self, id: &str) -> Result<Profile, ApiError> {
        let profile = self.load_profile(id).await?;
        if !profile.is_premium {
            tracing::debug!("Premium action refused for {}", id);
            return Err(ApiError::PremiumRequired);
        }
        Ok(profile)
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(registry::configure)
            .configure(profile::configure)
            .configure(messaging::configure)
            .configure(admin::configure)
            .configure(payments::configure),
    );
}
