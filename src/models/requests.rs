use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{AdminTab, FilterCriteria};

/// Discovery query string
///
/// Fields are spelled out rather than flattened from [`FilterCriteria`] because
/// url-encoded flattening cannot parse numbers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    #[serde(default)]
    pub min_age: Option<u8>,
    #[serde(default)]
    pub max_age: Option<u8>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub verified_only: Option<bool>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<usize>,
}

impl DiscoverQuery {
    /// Criteria with unspecified fields taken from `defaults`
    pub fn criteria(&self, defaults: &FilterCriteria) -> FilterCriteria {
        FilterCriteria {
            min_age: self.min_age.unwrap_or(defaults.min_age),
            max_age: self.max_age.unwrap_or(defaults.max_age),
            location: self.location.clone().unwrap_or_else(|| defaults.location.clone()),
            verified_only: self.verified_only.unwrap_or(defaults.verified_only),
        }
    }
}

/// Free-text registry search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Request for a compatibility breakdown against one candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "candidate_id")]
    pub candidate_id: String,
}

/// Like another member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "target_id")]
    pub target_id: String,
}

/// Send a direct message
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

/// Admin member listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberListQuery {
    #[serde(default)]
    pub tab: AdminTab,
    #[serde(default)]
    pub q: String,
}

/// Local currency lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyQuery {
    #[serde(default)]
    pub country: Option<String>,
}

/// Verify a completed gateway transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, max = 100))]
    pub reference: String,
}
