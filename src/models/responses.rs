use serde::{Deserialize, Serialize};
use crate::models::domain::{Message, Profile, ScoredCandidate};

/// Response for the discovery and search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedProfilesResponse {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Profiles that liked the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikesResponse {
    pub likes: Vec<Profile>,
    pub count: usize,
}

/// A conversation between the caller and one other member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub other_id: String,
    pub messages: Vec<Message>,
}

/// Local pricing for the subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyResponse {
    pub code: String,
    pub symbol: String,
    pub rate: f64,
    pub subscription_price: String,
}

/// Result of a payment verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub status: String,
    pub message: String,
}
