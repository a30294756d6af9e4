use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::time::Duration;
use thiserror::Error;

type HmacSha512 = Hmac<Sha512>;

/// Errors that can occur when talking to the Paystack API
#[derive(Debug, Error)]
pub enum PaystackError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid secret key")]
    Unauthorized,

    #[error("No secret key configured")]
    NotConfigured,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Envelope returned by `GET /transaction/verify/{reference}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionVerification {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<TransactionData>,
}

impl TransactionVerification {
    /// The API call succeeded and the charge itself went through
    pub fn is_successful(&self) -> bool {
        self.status && self.data.as_ref().is_some_and(|d| d.status == "success")
    }

    /// True when the paying customer's email is `email` (case-insensitive)
    pub fn is_paid_by(&self, email: &str) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d.customer.as_ref())
            .and_then(|c| c.email.as_deref())
            .is_some_and(|paid_by| paid_by.eq_ignore_ascii_case(email))
    }
}

/// Transaction details shared by verification responses and webhook events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    /// Absent on some non-charge events
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reference: String,
    /// Amount in the currency's subunit (kobo, pesewas, cents)
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub email: Option<String>,
}

/// Webhook callback body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: TransactionData,
}

impl WebhookEvent {
    pub const CHARGE_SUCCESS: &'static str = "charge.success";

    /// Customer email of a successful charge, if this event is one
    pub fn successful_charge_email(&self) -> Option<&str> {
        if self.event != Self::CHARGE_SUCCESS {
            return None;
        }
        self.data.customer.as_ref()?.email.as_deref()
    }
}

/// Paystack API client
///
/// Handles transaction verification and webhook signature checks.
pub struct PaystackClient {
    base_url: String,
    secret_key: String,
    client: Client,
}

impl PaystackClient {
    /// Create a new Paystack client
    pub fn new(base_url: String, secret_key: String, timeout_secs: u64) -> Result<Self, PaystackError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            secret_key,
            client,
        })
    }

    /// False when no secret key was supplied; every call then fails closed
    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty()
    }

    /// Verify a transaction by its reference
    pub async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<TransactionVerification, PaystackError> {
        if !self.is_configured() {
            return Err(PaystackError::NotConfigured);
        }

        let url = format!(
            "{}/transaction/verify/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(reference)
        );

        tracing::debug!("Verifying Paystack transaction: {}", reference);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(PaystackError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Paystack verification for {} failed: {} - {}", reference, status, body);
            return Err(PaystackError::ApiError(format!(
                "Failed to verify transaction: {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PaystackError::InvalidResponse(format!("Failed to parse verification: {}", e)))
    }

    /// Check the `x-paystack-signature` header against the raw request body
    ///
    /// Always false without a secret key, an empty HMAC key is public.
    pub fn verify_webhook_signature(&self, body: &[u8], signature: &str) -> bool {
        if !self.is_configured() {
            tracing::error!("Webhook rejected, no Paystack secret key configured");
            return false;
        }
        verify_signature(&self.secret_key, body, signature)
    }
}

/// HMAC-SHA512 of `body` keyed with `secret`, hex encoded
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of a hex signature with the expected HMAC-SHA512
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
