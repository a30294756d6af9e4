use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{PaymentResponse, VerifyPaymentRequest};
use crate::routes::AppState;
use crate::services::WebhookEvent;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Configure subscription payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/payments/verify", web::post().to(verify_payment))
        .route("/payments/webhook", web::post().to(webhook));
}

/// Confirm a checkout and activate premium for the caller
///
/// POST /api/v1/payments/verify
///
/// Request body:
/// ```json
/// { "reference": "string" }
/// ```
///
/// The charge must have been paid with the caller's email, and each reference
/// activates premium once.
async fn verify_payment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let verification = state.paystack.verify_transaction(&req.reference).await?;
    if !verification.is_successful() {
        tracing::info!(
            "Transaction {} for {} not successful: {}",
            req.reference,
            user.id,
            verification.message
        );
        return Err(ApiError::PaymentFailed(verification.message));
    }

    let owned = user
        .email
        .as_deref()
        .is_some_and(|email| verification.is_paid_by(email));
    if !owned {
        tracing::warn!("{} tried to redeem transaction {} paid by someone else", user.id, req.reference);
        return Err(ApiError::Forbidden(
            "Transaction was not paid from this account".to_string(),
        ));
    }

    if !state.store.claim_payment_reference(&req.reference, &user.id).await? {
        tracing::warn!("{} tried to reuse transaction {}", user.id, req.reference);
        return Err(ApiError::Conflict(
            "Transaction has already been redeemed".to_string(),
        ));
    }

    state
        .store
        .activate_subscription(&user.id, state.plan.activate_now())
        .await?;
    state.invalidate_profile(&user.id).await;

    tracing::info!("Premium activated for {} via {}", user.id, req.reference);
    Ok(HttpResponse::Ok().json(PaymentResponse {
        status: "success".to_string(),
        message: "Premium activated".to_string(),
    }))
}

/// Gateway callback
///
/// POST /api/v1/payments/webhook
///
/// The body is verified against the HMAC-SHA512 signature header before it is
/// parsed. A `charge.success` event activates premium for the paying email,
/// once per reference; redeliveries are acknowledged without effect.
async fn webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing webhook signature".to_string()))?;

    if !state.paystack.verify_webhook_signature(&body, signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(ApiError::Unauthorized("Invalid webhook signature".to_string()));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidJson(format!("Invalid webhook payload: {}", e)))?;

    let Some(email) = event.successful_charge_email() else {
        tracing::debug!("Ignoring webhook event {}", event.event);
        return Ok(acknowledged());
    };
    let reference = event.data.reference.as_str();
    if reference.is_empty() {
        tracing::warn!("Ignoring {} webhook without a reference", event.event);
        return Ok(acknowledged());
    }

    let Some(profile) = state.store.find_by_email(email).await? else {
        tracing::warn!("Webhook {} paid by unknown email {}", reference, email);
        return Ok(acknowledged());
    };

    if !state.store.claim_payment_reference(reference, &profile.id).await? {
        tracing::debug!("Webhook {} already redeemed", reference);
        return Ok(acknowledged());
    }

    state
        .store
        .activate_subscription(&profile.id, state.plan.activate_now())
        .await?;
    state.invalidate_profile(&profile.id).await;

    tracing::info!("Webhook {} activated premium for {}", reference, profile.id);
    Ok(acknowledged())
}

fn acknowledged() -> HttpResponse {
    HttpResponse::Ok().json(PaymentResponse {
        status: "ok".to_string(),
        message: "Event processed".to_string(),
    })
}
