use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::{ConversationResponse, LikeRequest, LikesResponse, Message, SendMessageRequest};
use crate::routes::AppState;

/// Configure likes and direct messaging routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/likes")
            .route(web::post().to(like))
            .route(web::get().to(likes_received)),
    )
    .service(
        web::resource("/messages/{other_id}")
            .route(web::get().to(get_conversation))
            .route(web::post().to(send_message)),
    );
}

/// Like another member
///
/// POST /api/v1/likes
///
/// Liking is free and idempotent; `created` is false for a repeat like.
async fn like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<LikeRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    if req.target_id == user.id {
        return Err(ApiError::Validation("Members cannot like themselves".to_string()));
    }

    // Both ends must be registered
    state.load_profile(&user.id).await?;
    state.load_profile(&req.target_id).await?;

    let created = state.store.add_like(&user.id, &req.target_id).await?;
    tracing::debug!("Like {} -> {} (new: {})", user.id, req.target_id, created);

    Ok(HttpResponse::Ok().json(json!({
        "targetId": req.target_id,
        "created": created,
    })))
}

/// Members who liked the caller (premium)
async fn likes_received(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state.require_premium(&user.id).await?;

    let likes = state.store.likes_received(&user.id).await?;
    Ok(HttpResponse::Ok().json(LikesResponse {
        count: likes.len(),
        likes,
    }))
}

/// Conversation with another member (premium)
async fn get_conversation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.require_premium(&user.id).await?;
    let other_id = path.into_inner();

    let messages = state.store.conversation(&user.id, &other_id).await?;
    Ok(HttpResponse::Ok().json(ConversationResponse { other_id, messages }))
}

/// Send a direct message (premium)
///
/// POST /api/v1/messages/{otherId}
///
/// Request body:
/// ```json
/// { "text": "string" }
/// ```
async fn send_message(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    state.require_premium(&user.id).await?;

    let other_id = path.into_inner();
    if other_id == user.id {
        return Err(ApiError::Validation("Members cannot message themselves".to_string()));
    }
    state.load_profile(&other_id).await?;

    let message = Message::new(user.id, other_id, req.into_inner().text);
    state.store.send_message(&message).await?;

    tracing::debug!("Message {} sent to {}", message.id, message.recipient_id);
    Ok(HttpResponse::Created().json(message))
}
