use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::models::Profile;
use crate::routes::AppState;
use crate::services::StoreError;

/// Configure the caller's own profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/profile")
            .route(web::get().to(get_own_profile))
            .route(web::put().to(save_own_profile)),
    );
}

async fn get_own_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.load_profile(&user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Onboarding and profile edits
///
/// PUT /api/v1/profile
///
/// The body is a full profile. A first submission registers the caller; later
/// submissions replace the editable fields while verification, premium status
/// and subscription stay as stored. The email always comes from the verified
/// token, a submitted `email` is ignored.
async fn save_own_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<Profile>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let submitted = req.into_inner();

    let mut profile = match state.store.get_profile(&user.id).await {
        Ok(existing) => existing.apply_edit(submitted),
        Err(StoreError::NotFound(_)) => {
            tracing::info!("Registering new member {}", user.id);
            Profile {
                id: user.id.clone(),
                email: None,
                is_verified: false,
                is_premium: false,
                subscription: None,
                ..submitted
            }
        }
        Err(e) => return Err(e.into()),
    };
    if user.email.is_some() {
        profile.email = user.email.clone();
    }

    state.store.save_profile(&profile).await?;
    state.invalidate_profile(&user.id).await;

    tracing::debug!("Saved profile for {}", user.id);
    Ok(HttpResponse::Ok().json(profile))
}
