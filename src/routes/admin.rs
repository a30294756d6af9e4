use actix_web::{web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::auth::AdminUser;
use crate::core::{filter_members, registry_stats};
use crate::error::ApiError;
use crate::models::{MemberListQuery, Profile};
use crate::routes::AppState;

/// Configure moderation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/members", web::get().to(list_members))
            .route("/members/import", web::post().to(import_members))
            .route("/members/{id}", web::delete().to(delete_member))
            .route("/members/{id}/verify", web::post().to(verify_member))
            .route("/members/{id}/revoke", web::post().to(revoke_member))
            .route("/stats", web::get().to(stats)),
    );
}

/// GET /api/v1/admin/members?tab=pending&q=lagos
async fn list_members(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<MemberListQuery>,
) -> Result<HttpResponse, ApiError> {
    let members = state.store.list_profiles().await?;
    Ok(HttpResponse::Ok().json(filter_members(&members, query.tab, &query.q)))
}

async fn stats(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse, ApiError> {
    let members = state.store.list_profiles().await?;
    Ok(HttpResponse::Ok().json(registry_stats(&members)))
}

async fn verify_member(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    set_verified(&state, &admin, &path.into_inner(), true).await
}

async fn revoke_member(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    set_verified(&state, &admin, &path.into_inner(), false).await
}

async fn set_verified(
    state: &AppState,
    admin: &AdminUser,
    id: &str,
    verified: bool,
) -> Result<HttpResponse, ApiError> {
    let updated = state.store.set_verified(id, verified).await?;
    state.invalidate_profile(id).await;

    tracing::info!("Admin {} set verified={} on {}", admin.0.id, verified, id);
    Ok(HttpResponse::Ok().json(updated))
}

async fn delete_member(
    state: web::Data<AppState>,
    admin: AdminUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.store.delete_profile(&id).await? {
        return Err(ApiError::NotFound(format!("Profile not found: {}", id)));
    }
    state.invalidate_profile(&id).await;

    tracing::info!("Admin {} purged member {}", admin.0.id, id);
    Ok(HttpResponse::NoContent().finish())
}

/// Bulk seed the registry
///
/// POST /api/v1/admin/members/import
///
/// Body is an array of profiles. Ids already registered are skipped, so
/// re-running an import is harmless.
async fn import_members(
    state: web::Data<AppState>,
    admin: AdminUser,
    req: web::Json<Vec<Profile>>,
) -> Result<HttpResponse, ApiError> {
    let profiles = req.into_inner();

    for profile in &profiles {
        if profile.id.trim().is_empty() {
            return Err(ApiError::Validation("Imported profiles need an id".to_string()));
        }
        profile.validate()?;
    }

    let added = state.store.merge_profiles(&profiles).await?;

    tracing::info!(
        "Admin {} imported {} of {} submitted profiles",
        admin.0.id,
        added,
        profiles.len()
    );
    Ok(HttpResponse::Ok().json(json!({
        "submitted": profiles.len(),
        "added": added,
    })))
}
