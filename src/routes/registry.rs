use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::core::{compatibility, format_local_price, get_currency_for_country};
use crate::error::ApiError;
use crate::models::{
    CompatibilityRequest, CurrencyQuery, CurrencyResponse, DiscoverQuery, HealthResponse,
    RankedProfilesResponse, ScoredCandidate, SearchQuery,
};
use crate::routes::AppState;

/// Configure discovery and scoring routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/registry/matches", web::get().to(discover))
        .route("/registry/search", web::get().to(search))
        .route("/compatibility", web::post().to(score_candidate))
        .route("/profiles/{id}", web::get().to(get_candidate))
        .route("/currency", web::get().to(currency));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Discover matches
///
/// GET /api/v1/registry/matches?minAge=25&maxAge=35&location=lagos&verifiedOnly=true&limit=20
///
/// Unset filters fall back to the configured defaults. Results are sorted by
/// compatibility, ties keep registration order.
async fn discover(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<DiscoverQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let viewer = state.load_profile(&user.id).await?;
    let criteria = query.criteria(&state.default_criteria);
    let limit = state.ranker.page_size(query.limit);

    tracing::info!(
        "Discovering matches for {}: ages {}-{}, location {:?}, verified_only {}, limit {}",
        user.id,
        criteria.min_age,
        criteria.max_age,
        criteria.location,
        criteria.verified_only,
        limit
    );

    let candidates = state.store.list_profiles().await?;
    let result = state.ranker.discover(&viewer, candidates, &criteria, limit);

    tracing::debug!(
        "Returning {} of {} candidates for {}",
        result.matches.len(),
        result.total_candidates,
        user.id
    );

    Ok(HttpResponse::Ok().json(RankedProfilesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    }))
}

/// Free-text registry search
///
/// GET /api/v1/registry/search?q=igbo
async fn search(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let viewer = state.load_profile(&user.id).await?;
    let candidates = state.store.list_profiles().await?;
    let limit = state.ranker.page_size(None);

    let result = state.ranker.search(&viewer, &query.q, candidates, limit);

    Ok(HttpResponse::Ok().json(RankedProfilesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    }))
}

/// Compatibility breakdown against one candidate
///
/// POST /api/v1/compatibility
///
/// Request body:
/// ```json
/// { "candidateId": "string" }
/// ```
async fn score_candidate(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CompatibilityRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let viewer = state.load_profile(&user.id).await?;
    let candidate = state.load_profile(&req.candidate_id).await?;

    Ok(HttpResponse::Ok().json(compatibility(&viewer, &candidate)))
}

/// One candidate with its score against the caller
async fn get_candidate(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let viewer = state.load_profile(&user.id).await?;
    let candidate = state.load_profile(&path.into_inner()).await?;

    let result = compatibility(&viewer, &candidate);

    Ok(HttpResponse::Ok().json(ScoredCandidate {
        profile: candidate,
        compatibility_score: result.score,
        compatibility_insight: result.insight,
    }))
}

/// Local currency and subscription price
///
/// GET /api/v1/currency?country=Nigeria
async fn currency(
    state: web::Data<AppState>,
    query: web::Query<CurrencyQuery>,
) -> impl Responder {
    let country = query.country.as_deref().unwrap_or_default();
    let info = get_currency_for_country(country);

    HttpResponse::Ok().json(CurrencyResponse {
        code: info.code.to_string(),
        symbol: info.symbol.to_string(),
        rate: info.rate,
        subscription_price: format_local_price(state.plan.amount_usd, country),
    })
}

