use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use knot_registry::auth::JwtVerifier;
use knot_registry::config::{Settings, StorageBackend};
use knot_registry::core::Ranker;
use knot_registry::error::{handle_json_payload_error, handle_query_payload_error};
use knot_registry::routes::{self, AppState, SubscriptionPlan};
use knot_registry::services::{CacheManager, InMemoryStore, PaystackClient, PostgresStore, ProfileStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(settings: Option<&Settings>) {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| settings.map(|s| s.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT")
        .ok()
        .or_else(|| settings.map(|s| s.logging.format.clone()))
        .unwrap_or_else(|| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn ProfileStore>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory registry store, data will not survive restarts");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);

            let store = PostgresStore::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::other(format!("PostgreSQL connection error: {}", e))
            })?;

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Ok(Arc::new(store))
        }
    }
}

async fn build_cache(settings: &Settings) -> Option<Arc<CacheManager>> {
    if !settings.cache.enabled {
        info!("Profile cache disabled by configuration");
        return None;
    }

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(cache) => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running without profile cache", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(None);
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    init_tracing(Some(&settings));
    info!("Starting Knot registry service...");

    if let Err(e) = settings.validate() {
        error!("Refusing to start: {}", e);
        return Err(std::io::Error::other(format!("Configuration error: {}", e)));
    }

    let store = build_store(&settings).await?;
    let cache = build_cache(&settings).await;

    let paystack = PaystackClient::new(
        settings.paystack.base_url.clone(),
        settings.paystack.secret_key.clone(),
        settings.paystack.timeout_secs,
    )
    .map_err(|e| std::io::Error::other(format!("Paystack client error: {}", e)))?;

    let verifier = web::Data::new(JwtVerifier::new(
        &settings.auth.jwt_secret,
        &settings.auth.admin_emails,
    ));

    let app_state = AppState {
        store,
        cache,
        paystack: Arc::new(paystack),
        ranker: Ranker::new(settings.registry.default_limit, settings.registry.max_limit),
        default_criteria: settings.registry.default_criteria(),
        plan: SubscriptionPlan {
            amount_usd: settings.paystack.subscription_amount_usd,
            period: settings.paystack.subscription_period.clone(),
        },
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(verifier.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
