use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::FilterCriteria;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub paystack: PaystackSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// Emails allowed to use the moderation endpoints
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

/// Which `ProfileStore` backs the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

fn default_cache_enabled() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct PaystackSettings {
    #[serde(default = "default_paystack_url")]
    pub base_url: String,
    pub secret_key: String,
    #[serde(default = "default_paystack_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_subscription_amount")]
    pub subscription_amount_usd: f64,
    #[serde(default = "default_subscription_period")]
    pub subscription_period: String,
}

fn default_paystack_url() -> String { "https://api.paystack.co".to_string() }
fn default_paystack_timeout() -> u64 { 10 }
fn default_subscription_amount() -> f64 { 7.0 }
fn default_subscription_period() -> String { "Custom".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_min_age")]
    pub default_min_age: u8,
    #[serde(default = "default_max_age")]
    pub default_max_age: u8,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_min_age: default_min_age(),
            default_max_age: default_max_age(),
        }
    }
}

impl RegistrySettings {
    /// Filter criteria applied when a discovery request leaves fields unset
    pub fn default_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_age: self.default_min_age,
            max_age: self.default_max_age,
            ..FilterCriteria::default()
        }
    }
}

fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 100 }
fn default_min_age() -> u8 { 25 }
fn default_max_age() -> u8 { 35 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with KNOT__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path, with the same environment overrides as `load`
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Reject settings the service must not start with
    ///
    /// Both secrets key an HMAC: left empty or at the sample value, anyone can
    /// mint session tokens or forge payment webhooks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt_secret = self.auth.jwt_secret.trim();
        if jwt_secret.is_empty() || jwt_secret == SAMPLE_JWT_SECRET {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be set (SUPABASE_JWT_SECRET)".to_string(),
            ));
        }
        if self.paystack.secret_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "paystack.secret_key must be set (PAYSTACK_SECRET_KEY)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Placeholder shipped in `.env.example`
const SAMPLE_JWT_SECRET: &str = "change-me";

// e.g., KNOT__SERVER__PORT -> server.port
fn environment() -> Environment {
    Environment::with_prefix("KNOT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("auth.admin_emails")
}

/// Apply the conventional unprefixed variables used by the hosting platform
///
/// `DATABASE_URL`, `PAYSTACK_SECRET_KEY`, `SUPABASE_JWT_SECRET` and `REDIS_URL`
/// win over whatever the files and `KNOT__*` variables set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("DATABASE_URL", "database.url"),
        ("PAYSTACK_SECRET_KEY", "paystack.secret_key"),
        ("SUPABASE_JWT_SECRET", "auth.jwt_secret"),
        ("REDIS_URL", "cache.redis_url"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_registry_settings() {
        let registry = RegistrySettings::default();
        assert_eq!(registry.default_limit, 20);
        assert_eq!(registry.max_limit, 100);

        let criteria = registry.default_criteria();
        assert_eq!(criteria.min_age, 25);
        assert_eq!(criteria.max_age, 35);
        assert!(criteria.location.is_empty());
        assert!(!criteria.verified_only);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    fn write_settings_file() -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("knot-settings-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 9090

[auth]
jwt_secret = "test-secret"
admin_emails = ["admin@knot.app"]

[storage]
backend = "memory"

[database]
url = "postgres://localhost/knot"

[cache]
enabled = false
redis_url = "redis://localhost:6379"

[paystack]
secret_key = "sk_test"
"#
        )
        .unwrap();
        path
    }

    #[test]
    fn test_load_from_file() {
        let path = write_settings_file();
        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.auth.admin_emails, vec!["admin@knot.app"]);
        assert!(!settings.cache.enabled);
        assert_eq!(settings.paystack.base_url, "https://api.paystack.co");
        assert_eq!(settings.paystack.subscription_amount_usd, 7.0);
        assert_eq!(settings.registry.default_max_age, 35);
    }

    #[test]
    fn test_load_from_applies_platform_overrides() {
        std::env::set_var("DATABASE_URL", "postgres://override/knot");
        let path = write_settings_file();
        let settings = Settings::load_from(&path);
        std::fs::remove_file(&path).ok();
        std::env::remove_var("DATABASE_URL");

        assert_eq!(settings.unwrap().database.url, "postgres://override/knot");
    }

    #[test]
    fn test_validate_rejects_public_secrets() {
        let path = write_settings_file();
        let mut settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();
        settings.auth.jwt_secret = "test-secret".to_string();
        settings.paystack.secret_key = "sk_test".to_string();
        assert!(settings.validate().is_ok());

        settings.paystack.secret_key = String::new();
        assert!(settings.validate().is_err());

        settings.paystack.secret_key = "sk_test".to_string();
        for secret in ["", "  ", "change-me"] {
            settings.auth.jwt_secret = secret.to_string();
            assert!(settings.validate().is_err(), "accepted {:?}", secret);
        }
    }
}
