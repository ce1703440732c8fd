//! Configuration module
//!
//! Settings are read from environment variables (a `.env` file is honoured through
//! dotenvy). Numeric settings fall back to their defaults when absent or unparsable.

use std::env;
use std::path::{Path, PathBuf};

// Common constants
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 8080;
const MAX_IMAGE_SIZE_MB: usize = 10;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_IMAGE_DIR: &str = "images";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Diary service configuration
#[derive(Clone, Debug)]
pub struct DiaryConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Root directory for entry images; each entry gets `{image_dir}/{id}/`
    pub image_dir: PathBuf,
    pub max_image_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<DiaryConfig>);

impl Config {
    pub fn new(config: DiaryConfig) -> Self {
        Config(Box::new(config))
    }

    fn as_diary(&self) -> &DiaryConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_diary().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = DiaryConfig::from_env()?;
        Ok(Config::new(config))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_diary().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_diary().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_diary().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_diary().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_diary().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.as_diary().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_diary().database_url
    }

    pub fn image_dir(&self) -> &Path {
        &self.as_diary().image_dir
    }

    pub fn max_image_size_bytes(&self) -> usize {
        self.as_diary().max_image_size_bytes
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl DiaryConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str =
            lookup("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_image_size_mb = lookup("MAX_IMAGE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_IMAGE_SIZE_MB);

        let base = BaseConfig {
            server_port: match lookup("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => DEFAULT_PORT,
            },
            cors_origins,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        Ok(DiaryConfig {
            base,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            image_dir: PathBuf::from(
                lookup("IMAGE_DIR").unwrap_or_else(|| DEFAULT_IMAGE_DIR.to_string()),
            ),
            max_image_size_bytes: max_image_size_mb * 1024 * 1024,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.image_dir.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("IMAGE_DIR must not be empty"));
        }

        if self.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be greater than 0"));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        if self.base.cors_origins.is_empty() {
            return Err(anyhow::anyhow!("CORS_ORIGINS must list at least one origin"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_unset() {
        let config =
            DiaryConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/diary")]))
                .unwrap();
        assert_eq!(config.base.server_port, 8080);
        assert_eq!(config.base.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.base.db_max_connections, 10);
        assert_eq!(config.base.db_timeout_seconds, 30);
        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert_eq!(config.max_image_size_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
        assert!(!Config::new(config).is_production());
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        let err = DiaryConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let result = DiaryConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/diary"),
            ("APP_ENV", "prod"),
            ("CORS_ORIGINS", "*"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = DiaryConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://db/diary"),
            ("PORT", "9000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("IMAGE_DIR", "/var/lib/diary"),
            ("MAX_IMAGE_SIZE_MB", "2"),
            ("ENVIRONMENT", "production"),
        ]))
        .unwrap();
        assert_eq!(config.base.server_port, 9000);
        assert_eq!(config.base.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.max_image_size_bytes, 2 * 1024 * 1024);
        assert!(Config::new(config).is_production());
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let result = DiaryConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/diary"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_non_postgres_url() {
        let config =
            DiaryConfig::from_lookup(lookup_from(&[("DATABASE_URL", "mysql://localhost/diary")]))
                .unwrap();
        assert!(config.validate().is_err());
    }
}
