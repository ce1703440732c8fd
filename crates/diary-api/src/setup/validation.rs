//! Configuration validation
//!
//! Checks run at startup, after `Config::validate`, for settings that only matter once the
//! server is about to listen.

use anyhow::Result;
use diary_core::Config;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via the CORS_ORIGINS environment variable."
        ));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.server_port() == 0 {
        return Err(anyhow::anyhow!("Server port cannot be 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diary_core::{BaseConfig, DiaryConfig};

    fn config(environment: &str, cors: &[&str], port: u16) -> Config {
        Config::new(DiaryConfig {
            base: BaseConfig {
                server_port: port,
                cors_origins: cors.iter().map(|s| s.to_string()).collect(),
                db_max_connections: 5,
                db_timeout_seconds: 30,
                environment: environment.to_string(),
            },
            database_url: "postgres://localhost/diary".to_string(),
            image_dir: "images".into(),
            max_image_size_bytes: 1024,
        })
    }

    #[test]
    fn test_accepts_development_defaults() {
        assert!(validate_config(&config("development", &["http://localhost:5173"], 8080)).is_ok());
        assert!(validate_config(&config("development", &["*"], 8080)).is_ok());
    }

    #[test]
    fn test_rejects_wildcard_cors_in_production() {
        assert!(validate_config(&config("production", &["*"], 8080)).is_err());
    }

    #[test]
    fn test_rejects_port_zero() {
        assert!(validate_config(&config("development", &["http://a"], 0)).is_err());
    }
}
