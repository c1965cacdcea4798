//! Configuration loader — merges env vars, .env file, and config.toml.

use common::{AppConfig, Error};
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &AppConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.geocode_url.trim().is_empty() {
        issues.push("geocode_url must not be empty".into());
    }
    if config.nws_url.trim().is_empty() {
        issues.push("nws_url must not be empty".into());
    }
    if config.cache_ttl_secs == 0 {
        issues.push("cache_ttl_secs must be > 0".into());
    }
    if config.timeout_secs == 0 {
        issues.push("timeout_secs must be > 0".into());
    }
    if config.user_agent.trim().is_empty() {
        issues.push("user_agent must not be empty".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load configuration from environment and optional config file.
pub fn load_config() -> Result<AppConfig, Error> {
    // 1. Load .env file if one is around.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = AppConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {e}")))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {e}")))?;
    }

    // 4. Override with environment variables (highest priority).
    if let Ok(url) = std::env::var("ZIPCAST_GEOCODE_URL") {
        config.geocode_url = url;
    }
    if let Ok(url) = std::env::var("ZIPCAST_NWS_URL") {
        config.nws_url = url;
    }
    if let Ok(raw) = std::env::var("ZIPCAST_CACHE_TTL_SECS") {
        config.cache_ttl_secs = parse_positive_u64(&raw, "ZIPCAST_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("ZIPCAST_TIMEOUT_SECS") {
        config.timeout_secs = parse_positive_u64(&raw, "ZIPCAST_TIMEOUT_SECS")?;
    }
    if let Ok(ua) = std::env::var("ZIPCAST_USER_AGENT") {
        config.user_agent = ua;
    }

    validate_config(&config)?;

    Ok(config)
}
