use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://demo.onlineorder.crossdevlogix.com/api";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let business_id = require("SHOPDESK_BUSINESS_ID")?
        .trim()
        .parse::<i64>()
        .map_err(|e| invalid("SHOPDESK_BUSINESS_ID", e.to_string()))?;
    if business_id <= 0 {
        return Err(invalid(
            "SHOPDESK_BUSINESS_ID",
            format!("must be positive, got {business_id}"),
        ));
    }

    let env = parse_environment(&or_default("SHOPDESK_ENV", "development"))?;

    let api_base_url = or_default("SHOPDESK_API_BASE_URL", DEFAULT_API_BASE_URL);
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "SHOPDESK_API_BASE_URL",
            format!("expected an http(s) URL, got '{api_base_url}'"),
        ));
    }

    let api_token = lookup("SHOPDESK_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    // Only development may talk to the API anonymously.
    if api_token.is_none() && env != Environment::Development {
        return Err(ConfigError::MissingEnvVar("SHOPDESK_API_TOKEN".to_string()));
    }
    let log_level = or_default("SHOPDESK_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("SHOPDESK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHOPDESK_USER_AGENT", "shopdesk/0.1 (catalog-admin)");
    let max_retries = parse_u32("SHOPDESK_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("SHOPDESK_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        api_base_url,
        api_token,
        business_id,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPDESK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
