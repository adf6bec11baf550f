use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; parsing is decoupled from the real environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("COOKWISE_ENV", "development"))?;
    let log_level = or_default("COOKWISE_LOG_LEVEL", "info");
    let output_path = PathBuf::from(or_default("COOKWISE_OUTPUT_PATH", "./cookwise_data.json"));
    let snapshot_dir = optional_path("COOKWISE_SNAPSHOT_DIR");
    let sources_path = optional_path("COOKWISE_SOURCES_PATH");

    let request_timeout_secs = parse_u64("COOKWISE_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "COOKWISE_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }

    let user_agent = or_default("COOKWISE_USER_AGENT", DEFAULT_USER_AGENT);
    let accept_language = or_default("COOKWISE_ACCEPT_LANGUAGE", "sv-SE,sv;q=0.9,en;q=0.8");
    let retailer_base_url = parse_base_url(
        "COOKWISE_RETAILER_BASE_URL",
        &or_default("COOKWISE_RETAILER_BASE_URL", "https://www.ica.se"),
    )?;
    let aggregator_base_url = parse_base_url(
        "COOKWISE_AGGREGATOR_BASE_URL",
        &or_default("COOKWISE_AGGREGATOR_BASE_URL", "https://api.matspar.se"),
    )?;

    let city = or_default("COOKWISE_CITY", "karlskrona").trim().to_lowercase();
    if city.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "COOKWISE_CITY".to_string(),
            reason: "city must be non-empty".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        output_path,
        snapshot_dir,
        sources_path,
        request_timeout_secs,
        user_agent,
        accept_language,
        retailer_base_url,
        aggregator_base_url,
        city,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COOKWISE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Require an `http(s)://` origin and strip any trailing slash so callers can
/// append absolute paths.
fn parse_base_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("'{raw}' is not an http(s) URL"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
