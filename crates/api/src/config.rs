//! Application configuration loaded from environment variables.

use std::str::FromStr;

use checkout::orchestrator::DEFAULT_CURRENCY;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected pretty or json")),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` bind address (default: `"0.0.0.0"`)
/// - `PORT` listen port (default: `3000`)
/// - `RUST_LOG` tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` `pretty` or `json` (default: `pretty`)
/// - `CHECKOUT_CURRENCY` charge currency (default: `"eur"`)
/// - `DATABASE_URL` PostgreSQL URL; in-memory stores when unset
/// - `STRIPE_SECRET_KEY` Stripe secret key; in-memory payments when unset
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub currency: String,
    pub database_url: Option<SecretString>,
    pub stripe_secret_key: Option<SecretString>,
}

impl Config {
    /// Loads configuration from the environment, reading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_blank("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string())
                })?,
            None => defaults.port,
        };

        let log_format = match non_blank("LOG_FORMAT") {
            Some(format) => format
                .trim()
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("LOG_FORMAT".to_string(), e))?,
            None => defaults.log_format,
        };

        let currency = match non_blank("CHECKOUT_CURRENCY") {
            Some(currency) => {
                let currency = currency.trim().to_ascii_lowercase();
                if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ConfigError::InvalidEnvVar(
                        "CHECKOUT_CURRENCY".to_string(),
                        format!("'{currency}' is not a 3-letter currency code"),
                    ));
                }
                currency
            }
            None => defaults.currency,
        };

        Ok(Self {
            host: non_blank("HOST").unwrap_or(defaults.host),
            port,
            log_level: non_blank("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            currency,
            database_url: non_blank("DATABASE_URL").map(SecretString::from),
            stripe_secret_key: non_blank("STRIPE_SECRET_KEY").map(SecretString::from),
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            currency: DEFAULT_CURRENCY.to_string(),
            database_url: None,
            stripe_secret_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.currency, "eur");
        assert!(config.database_url.is_none());
        assert!(config.stripe_secret_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("CHECKOUT_CURRENCY", "USD"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.currency, "usd");
        assert_eq!(
            config.stripe_secret_key.unwrap().expose_secret(),
            "sk_test_123"
        );
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("PORT", " "), ("DATABASE_URL", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_invalid_currency() {
        assert!(load(&[("CHECKOUT_CURRENCY", "euro")]).is_err());
    }

    #[test]
    fn test_secrets_are_redacted() {
        let config = load(&[("DATABASE_URL", "postgres://user:hunter2@db/app")]).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
