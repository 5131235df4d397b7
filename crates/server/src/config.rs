//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_RATING_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STORE_RATING_HOST` - Bind address (default: 127.0.0.1)
//! - `STORE_RATING_PORT` - Listen port (default: 5000)
//! - `TOKEN_TTL_DAYS` - Session token lifetime in days (default: 7)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: any origin)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance sample rate, 0.0-1.0 (default: 0.0)
//! - `TRUST_PROXY_HEADERS` - Key the auth rate limiter on `X-Forwarded-For` /
//!   `X-Real-IP` instead of the peer address (default: false). Only enable
//!   behind a proxy that overwrites these headers.
//! - `RATE_LIMIT_AUTH_BURST` - Auth requests allowed back to back per client (default: 5)
//! - `RATE_LIMIT_AUTH_PERIOD_SECS` - Seconds to regain one auth request (default: 6)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
const DEFAULT_AUTH_BURST: u32 = 5;
const DEFAULT_AUTH_PERIOD_SECS: u64 = 6;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session token settings
    pub auth: AuthConfig,
    /// Allowed CORS origins; empty means any origin
    pub cors_allowed_origins: Vec<String>,
    /// Auth endpoint rate limiting
    pub rate_limit: RateLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Session token configuration.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: SecretString,
    /// How long an issued token stays valid
    pub token_ttl: Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Per-client limits on the `/api/auth` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Read the client IP from proxy headers before the peer address
    pub trust_proxy_headers: bool,
    /// Requests a client may make back to back
    pub auth_burst: u32,
    /// Seconds for one spent request to be replenished
    pub auth_period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            trust_proxy_headers: false,
            auth_burst: DEFAULT_AUTH_BURST,
            auth_period_secs: DEFAULT_AUTH_PERIOD_SECS,
        }
    }
}

impl RateLimitConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let trust_proxy_headers = get_optional_env("TRUST_PROXY_HEADERS")
            .map(|raw| parse_bool("TRUST_PROXY_HEADERS", &raw))
            .transpose()?
            .unwrap_or(false);
        let auth_burst = get_optional_env("RATE_LIMIT_AUTH_BURST")
            .map(|raw| parse_positive::<u32>("RATE_LIMIT_AUTH_BURST", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_AUTH_BURST);
        let auth_period_secs = get_optional_env("RATE_LIMIT_AUTH_PERIOD_SECS")
            .map(|raw| parse_positive::<u64>("RATE_LIMIT_AUTH_PERIOD_SECS", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_AUTH_PERIOD_SECS);

        Ok(Self {
            trust_proxy_headers,
            auth_burst,
            auth_period_secs,
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STORE_RATING_DATABASE_URL")?;
        let host = get_env_or_default("STORE_RATING_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_RATING_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STORE_RATING_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_RATING_PORT".to_string(), e.to_string())
            })?;

        let auth = AuthConfig::from_env()?;
        let cors_allowed_origins =
            parse_origins(&get_optional_env("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        Ok(Self {
            database_url,
            host,
            port,
            auth,
            cors_allowed_origins,
            rate_limit: RateLimitConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_validated_secret("JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "JWT_SECRET")?;

        let days = get_optional_env("TOKEN_TTL_DAYS")
            .map(|raw| parse_ttl_days(&raw))
            .transpose()?
            .unwrap_or(DEFAULT_TOKEN_TTL_DAYS);

        Ok(Self {
            jwt_secret,
            token_ttl: Duration::days(days),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a Sentry sample rate in the range 0.0-1.0.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };

    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }

    Ok(rate)
}

/// Parse `TOKEN_TTL_DAYS`, which must be a positive whole number.
fn parse_ttl_days(raw: &str) -> Result<i64, ConfigError> {
    let days = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar("TOKEN_TTL_DAYS".to_string(), e.to_string()))?;

    if !(1..=365).contains(&days) {
        return Err(ConfigError::InvalidEnvVar(
            "TOKEN_TTL_DAYS".to_string(),
            format!("must be between 1 and 365 (got {days})"),
        ));
    }

    Ok(days)
}

/// Parse a boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`).
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false (got {other})"),
        )),
    }
}

/// Parse a whole number that must be at least 1.
fn parse_positive<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + From<u8>,
    T::Err: std::fmt::Display,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if value < T::from(1) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        ));
    }

    Ok(value)
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-key-here", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "JWT_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "JWT_SECRET").is_err());
        assert!(validate_secret_length(&SecretString::from("a".repeat(32)), "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_parse_ttl_days() {
        assert_eq!(parse_ttl_days("7").unwrap(), 7);
        assert_eq!(parse_ttl_days(" 30 ").unwrap(), 30);
        assert!(parse_ttl_days("0").is_err());
        assert!(parse_ttl_days("-3").is_err());
        assert!(parse_ttl_days("week").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert!(parse_origins("").is_empty());
        assert_eq!(
            parse_origins("http://localhost:5173, https://ratings.example.org ,"),
            vec!["http://localhost:5173", "https://ratings.example.org"]
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUST_PROXY_HEADERS", "true").unwrap());
        assert!(parse_bool("TRUST_PROXY_HEADERS", " YES ").unwrap());
        assert!(!parse_bool("TRUST_PROXY_HEADERS", "0").unwrap());
        assert!(parse_bool("TRUST_PROXY_HEADERS", "maybe").is_err());
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive::<u32>("RATE_LIMIT_AUTH_BURST", "1000").unwrap(), 1000);
        assert_eq!(parse_positive::<u64>("RATE_LIMIT_AUTH_PERIOD_SECS", " 6 ").unwrap(), 6);
        assert!(parse_positive::<u32>("RATE_LIMIT_AUTH_BURST", "0").is_err());
        assert!(parse_positive::<u32>("RATE_LIMIT_AUTH_BURST", "-1").is_err());
        assert!(parse_positive::<u32>("RATE_LIMIT_AUTH_BURST", "many").is_err());
    }

    #[test]
    fn test_rate_limit_defaults_ignore_proxy_headers() {
        let defaults = RateLimitConfig::default();
        assert!(!defaults.trust_proxy_headers);
        assert_eq!(defaults.auth_burst, 5);
        assert_eq!(defaults.auth_period_secs, 6);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            auth: AuthConfig {
                jwt_secret: SecretString::from("x".repeat(32)),
                token_ttl: Duration::days(7),
            },
            cors_allowed_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let config = AuthConfig {
            jwt_secret: SecretString::from("super_secret_signing_key_value_123"),
            token_ttl: Duration::days(7),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key_value_123"));
    }
}
