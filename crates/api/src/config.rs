//! # API Configuration Module
//!
//! Loads the server settings from environment variables, with defaults where
//! a sensible one exists.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: host address to bind to (default: "0.0.0.0")
//! - `API_PORT`: port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed CORS origins
//! - `JWT_SECRET`: HMAC secret used to sign session tokens (required)
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `SESSION_TTL_HOURS`: session token lifetime (default: 168)
//! - `SALON_TIMEZONE`: IANA zone that defines the salon's "today" (default: "UTC")
//! - `SALON_CLOSED_WEEKDAY`: closing day, 0 = Sunday .. 6 = Saturday, or "none" (default: 0)
//! - `PUBLIC_BASE_URL`: base of password-reset links (default: "http://localhost:3000")
//! - `RESET_TOKEN_TTL_MINUTES`: password-reset token lifetime (default: 60)
//! - `EXPOSE_RESET_TOKEN`: return the reset link in the API response (default: false)

use chrono::Weekday;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use salon_core::availability::{SalonCalendar, weekday_from_index};
use std::{env, ops::RangeInclusive};
use tracing::Level;

/// One hour up to one year.
const SESSION_TTL_HOURS_RANGE: RangeInclusive<i64> = 1..=8_760;
/// One minute up to one week.
const RESET_TOKEN_TTL_MINUTES_RANGE: RangeInclusive<i64> = 1..=10_080;

/// Configuration for the salon API server.
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use salon_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}", config.server_addr());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origins: Option<Vec<String>>,
    pub jwt_secret: String,
    /// Request timeout in seconds
    pub request_timeout: u64,
    pub session_ttl_hours: i64,
    pub timezone: Tz,
    pub closed_weekday: Option<Weekday>,
    pub public_base_url: String,
    pub reset_token_ttl_minutes: i64,
    /// Development switch; in production the link only goes to the log.
    pub expose_reset_token: bool,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or `JWT_SECRET` is missing, or when a
    /// numeric, time zone or weekday value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        // Security settings
        let jwt_secret =
            env::var("JWT_SECRET").wrap_err("JWT_SECRET environment variable must be set")?;
        let session_ttl_hours = parse_bounded(
            "SESSION_TTL_HOURS",
            &env::var("SESSION_TTL_HOURS").unwrap_or_else(|_| "168".to_string()),
            SESSION_TTL_HOURS_RANGE,
        )?;

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Salon calendar
        let timezone = env::var("SALON_TIMEZONE")
            .unwrap_or_else(|_| "UTC".to_string())
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid SALON_TIMEZONE value: {e}"))?;
        let closed_weekday =
            parse_closed_weekday(&env::var("SALON_CLOSED_WEEKDAY").unwrap_or_else(|_| "0".into()))?;

        // Password reset
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();
        let reset_token_ttl_minutes = parse_bounded(
            "RESET_TOKEN_TTL_MINUTES",
            &env::var("RESET_TOKEN_TTL_MINUTES").unwrap_or_else(|_| "60".to_string()),
            RESET_TOKEN_TTL_MINUTES_RANGE,
        )?;
        let expose_reset_token = env::var("EXPOSE_RESET_TOKEN")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            jwt_secret,
            request_timeout,
            session_ttl_hours,
            timezone,
            closed_weekday,
            public_base_url,
            reset_token_ttl_minutes,
            expose_reset_token,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn calendar(&self) -> SalonCalendar {
        SalonCalendar {
            timezone: self.timezone,
            closed_weekday: self.closed_weekday,
        }
    }
}

impl Default for ApiConfig {
    /// Local development values; `jwt_secret` must be replaced outside tests.
    fn default() -> Self {
        let calendar = SalonCalendar::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: String::new(),
            log_level: Level::INFO,
            cors_origins: None,
            jwt_secret: "development-secret".to_string(),
            request_timeout: 30,
            session_ttl_hours: 168,
            timezone: calendar.timezone,
            closed_weekday: calendar.closed_weekday,
            public_base_url: "http://localhost:3000".to_string(),
            reset_token_ttl_minutes: 60,
            expose_reset_token: false,
        }
    }
}

fn parse_bounded(name: &str, raw: &str, range: RangeInclusive<i64>) -> Result<i64> {
    let value: i64 = raw
        .trim()
        .parse()
        .wrap_err_with(|| format!("Invalid {name} value"))?;
    if !range.contains(&value) {
        return Err(eyre!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        ));
    }
    Ok(value)
}

fn parse_closed_weekday(raw: &str) -> Result<Option<Weekday>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") || raw.is_empty() {
        return Ok(None);
    }
    let index: i16 = raw
        .parse()
        .wrap_err("Invalid SALON_CLOSED_WEEKDAY value")?;
    weekday_from_index(index)
        .map(Some)
        .ok_or_else(|| eyre!("SALON_CLOSED_WEEKDAY must be between 0 and 6, got {index}"))
}
