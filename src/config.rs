use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;
use thiserror::Error;

/// Fixed divisor used to turn a monthly salary into a per-day rate.
pub const DEFAULT_PAYROLL_DAYS_DIVISOR: u32 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    /// Offset that anchors the business day and the configured shift times.
    pub business_offset: FixedOffset,

    pub payroll_days_divisor: u32,
    pub payroll_clamp_absences: bool,

    pub settings_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            business_offset: match env::var("BUSINESS_UTC_OFFSET") {
                Ok(raw) => parse_utc_offset(&raw).ok_or(ConfigError::Invalid {
                    name: "BUSINESS_UTC_OFFSET",
                    value: raw,
                })?,
                Err(_) => Utc.fix(),
            },

            payroll_days_divisor: match parsed("PAYROLL_DAYS_DIVISOR", DEFAULT_PAYROLL_DAYS_DIVISOR)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        name: "PAYROLL_DAYS_DIVISOR",
                        value: "0".to_string(),
                    });
                }
                n => n,
            },
            payroll_clamp_absences: parsed("PAYROLL_CLAMP_ABSENCES", false)?,

            settings_cache_ttl_secs: parsed("SETTINGS_CACHE_TTL_SECS", 60)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Parses `+HH:MM`, `-HH:MM` or `Z` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Some(Utc.fix());
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
