// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `4000` |
//! | `JWT_SECRET` | HS256 secret used to sign session tokens | Random per process |
//! | `TOKEN_TTL_HOURS` | Session token lifetime | `168` (7 days) |
//! | `BCRYPT_COST` | bcrypt work factor | `10` |
//! | `CORS_ORIGIN` | Comma-separated allowed origins, or `*` | `*` |
//! | `DATA_DIR` | Directory holding the database file | `./data` |
//! | `N8N_TIMEOUT_SECS` | Timeout for proxied N8N calls | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_HOURS_ENV: &str = "TOKEN_TTL_HOURS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const CORS_ORIGIN_ENV: &str = "CORS_ORIGIN";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const N8N_TIMEOUT_SECS_ENV: &str = "N8N_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TOKEN_TTL_HOURS: u64 = 24 * 7;
/// Ten years.
const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365 * 10;
const SECS_PER_HOUR: u64 = 3600;
const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_N8N_TIMEOUT_SECS: u64 = 15;

/// Shortest secret accepted from `JWT_SECRET`.
const MIN_JWT_SECRET_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

/// Where the signing secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Environment,
    Generated,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_secret_source: SecretSource,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub cors_origins: CorsOrigins,
    pub data_dir: PathBuf,
    pub n8n_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let (jwt_secret, jwt_secret_source) = match get(JWT_SECRET_ENV) {
            Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                return Err(ConfigError::invalid(
                    JWT_SECRET_ENV,
                    format!("must be at least {MIN_JWT_SECRET_LEN} characters"),
                ));
            }
            Some(secret) => (secret, SecretSource::Environment),
            None => (generate_secret(), SecretSource::Generated),
        };

        let token_ttl_hours = parse_u64(&get, TOKEN_TTL_HOURS_ENV, DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours == 0 || token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::invalid(
                TOKEN_TTL_HOURS_ENV,
                format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
            ));
        }

        let bcrypt_cost = match get(BCRYPT_COST_ENV) {
            Some(raw) => {
                let cost = raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| ConfigError::invalid(BCRYPT_COST_ENV, e.to_string()))?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::invalid(BCRYPT_COST_ENV, "must be between 4 and 31"));
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        let cors_origins = get(CORS_ORIGIN_ENV)
            .map(|raw| CorsOrigins::parse(&raw))
            .unwrap_or(CorsOrigins::Any);

        let data_dir = PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.into()));

        let n8n_timeout_secs = parse_u64(&get, N8N_TIMEOUT_SECS_ENV, DEFAULT_N8N_TIMEOUT_SECS)?;
        if n8n_timeout_secs == 0 {
            return Err(ConfigError::invalid(N8N_TIMEOUT_SECS_ENV, "must be positive"));
        }

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    LOG_FORMAT_ENV,
                    format!("expected `json` or `pretty`, got `{other}`"),
                ))
            }
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            jwt_secret_source,
            token_ttl: Duration::from_secs(token_ttl_hours * SECS_PER_HOUR),
            bcrypt_cost,
            cors_origins,
            data_dir,
            n8n_timeout: Duration::from_secs(n8n_timeout_secs),
            log_format,
        })
    }

    /// Path of the redb database file inside `data_dir`.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("filper.redb")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_u64<G>(get: &G, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::invalid(name, e.to_string())),
        None => Ok(default),
    }
}

/// Tokens signed with a generated secret do not survive a restart.
fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}
