// SPDX-License-Identifier: Apache-2.0

use dealflow_store::SqliteStoreConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BIND: &str = "DEALFLOW_BIND";
pub const ENV_DATABASE_PATH: &str = "DEALFLOW_DATABASE_PATH";
pub const ENV_LOG_JSON: &str = "DEALFLOW_LOG_JSON";
pub const ENV_MAX_BODY_BYTES: &str = "DEALFLOW_MAX_BODY_BYTES";
pub const ENV_SQLITE_BUSY_TIMEOUT_MS: &str = "DEALFLOW_SQLITE_BUSY_TIMEOUT_MS";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_json: bool,
    pub api: ApiConfig,
    pub store: SqliteStoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_json: true,
            api: ApiConfig::default(),
            store: SqliteStoreConfig::default(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Reads `DEALFLOW_*` variables; unset or unparsable values fall back to
    /// the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var(ENV_BIND).unwrap_or(defaults.bind_addr),
            log_json: env_bool(ENV_LOG_JSON, defaults.log_json),
            api: ApiConfig {
                max_body_bytes: env_usize(ENV_MAX_BODY_BYTES, defaults.api.max_body_bytes),
            },
            store: SqliteStoreConfig {
                path: env::var(ENV_DATABASE_PATH)
                    .map(PathBuf::from)
                    .unwrap_or(defaults.store.path),
                busy_timeout: Duration::from_millis(env_u64(
                    ENV_SQLITE_BUSY_TIMEOUT_MS,
                    defaults.store.busy_timeout.as_millis() as u64,
                )),
            },
        }
    }
}

pub fn validate_startup_config(cfg: &ServerConfig) -> Result<(), String> {
    if cfg.api.max_body_bytes == 0 {
        return Err("max body bytes must be > 0".to_string());
    }
    if cfg.store.path.as_os_str().is_empty() {
        return Err(format!("{ENV_DATABASE_PATH} must not be empty"));
    }
    cfg.bind_addr
        .parse::<std::net::SocketAddr>()
        .map_err(|e| format!("invalid bind addr {}: {e}", cfg.bind_addr))?;
    Ok(())
}
