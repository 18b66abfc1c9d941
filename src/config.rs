use crate::error::ConfigError;
use crate::sync::{DEFAULT_REFETCH_DELAY, DEFAULT_VISIBILITY_THRESHOLD};
use crate::types::Notification;

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_token: Option<String>,
    pub list_limit: usize,
    pub refetch_delay: Duration,
    pub visibility_threshold: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_token: None,
            list_limit: DEFAULT_LIST_LIMIT,
            refetch_delay: DEFAULT_REFETCH_DELAY,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub seed: Option<PathBuf>,
    /// When set, `/api/` requests must present it as the `session` cookie.
    pub session_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            seed: None,
            session_token: None,
        }
    }
}

pub fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let value = raw.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidUrl(value.to_string()))
    }
}

pub fn validate_threshold(threshold: f32) -> Result<f32, ConfigError> {
    if threshold > 0.0 && threshold <= 1.0 {
        Ok(threshold)
    } else {
        Err(ConfigError::InvalidThreshold(threshold))
    }
}

/// Parses `<number>[ms|s|m|h]`; a bare number is seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let value = raw.trim();
    let invalid = || ConfigError::InvalidDuration(value.to_string());
    if value.is_empty() {
        return Err(invalid());
    }

    let split = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(ConfigError::ZeroDuration);
    }

    match unit.to_ascii_lowercase().as_str() {
        "ms" => Ok(Duration::from_millis(amount)),
        "" | "s" => Ok(Duration::from_secs(amount)),
        "m" => amount
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(invalid),
        "h" => amount
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    notification: Vec<Notification>,
}

/// Parses a TOML seed file made of `[[notification]]` tables.
pub fn parse_seed(contents: &str, path: &Path) -> Result<Vec<Notification>, ConfigError> {
    let seed: SeedFile = toml::from_str(contents).map_err(|source| ConfigError::SeedParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(seed.notification)
}

pub fn load_seed(path: &Path) -> Result<Vec<Notification>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&contents, path)
}
