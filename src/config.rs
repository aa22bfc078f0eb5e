//! Runtime configuration
//!
//! The source deployments of this dashboard drifted apart on hardcoded
//! backend ports (5002, 5003, ...). Everything that varied per deployment is
//! an environment variable here.

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use url::Url;

/// Default extraction backend address
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5002";

/// Default bind address for the dashboard UI API
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8090;

/// Ownership JSON filename as published by the scraper
const OWNERSHIP_DATA_FILE: &str = "foreign_ownership_data.json";

/// Where the ownership JSON asset lives.
///
/// Some deployments publish it on the frontend's static path, others drop it
/// next to the data directory. An `http(s)` value selects the remote variant.
#[derive(Debug, Clone)]
pub enum OwnershipLocation {
    File(PathBuf),
    Remote(Url),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Extraction backend base URL
    pub backend_url: Url,

    /// Dashboard API bind host
    pub host: String,

    /// Dashboard API bind port
    pub port: u16,

    /// Local data directory (extraction store lives here)
    pub data_dir: PathBuf,

    /// Ownership JSON asset location
    pub ownership_data: OwnershipLocation,
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let backend_url = env_or("OWNERSHIP_DESK_BACKEND_URL", DEFAULT_BACKEND_URL);
        let backend_url = Url::parse(&backend_url)
            .map_err(|e| AppError::Config(format!("Invalid backend URL '{}': {}", backend_url, e)))?;

        let host = env_or("OWNERSHIP_DESK_HOST", DEFAULT_HOST);
        let port = match env::var("OWNERSHIP_DESK_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid port '{}': {}", raw, e)))?,
            Err(_) => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(env_or("OWNERSHIP_DESK_DATA_DIR", "data"));

        let ownership_data = match env::var("OWNERSHIP_DESK_OWNERSHIP_DATA") {
            Ok(raw) if raw.starts_with("http://") || raw.starts_with("https://") => {
                let url = Url::parse(&raw).map_err(|e| {
                    AppError::Config(format!("Invalid ownership data URL '{}': {}", raw, e))
                })?;
                OwnershipLocation::Remote(url)
            }
            Ok(raw) => OwnershipLocation::File(PathBuf::from(raw)),
            Err(_) => OwnershipLocation::File(data_dir.join(OWNERSHIP_DATA_FILE)),
        };

        Ok(Self {
            backend_url,
            host,
            port,
            data_dir,
            ownership_data,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
