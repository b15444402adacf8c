//! Runtime configuration (§6, ambient stack).
//!
//! Loaded from environment variables, optionally via a `.env` file in
//! development (see `speechbench-cli`, which calls `dotenvy::dotenv()`
//! before constructing `Settings`). Library code never reads the
//! environment directly outside of this module.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Credentials for one HTTP-reachable vendor, read from a
/// `SPEECHBENCH_VENDOR_<NAME>_API_KEY` / `_BASE_URL` pair (§6).
#[derive(Debug, Clone)]
pub struct VendorCredentials {
    pub vendor_id: String,
    pub api_key: String,
    pub base_url: String,
}

/// Process-wide configuration for the engine and its adapters.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database file path, e.g. `./speechbench.db`.
    pub database_path: String,
    /// Root directory under which artifact bytes are written.
    pub storage_dir: String,
    /// Maximum in-flight vendor calls per run (§5).
    pub max_concurrency: usize,
    /// Per-synthesize-call timeout (default 60s per §5).
    pub call_timeout: Duration,
    /// Maximum bounded retries for a retryable vendor error.
    pub max_retries: u32,
    /// Bind port for the Axum HTTP server.
    pub port: u16,
    /// Lookback window, in days, for aggregation queries (§4.7).
    pub lookback_days: i64,
    /// Vendor used to render the stimulus audio in isolated-STT runs.
    pub default_synth_vendor: Option<String>,
    /// Vendor used to score the produced audio in isolated-TTS runs.
    pub default_evaluator_vendor: Option<String>,
    /// Credentials for each `SPEECHBENCH_VENDOR_<NAME>_*` pair found in the
    /// environment, keyed by lowercased vendor id.
    pub vendor_credentials: HashMap<String, VendorCredentials>,
}

impl Settings {
    /// Load settings from environment variables, applying documented
    /// defaults for anything optional.
    pub fn from_env() -> Result<Self, SettingsError> {
        let database_path =
            env::var("SPEECHBENCH_DATABASE_PATH").unwrap_or_else(|_| "./speechbench.db".to_string());

        let storage_dir =
            env::var("SPEECHBENCH_STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string());

        let max_concurrency = parse_optional("SPEECHBENCH_CONCURRENCY_W", 4)?;
        let max_retries = parse_optional("SPEECHBENCH_MAX_RETRIES", 2)?;
        let call_timeout_secs: u64 = parse_optional("SPEECHBENCH_CALL_TIMEOUT_SECS", 60)?;
        let port = parse_optional("SPEECHBENCH_PORT", 8080)?;
        let lookback_days = parse_optional("SPEECHBENCH_LOOKBACK_DAYS", 7)?;

        let default_synth_vendor = env::var("SPEECHBENCH_DEFAULT_SYNTH_VENDOR").ok();
        let default_evaluator_vendor = env::var("SPEECHBENCH_DEFAULT_EVALUATOR_VENDOR").ok();

        let vendor_credentials = vendor_credentials_from_env();

        Ok(Self {
            database_path,
            storage_dir,
            max_concurrency,
            call_timeout: Duration::from_secs(call_timeout_secs),
            max_retries,
            port,
            lookback_days,
            default_synth_vendor,
            default_evaluator_vendor,
            vendor_credentials,
        })
    }
}

/// Scan the environment for `SPEECHBENCH_VENDOR_<NAME>_API_KEY` /
/// `SPEECHBENCH_VENDOR_<NAME>_BASE_URL` pairs and group them by vendor id.
fn vendor_credentials_from_env() -> HashMap<String, VendorCredentials> {
    let mut api_keys = HashMap::new();
    let mut base_urls = HashMap::new();

    for (key, value) in env::vars() {
        if let Some(name) = key.strip_prefix("SPEECHBENCH_VENDOR_").and_then(|s| s.strip_suffix("_API_KEY")) {
            api_keys.insert(name.to_lowercase(), value);
        } else if let Some(name) = key.strip_prefix("SPEECHBENCH_VENDOR_").and_then(|s| s.strip_suffix("_BASE_URL")) {
            base_urls.insert(name.to_lowercase(), value);
        }
    }

    api_keys
        .into_iter()
        .filter_map(|(vendor_id, api_key)| {
            let base_url = base_urls.get(&vendor_id)?.clone();
            Some((
                vendor_id.clone(),
                VendorCredentials {
                    vendor_id,
                    api_key,
                    base_url,
                },
            ))
        })
        .collect()
}

fn parse_optional<T>(key: &str, default: T) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(value) => value.parse::<T>().map_err(|_| SettingsError::Invalid {
            key: key.to_string(),
            value,
        }),
    }
}
