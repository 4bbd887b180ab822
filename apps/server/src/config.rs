use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use stockview_core::batch::DEFAULT_MAX_CONCURRENCY;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_PATH: &str = "./db/stockview.db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_FETCH_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Symbols fetched at once within one batch.
    pub max_concurrency: usize,
    /// Per-fetch deadline; `None` when `SV_FETCH_TIMEOUT_MS` is 0.
    pub fetch_timeout: Option<Duration>,
    pub fetch_max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: DEFAULT_DB_PATH.to_string(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: Some(Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS)),
            fetch_max_retries: DEFAULT_FETCH_MAX_RETRIES,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read the `SV_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Unparseable numbers fall back to their defaults with a warning; an
    /// unparseable listen address is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr: SocketAddr = lookup("SV_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid SV_LISTEN_ADDR")?;
        let db_path = lookup("SV_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());
        let cors_allow = lookup("SV_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = parse_or(&lookup, "SV_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS);
        let max_concurrency = parse_or(&lookup, "SV_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY);
        let fetch_timeout_ms = parse_or(&lookup, "SV_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS);
        let fetch_max_retries =
            parse_or(&lookup, "SV_FETCH_MAX_RETRIES", DEFAULT_FETCH_MAX_RETRIES);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            max_concurrency: max_concurrency.max(1),
            fetch_timeout: (fetch_timeout_ms > 0).then(|| Duration::from_millis(fetch_timeout_ms)),
            fetch_max_retries,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
