use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{File, FileFormat};
use portfolio_models::email_address::EmailAddressWithName;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Environment variable holding a colon separated list of config files.
pub const CONFIG_PATHS_ENV: &str = "PORTFOLIO_CONFIG";

/// Load the config files listed in `PORTFOLIO_CONFIG`, falling back to the
/// default config file if the variable is not set.
pub fn load() -> anyhow::Result<Config> {
    let paths = match std::env::var(CONFIG_PATHS_ENV) {
        Ok(paths) => std::env::split_paths(&paths).collect::<Vec<_>>(),
        Err(std::env::VarError::NotPresent) => vec![PathBuf::from(DEFAULT_CONFIG_PATH)],
        Err(err) => return Err(err).context(format!("Failed to read {CONFIG_PATHS_ENV}")),
    };

    load_paths(&paths)
}

/// Load and merge the given config files. Later files override earlier ones.
pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub rate_limit: RateLimitConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub address: SocketAddr,
    pub real_ip: Option<HttpRealIpConfig>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HttpRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from: EmailAddressWithName,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub email: EmailAddressWithName,
    pub dispatch_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u64,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid duration: {s:?}")))
    }
}

/// Parse a duration like `"1d 2h 30m 10s"`. Each part is a number followed by
/// exactly one unit.
fn parse_duration(s: &str) -> Option<std::time::Duration> {
    s.split_whitespace()
        .try_fold(std::time::Duration::ZERO, |out, part| {
            let unit = part.chars().last()?;
            let value = &part[..part.len() - unit.len_utf8()];
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let factor = match unit {
                's' => 1,
                'm' => 60,
                'h' => 60 * 60,
                'd' => 24 * 60 * 60,
                _ => return None,
            };
            let seconds = value.parse::<u64>().ok()?.checked_mul(factor)?;
            out.checked_add(std::time::Duration::from_secs(seconds))
        })
}
