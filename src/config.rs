use std::path::Path;
use std::time::Duration;

use anyhow::anyhow;
use serde::Deserialize;

use crate::error::{LibError, Result};

pub const ENV_API_HOST: &str = "HEADCOUNT_API_HOST";
pub const ENV_PAGE_SIZE: &str = "HEADCOUNT_PAGE_SIZE";
pub const ENV_ROSTER_PAGE_SIZE: &str = "HEADCOUNT_ROSTER_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "HEADCOUNT_TIMEOUT_SECS";
pub const ENV_SKIP_NGROK_WARNING: &str = "HEADCOUNT_SKIP_NGROK_WARNING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without the `/api` suffix.
    pub api_host: String,
    /// Default page size for entity lists.
    pub page_size: u32,
    /// How many headcounts to fetch when a project is selected.
    pub roster_page_size: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Send `ngrok-skip-browser-warning` with every request.
    pub skip_ngrok_warning: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_host: "http://127.0.0.1:5000".to_string(),
            page_size: 10,
            roster_page_size: 100,
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
            skip_ngrok_warning: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    api_host: String,
    page_size: Option<u32>,
    roster_page_size: Option<u32>,
    timeout_secs: Option<u64>,
    skip_ngrok_warning: Option<bool>,
}

impl ApiConfig {
    pub fn new(api_host: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_host: normalize_host(api_host.into())?,
            ..Self::default()
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` uses the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_host = lookup(ENV_API_HOST).ok_or_else(|| {
            LibError::invalid(
                "API host is not configured",
                anyhow!("{} is required", ENV_API_HOST),
            )
        })?;
        let mut config = Self::new(api_host)?;

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = parse_number(ENV_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ROSTER_PAGE_SIZE) {
            config.roster_page_size = parse_number(ENV_ROSTER_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout = Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_SKIP_NGROK_WARNING) {
            config.skip_ngrok_warning = flag(&raw);
        }

        Ok(config)
    }

    /// Reads a console-style `config.json` (`{"apiHost": "..."}`).
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(raw).map_err(|err| {
            LibError::invalid("Config file is not valid", anyhow!("config json: {}", err))
        })?;

        let mut config = Self::new(file.api_host)?;
        if let Some(page_size) = file.page_size {
            config.page_size = page_size;
        }
        if let Some(roster_page_size) = file.roster_page_size {
            config.roster_page_size = roster_page_size;
        }
        if let Some(timeout_secs) = file.timeout_secs {
            config.request_timeout = Duration::from_secs(timeout_secs);
        }
        if let Some(skip) = file.skip_ngrok_warning {
            config.skip_ngrok_warning = skip;
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            LibError::invalid(
                "Config file could not be read",
                anyhow!("failed to read {}: {}", path.display(), err),
            )
        })?;
        Self::from_json_str(&raw)
    }

    /// Full URL of `/api/{path}`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.api_host, path.trim_start_matches('/'))
    }
}

fn normalize_host(raw: String) -> Result<String> {
    let host = raw.trim().trim_end_matches('/').to_string();
    if host.is_empty() {
        return Err(LibError::invalid(
            "API host is not configured",
            anyhow!("empty api host"),
        ));
    }
    if !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(LibError::invalid(
            "API host must be an http(s) URL",
            anyhow!("api host '{}' has no http scheme", host),
        ));
    }
    Ok(host)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        LibError::invalid(
            "Numeric setting is not valid",
            anyhow!("invalid {} '{}'", key, raw),
        )
    })
}

fn flag(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes"
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn lookup_requires_api_host() {
        let err = ApiConfig::from_lookup(lookup(&[])).expect_err("host is required");
        assert_eq!(err.public, "API host is not configured");
    }

    #[test]
    fn lookup_reads_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            (ENV_API_HOST, "https://hc.example.com/"),
            (ENV_PAGE_SIZE, "25"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_SKIP_NGROK_WARNING, "no"),
        ]))
        .expect("config should load");

        assert_eq!(config.api_host, "https://hc.example.com");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.roster_page_size, 100);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.skip_ngrok_warning);
        assert_eq!(
            config.endpoint("HeadCount"),
            "https://hc.example.com/api/HeadCount"
        );
    }

    #[test]
    fn lookup_rejects_bad_numbers() {
        let err = ApiConfig::from_lookup(lookup(&[
            (ENV_API_HOST, "http://localhost:5000"),
            (ENV_PAGE_SIZE, "ten"),
        ]))
        .expect_err("page size must be numeric");
        assert_eq!(err.public, "Numeric setting is not valid");
    }

    #[test]
    fn json_config_matches_console_shape() {
        let config = ApiConfig::from_json_str(r#"{"apiHost": "https://abc.ngrok-free.app"}"#)
            .expect("config should parse");
        assert_eq!(config.api_host, "https://abc.ngrok-free.app");
        assert!(config.skip_ngrok_warning);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn host_without_scheme_is_rejected() {
        let err = ApiConfig::new("localhost:5000").expect_err("scheme required");
        assert_eq!(err.public, "API host must be an http(s) URL");
    }
}
