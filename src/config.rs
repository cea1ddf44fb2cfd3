use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const API_URL_ENV: &str = "COMPLIANCEOS_API_URL";
pub const CHAT_ENDPOINT_PATH: &str = "/api/chat";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ClientFileConfig {
    backend: BackendSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct BackendSection {
    base_url: String,
    request_timeout_secs: u64,
}

impl Default for ClientFileConfig {
    fn default() -> Self {
        Self {
            backend: BackendSection::default(),
        }
    }
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Resolved backend location. The direct-origin and reverse-proxy
/// deployments differ only in `base_url`; both serve the chat operation at
/// the same path.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    base_url: String,
    request_timeout: Duration,
}

impl BackendConfig {
    /// Resolution order: launch flag, then `COMPLIANCEOS_API_URL`, then the
    /// config file, then the built-in default.
    pub fn resolve(api_url_flag: Option<&str>) -> io::Result<Self> {
        let file = load_config()?;
        let flag = api_url_flag
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);
        let env_url = env::var(API_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let base_url = flag
            .or(env_url)
            .unwrap_or(file.backend.base_url)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(file.backend.request_timeout_secs.max(1)),
        })
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHAT_ENDPOINT_PATH)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn load_config() -> io::Result<ClientFileConfig> {
    let home = home_dir()?;
    let config_dir = home.join(".complianceos");
    fs::create_dir_all(&config_dir)?;
    let config_file = config_dir.join("config.toml");

    if !config_file.exists() {
        let default = format!(
            "[backend]\nbase_url = \"{DEFAULT_BASE_URL}\"\nrequest_timeout_secs = {DEFAULT_REQUEST_TIMEOUT_SECS}\n"
        );
        fs::write(&config_file, default)?;
    }

    let text = fs::read_to_string(config_file)?;
    let parsed = toml::from_str::<ClientFileConfig>(&text)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    Ok(parsed)
}

fn home_dir() -> io::Result<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))
}
