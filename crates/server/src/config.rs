use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "configs/server.toml";

const ENV_CONFIG_PATH: &str = "APP_CONFIG_PATH";
const ENV_HOST: [&str; 2] = ["APP_SERVER_HOST", "APP__HOST"];
const ENV_PORT: [&str; 2] = ["APP_SERVER_PORT", "APP__PORT"];
const ENV_GREEN_API_BASE_URL: [&str; 2] = ["GREEN_API_BASE_URL", "APP__GREEN_API_BASE_URL"];
const ENV_WEB_ROOT: [&str; 2] = ["APP_WEB_ROOT", "APP__WEB_ROOT"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub green_api_base_url: String,
    pub web_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            green_api_base_url: "https://api.green-api.com".into(),
            web_root: PathBuf::from("web"),
        }
    }
}

impl Settings {
    pub fn listen_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    host: Option<String>,
    port: Option<i64>,
    green_api_base_url: Option<String>,
    web_root: Option<PathBuf>,
}

/// Values before validation; the port may still be out of range.
struct RawSettings {
    host: String,
    port: i64,
    green_api_base_url: String,
    web_root: PathBuf,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_with(|key| std::env::var(key).ok())
}

/// Defaults, then the TOML file, then environment overrides.
pub fn load_settings_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Settings> {
    let path = env_value(&env, &[ENV_CONFIG_PATH])
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let defaults = Settings::default();
    let file = read_settings_file(&path)?;
    let mut raw = RawSettings {
        host: file.host.unwrap_or(defaults.host),
        port: file.port.unwrap_or(i64::from(defaults.port)),
        green_api_base_url: file
            .green_api_base_url
            .unwrap_or(defaults.green_api_base_url),
        web_root: file.web_root.unwrap_or(defaults.web_root),
    };

    if let Some(host) = env_value(&env, &ENV_HOST) {
        raw.host = host;
    }
    if let Some(port) = env_value(&env, &ENV_PORT) {
        raw.port = port.parse().unwrap_or(-1);
    }
    if let Some(base_url) = env_value(&env, &ENV_GREEN_API_BASE_URL) {
        raw.green_api_base_url = base_url;
    }
    if let Some(web_root) = env_value(&env, &ENV_WEB_ROOT) {
        raw.web_root = PathBuf::from(web_root);
    }

    validate(raw)
}

/// Last non-empty value among `keys`, trimmed.
fn env_value(env: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env(key))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .last()
}

fn read_settings_file(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(FileSettings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read config '{}'", path.display()));
        }
    };

    toml::from_str(&raw).with_context(|| format!("decode config '{}'", path.display()))
}

fn validate(raw: RawSettings) -> anyhow::Result<Settings> {
    let host = raw.host.trim().to_string();
    if host.is_empty() {
        bail!("config: host is required");
    }

    let port = match u16::try_from(raw.port) {
        Ok(port) if port > 0 => port,
        _ => bail!("config: port must be in range 1..65535"),
    };

    let green_api_base_url = greenapi::normalize_base_url(&raw.green_api_base_url)
        .context("config: invalid green_api_base_url")?;

    Ok(Settings {
        host,
        port,
        green_api_base_url,
        web_root: raw.web_root,
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
