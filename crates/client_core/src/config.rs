use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_BASE_ADDRESS: &str = "http://localhost:5000/api/";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const SETTINGS_FILE: &str = "directory.toml";

/// Where the record store lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_address: Url,
    pub timeout_ms: u64,
}

impl ClientSettings {
    pub fn new(base_address: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        Ok(Self {
            base_address: parse_base_address(base_address)?,
            timeout_ms,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_address: Url::parse(DEFAULT_BASE_ADDRESS)
                .unwrap_or_else(|_| unreachable!("default base address is a valid url")),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_address: Option<String>,
    timeout_ms: Option<u64>,
}

/// Defaults, then `directory.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", file.display()))?;
        if let Some(v) = file_cfg.base_address {
            settings.base_address = parse_base_address(&v)?;
        }
        if let Some(v) = file_cfg.timeout_ms {
            settings.timeout_ms = v;
        }
    }

    if let Some(v) = env("DIRECTORY_BASE_ADDRESS") {
        settings.base_address = parse_base_address(&v)?;
    }
    if let Some(v) = env("APP__BASE_ADDRESS") {
        settings.base_address = parse_base_address(&v)?;
    }

    if let Some(v) = env("APP__TIMEOUT_MS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.timeout_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring unparseable APP__TIMEOUT_MS"),
        }
    }

    Ok(settings)
}

/// Parses a base address and makes sure it ends with `/`, so relative request
/// paths such as `users` land under it instead of replacing its last segment.
pub fn parse_base_address(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&normalized)
        .with_context(|| format!("invalid record store base address '{raw}'"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("record store base address '{raw}' cannot be used as a base url");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
