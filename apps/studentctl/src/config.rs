use std::{fs, path::Path, time::Duration};

use client_core::{toast::DEFAULT_TOAST_TTL, PageSize};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub page_size: PageSize,
    pub toast_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            page_size: PageSize::DEFAULT,
            toast_ttl: DEFAULT_TOAST_TTL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    page_size: Option<usize>,
    toast_ttl_ms: Option<u64>,
}

impl Settings {
    /// Rejected values are logged and leave the current value in place.
    pub fn set_server_url(&mut self, raw: &str) {
        match validate_server_url(raw) {
            Ok(url) => self.server_url = url,
            Err(reason) => warn!(value = raw, %reason, "ignoring server url"),
        }
    }

    pub fn set_page_size(&mut self, raw: &str) {
        match raw.parse::<PageSize>() {
            Ok(size) => self.page_size = size,
            Err(err) => warn!(value = raw, error = %err, "ignoring page size"),
        }
    }

    pub fn set_toast_ttl_ms(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => self.toast_ttl = Duration::from_millis(ms),
            _ => warn!(value = raw, "ignoring toast ttl"),
        }
    }
}

/// Accepts absolute http(s) URLs and strips any trailing slash.
pub fn validate_server_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).map_err(|err| err.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme {other:?}")),
    }
}

/// Layers `raw` (the contents of `studentctl.toml`, if any) and then the
/// environment over the defaults.
pub fn load_settings_from<E>(raw: Option<&str>, env: E) -> Settings
where
    E: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Some(raw) = raw {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.server_url {
                    settings.set_server_url(&v);
                }
                if let Some(v) = file_cfg.page_size {
                    settings.set_page_size(&v.to_string());
                }
                if let Some(v) = file_cfg.toast_ttl_ms {
                    settings.set_toast_ttl_ms(&v.to_string());
                }
            }
            Err(err) => warn!(error = %err, "ignoring malformed config file"),
        }
    }

    if let Some(v) = env("STUDENTCTL_SERVER_URL") {
        settings.set_server_url(&v);
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.set_server_url(&v);
    }
    if let Some(v) = env("APP__PAGE_SIZE") {
        settings.set_page_size(&v);
    }
    if let Some(v) = env("APP__TOAST_TTL_MS") {
        settings.set_toast_ttl_ms(&v);
    }

    settings
}

pub fn load_settings(path: &Path) -> Settings {
    let raw = fs::read_to_string(path).ok();
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
