use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use client_core::{pricing::DEFAULT_CURRENCY_SYMBOL, HttpCartApiConfig};
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE_NAME: &str = "cart_view.toml";
const APP_DIR_NAME: &str = "cart_view";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Url,
    pub storefront_url: Url,
    pub auth_token: Option<String>,
    pub currency_symbol: String,
    pub toast_duration: Duration,
    pub request_timeout: Option<Duration>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: Url::parse("http://127.0.0.1:3000/api").expect("static url"),
            storefront_url: Url::parse("http://127.0.0.1:3000").expect("static url"),
            auth_token: None,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            toast_duration: Duration::from_secs(5),
            request_timeout: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn http_config(&self) -> HttpCartApiConfig {
        HttpCartApiConfig {
            base_url: self.api_url.clone(),
            auth_token: self.auth_token.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Values given on the command line. They win over the file and the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<Url>,
    pub storefront_url: Option<Url>,
    pub log_filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    storefront_url: Option<String>,
    auth_token: Option<String>,
    currency_symbol: Option<String>,
    toast_seconds: Option<u64>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then the TOML file, then `CART_VIEW__*` variables, then `overrides`.
pub fn load_settings(config_path: Option<&Path>, overrides: &Overrides) -> Result<Settings> {
    let mut settings = Settings::default();

    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_paths().into_iter().find(|path| path.is_file()),
    };
    if let Some(path) = path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok())?;
    apply_overrides(&mut settings, overrides);
    Ok(settings)
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    }
    paths
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.api_url {
        settings.api_url = parse_url("api_url", &v)?;
    }
    if let Some(v) = file.storefront_url {
        settings.storefront_url = parse_url("storefront_url", &v)?;
    }
    if let Some(v) = file.auth_token {
        settings.auth_token = non_blank(v);
    }
    if let Some(v) = file.currency_symbol {
        settings.currency_symbol = v;
    }
    if let Some(v) = file.toast_seconds {
        settings.toast_duration = toast_duration(v)?;
    }
    if let Some(v) = file.request_timeout_secs {
        settings.request_timeout = request_timeout(v);
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(v) = var("CART_VIEW__API_URL") {
        settings.api_url = parse_url("CART_VIEW__API_URL", &v)?;
    }
    if let Some(v) = var("CART_VIEW__STOREFRONT_URL") {
        settings.storefront_url = parse_url("CART_VIEW__STOREFRONT_URL", &v)?;
    }
    if let Some(v) = var("CART_VIEW__AUTH_TOKEN") {
        settings.auth_token = non_blank(v);
    }
    if let Some(v) = var("CART_VIEW__CURRENCY_SYMBOL") {
        settings.currency_symbol = v;
    }
    if let Some(v) = var("CART_VIEW__TOAST_SECONDS") {
        let seconds = v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("CART_VIEW__TOAST_SECONDS must be a whole number, got '{v}'"))?;
        settings.toast_duration = toast_duration(seconds)?;
    }
    if let Some(v) = var("CART_VIEW__REQUEST_TIMEOUT_SECS") {
        let seconds = v.trim().parse::<u64>().with_context(|| {
            format!("CART_VIEW__REQUEST_TIMEOUT_SECS must be a whole number, got '{v}'")
        })?;
        settings.request_timeout = request_timeout(seconds);
    }
    if let Some(v) = var("CART_VIEW__LOG_FILTER") {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, overrides: &Overrides) {
    if let Some(v) = &overrides.api_url {
        settings.api_url = v.clone();
    }
    if let Some(v) = &overrides.storefront_url {
        settings.storefront_url = v.clone();
    }
    if let Some(v) = &overrides.log_filter {
        settings.log_filter = v.clone();
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).with_context(|| format!("{name} is not a valid absolute url: '{raw}'"))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn toast_duration(seconds: u64) -> Result<Duration> {
    if seconds == 0 {
        bail!("toast duration must be at least one second");
    }
    Ok(Duration::from_secs(seconds))
}

/// Zero disables the timeout.
fn request_timeout(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
