use std::{fmt, fs, path::Path, str::FromStr, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::AmountKind;
use tracing::warn;

use crate::notify::DEFAULT_FLASH_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Http,
    Local,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "remote" => Ok(Backend::Http),
            "local" => Ok(Backend::Local),
            other => Err(format!("unknown backend '{other}'")),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Http => "http",
            Backend::Local => "local",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub backend: Backend,
    pub api_url: String,
    pub local_database_url: String,
    pub amount_kind: AmountKind,
    pub flash_ttl_ms: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Http,
            api_url: "http://127.0.0.1:5000/produtos".into(),
            local_database_url: "sqlite://./data/local_inventory.db".into(),
            amount_kind: AmountKind::Quantity,
            flash_ttl_ms: DEFAULT_FLASH_TTL.as_millis() as u64,
            request_timeout_secs: None,
        }
    }
}

impl ClientSettings {
    pub fn flash_ttl(&self) -> Duration {
        Duration::from_millis(self.flash_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend: Option<Backend>,
    api_url: Option<String>,
    #[serde(alias = "database_url")]
    local_database_url: Option<String>,
    amount_kind: Option<AmountKind>,
    flash_ttl_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `path` (or `./inventory.toml` if present), then `INVENTORY_*` env.
pub fn load_client_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            let file_cfg = toml::from_str::<FileSettings>(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            merge_file(&mut settings, file_cfg);
        }
        None => {
            if let Ok(raw) = fs::read_to_string("inventory.toml") {
                apply_file(&mut settings, &raw);
            }
        }
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file(settings: &mut ClientSettings, raw: &str) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(%error, "ignoring unreadable inventory.toml");
            return;
        }
    };
    merge_file(settings, file_cfg);
}

fn merge_file(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.backend {
        settings.backend = v;
    }
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.local_database_url {
        settings.local_database_url = v;
    }
    if let Some(v) = file_cfg.amount_kind {
        settings.amount_kind = v;
    }
    if let Some(v) = file_cfg.flash_ttl_ms {
        settings.flash_ttl_ms = v;
    }
    if file_cfg.request_timeout_secs.is_some() {
        settings.request_timeout_secs = file_cfg.request_timeout_secs;
    }
}

fn apply_env(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("INVENTORY_BACKEND") {
        match v.parse() {
            Ok(backend) => settings.backend = backend,
            Err(error) => warn!(%error, "ignoring INVENTORY_BACKEND"),
        }
    }
    if let Some(v) = lookup("INVENTORY_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("INVENTORY_DATABASE_URL") {
        settings.local_database_url = v;
    }
    if let Some(v) = lookup("INVENTORY_AMOUNT_KIND") {
        match v.parse() {
            Ok(kind) => settings.amount_kind = kind,
            Err(error) => warn!(%error, "ignoring INVENTORY_AMOUNT_KIND"),
        }
    }
    if let Some(v) = lookup("INVENTORY_FLASH_TTL_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.flash_ttl_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric INVENTORY_FLASH_TTL_MS"),
        }
    }
}
