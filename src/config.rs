use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ssdp::messages::MAX_NOTIFY_INTERVAL;

const DEFAULT_PORT: u16 = 8200;
const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::from_secs(30);

fn default_name() -> String {
    let host = hostname::get()
        .ok()
        .and_then(|os| os.into_string().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or_default();
    if host.is_empty() {
        "dlnad".to_string()
    } else {
        format!("dlnad@{}", host)
    }
}

/// Settings read from the TOML file. Unknown keys are ignored.
#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub name: Option<String>,
    pub interfaces: Option<Vec<String>>,
    /// Seconds.
    pub notify_interval: Option<u64>,
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub name: String,
    /// Empty means every usable interface.
    pub interfaces: Vec<String>,
    pub notify_interval: Duration,
}

impl Config {
    /// CLI over file over defaults. A zero notify interval falls back to the
    /// default; anything above a day is capped.
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Self {
        let file = file.unwrap_or_default();
        let interfaces = if args.interfaces.is_empty() {
            file.interfaces.unwrap_or_default()
        } else {
            args.interfaces.clone()
        };
        let notify_interval = args
            .notify_interval
            .or(file.notify_interval)
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs).min(MAX_NOTIFY_INTERVAL))
            .unwrap_or(DEFAULT_NOTIFY_INTERVAL);
        Config {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            name: args.name.clone().or(file.name).unwrap_or_else(default_name),
            interfaces,
            notify_interval,
        }
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("dlnad.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let xdg_config = config_dir.join("dlnad").join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
