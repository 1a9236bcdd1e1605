use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Adresa dataloggeru, např. `http://192.168.4.1`
    pub base_url: String,
    /// Hlavička, ve které se posílá admin heslo
    pub auth_header: String,
    pub status_poll_secs: u64,
    pub request_timeout_secs: u64,
    /// Po načtení týdne obnovit i poslední měření
    pub refresh_latest_after_load: bool,
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.4.1".to_string(),
            auth_header: "X-Auth".to_string(),
            status_poll_secs: 30,
            request_timeout_secs: 10,
            refresh_latest_after_load: true,
            download_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration { Duration::from_secs(self.status_poll_secs.max(1)) }

    /// 0 znamená bez vlastního timeoutu (výchozí chování reqwest).
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

pub fn load_config() -> Config { load_config_from(Path::new(CONFIG_FILE)) }

pub fn load_config_from(path: &Path) -> Config {
    info!("Načítám konfiguraci z '{}'.", path.display());
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<Config>(&content).unwrap_or_else(|e| {
            warn!("Konfigurace '{}' je neplatná ({}), používám výchozí hodnoty.", path.display(), e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

pub fn save_config(config: &Config) { save_config_to(Path::new(CONFIG_FILE), config) }

pub fn save_config_to(path: &Path, config: &Config) {
    match serde_json::to_string_pretty(config) {
        Ok(content) => {
            if let Err(e) = fs::write(path, content) { warn!("Nepodařilo se uložit konfiguraci: {}", e); }
        }
        Err(e) => warn!("Nepodařilo se serializovat konfiguraci: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.auth_header, "X-Auth");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "base_url": "http://logger.local", "status_poll_secs": 5 }"#).unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.base_url, "http://logger.local");
        assert_eq!(config.status_poll_secs, 5);
        assert!(config.refresh_latest_after_load);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = Config { auth_header: "Authorization".into(), request_timeout_secs: 0, ..Config::default() };
        save_config_to(&path, &config);
        let loaded = load_config_from(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), None);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config_from(&path), Config::default());
    }
}
