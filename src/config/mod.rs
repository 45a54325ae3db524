use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::errors::ConfigError;
use crate::notify::{EmailJsCredentials, EmailJsNotifier, DEFAULT_ENDPOINT};

const DEFAULT_DIR_NAME: &str = ".prequal";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_HOME: &str = "PREQUAL_HOME";
pub const ENV_SERVICE_ID: &str = "EMAILJS_SERVICE_ID";
pub const ENV_TEMPLATE_ID: &str = "EMAILJS_TEMPLATE_ID";
pub const ENV_PUBLIC_KEY: &str = "EMAILJS_PUBLIC_KEY";
pub const ENV_ACCESS_TOKEN: &str = "EMAILJS_ACCESS_TOKEN";
pub const ENV_ENDPOINT: &str = "EMAILJS_ENDPOINT";
pub const ENV_TIMEOUT: &str = "PREQUAL_SUBMIT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub emailjs: EmailJsCredentials,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub endpoint: String,
    pub submit_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emailjs: EmailJsCredentials::default(),
            access_token: None,
            endpoint: DEFAULT_ENDPOINT.into(),
            submit_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs.max(1))
    }

    /// Overlays values found through `lookup` (normally the process
    /// environment). Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_SERVICE_ID) {
            self.emailjs.service_id = value;
        }
        if let Some(value) = get(ENV_TEMPLATE_ID) {
            self.emailjs.template_id = value;
        }
        if let Some(value) = get(ENV_PUBLIC_KEY) {
            self.emailjs.public_key = value;
        }
        if let Some(value) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(value);
        }
        if let Some(value) = get(ENV_ENDPOINT) {
            self.endpoint = value;
        }
        if let Some(value) = get(ENV_TIMEOUT) {
            self.submit_timeout_secs =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_TIMEOUT,
                    value: value.clone(),
                })?;
        }
        Ok(())
    }

    pub fn notifier(&self) -> EmailJsNotifier {
        EmailJsNotifier::new(self.emailjs.clone())
            .with_endpoint(self.endpoint.clone())
            .with_access_token(self.access_token.clone())
    }

    /// Public key with everything but the last four characters hidden.
    pub fn masked_public_key(&self) -> String {
        mask(&self.emailjs.public_key)
    }
}

/// Returns the application data directory, defaulting to `~/.prequal`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(ENV_HOME) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    /// Reads the stored configuration, falling back to defaults when no file
    /// exists yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Stored configuration with environment overrides applied.
    pub fn load_effective(&self) -> Result<Config, ConfigError> {
        let mut config = self.load()?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.submit_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn save_then_load_preserves_credentials() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().join("nested")).unwrap();
        let mut config = Config::default();
        config.emailjs.service_id = "service_1".into();
        config.submit_timeout_secs = 30;
        manager.save(&config).unwrap();

        assert_eq!(manager.load().unwrap(), config);
        assert!(!tmp_path(manager.path()).exists());
    }

    #[test]
    fn overrides_replace_non_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_SERVICE_ID, "svc"),
            (ENV_TEMPLATE_ID, " "),
            (ENV_TIMEOUT, "5"),
        ]);
        let mut config = Config::default();
        config.emailjs.template_id = "stored".into();
        config
            .apply_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();

        assert_eq!(config.emailjs.service_id, "svc");
        assert_eq!(config.emailjs.template_id, "stored");
        assert_eq!(config.submit_timeout_secs, 5);
    }

    #[test]
    fn invalid_timeout_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == ENV_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_TIMEOUT, .. }));
    }

    #[test]
    fn public_key_is_masked() {
        let mut config = Config::default();
        config.emailjs.public_key = "abcdef123456".into();
        assert_eq!(config.masked_public_key(), "********3456");
        config.emailjs.public_key = "abc".into();
        assert_eq!(config.masked_public_key(), "***");
    }
}
