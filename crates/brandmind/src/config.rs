//! Process-wide configuration, backed by environment variables with
//! programmatic overrides layered on top.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config key not found: {0}")]
    NotFound(String),

    #[error("could not deserialize config value for {key}: {message}")]
    DeserializeError { key: String, message: String },
}

pub struct Config {
    overrides: RwLock<HashMap<String, String>>,
}

static GLOBAL_CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    fn new() -> Self {
        Self {
            overrides: RwLock::new(HashMap::new()),
        }
    }

    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::new)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        if let Ok(overrides) = self.overrides.read() {
            if let Some(value) = overrides.get(key) {
                return Some(value.clone());
            }
        }
        std::env::var(key).ok()
    }

    /// Read a non-secret parameter. Raw values parse as JSON when possible
    /// (so numeric and boolean params work) and fall back to plain strings.
    pub fn get_param<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let raw = self
            .lookup(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        let value = serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw));
        serde_json::from_value(value).map_err(|e| ConfigError::DeserializeError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Read a secret (API keys). Secrets are kept out of Debug output and
    /// error messages by the consumers; lookup itself is the same.
    pub fn get_secret(&self, key: &str) -> Result<String, ConfigError> {
        self.lookup(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))
    }

    /// Override a key for the lifetime of the process. Takes precedence over
    /// the environment.
    pub fn set_param(&self, key: &str, value: &str) {
        if let Ok(mut overrides) = self.overrides.write() {
            overrides.insert(key.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_takes_precedence_over_env() {
        let config = Config::new();
        std::env::set_var("BRANDMIND_TEST_KEY_A", "from-env");
        config.set_param("BRANDMIND_TEST_KEY_A", "from-override");
        let value: String = config.get_param("BRANDMIND_TEST_KEY_A").unwrap();
        assert_eq!(value, "from-override");
        std::env::remove_var("BRANDMIND_TEST_KEY_A");
    }

    #[test]
    fn numeric_params_parse() {
        let config = Config::new();
        config.set_param("BRANDMIND_TEST_KEY_B", "45");
        let value: u64 = config.get_param("BRANDMIND_TEST_KEY_B").unwrap();
        assert_eq!(value, 45);
    }

    #[test]
    fn missing_key_is_not_found() {
        let config = Config::new();
        let err = config.get_secret("BRANDMIND_TEST_KEY_MISSING").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
