//! Resolver configuration.
//!
//! [`ResolverConfig`] carries the defaults every lookup starts from. Services
//! load it once at start-up from `config/config.toml` (section `[resolver]`)
//! or environment variables such as `LOOKOUT__RESOLVER__ERROR_CODE`, using
//! `ResolverConfig::load()`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{ErrorSpec, COMMON_UID, DEFAULT_ERROR_CODE, DEFAULT_ERROR_MESSAGE};
use crate::model::DEFAULT_MODEL_OPERATION;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "LOOKOUT";
const SECTION: &str = "resolver";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_error_message")]
    pub error_message: String,
    #[serde(default = "default_error_uid")]
    pub error_uid: String,
    #[serde(default = "default_error_code")]
    pub error_code: u16,
    #[serde(default = "default_model_operation")]
    pub model_operation: String,
}

fn default_error_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}

fn default_error_uid() -> String {
    COMMON_UID.to_string()
}

fn default_error_code() -> u16 {
    DEFAULT_ERROR_CODE
}

fn default_model_operation() -> String {
    DEFAULT_MODEL_OPERATION.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            error_message: default_error_message(),
            error_uid: default_error_uid(),
            error_code: default_error_code(),
            model_operation: default_model_operation(),
        }
    }
}

impl ResolverConfig {
    /// Load the resolver configuration from `config/config.toml`, falling back to env vars.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE, ENV_PREFIX)
    }

    /// Load from an explicit file and environment prefix
    ///
    /// A missing file is fine. A file that exists but cannot be read is
    /// logged and skipped in favour of the environment. A missing
    /// `[resolver]` section yields the defaults.
    pub fn load_from(path: &str, env_prefix: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(env_prefix).separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                if std::path::Path::new(path).exists() {
                    log::warn!("failed to load config file {path}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix(env_prefix).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {err}, then env-only error: {env_err}"
                        ))
                    })?
            }
        };

        match settings.get::<ResolverConfig>(SECTION) {
            Ok(config) => Ok(config),
            Err(ConfigError::NotFound(_)) => {
                log::debug!("no [{SECTION}] configuration found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Message(format!(
                "Resolver configuration could not be loaded from file or environment: {e}"
            ))),
        }
    }

    /// Error spec every request starts from
    pub fn default_error_spec(&self) -> ErrorSpec {
        ErrorSpec::new(self.error_message.clone())
            .with_uid(self.error_uid.clone())
            .with_code(self.error_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("lookout-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.error_message, "Request error");
        assert_eq!(config.error_uid, "COMMON");
        assert_eq!(config.error_code, 400);
        assert_eq!(config.model_operation, "findOne");
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        let config =
            ResolverConfig::load_from("config/does-not-exist.toml", "LOOKOUT_TEST_EMPTY").unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_load_from_file_fills_missing_keys() {
        let path = temp_file(
            "resolver.toml",
            "[resolver]\nerror_message = \"Entity not found\"\nerror_code = 404\n",
        );
        let config = ResolverConfig::load_from(path.to_str().unwrap(), "LOOKOUT_TEST_FILE").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.error_message, "Entity not found");
        assert_eq!(config.error_code, 404);
        assert_eq!(config.error_uid, "COMMON");
        assert_eq!(config.model_operation, "findOne");
    }

    #[test]
    fn test_load_from_env() {
        std::env::set_var("LOOKOUT_TEST_ENV__RESOLVER__MODEL_OPERATION", "findById");
        let config = ResolverConfig::load_from("config/does-not-exist.toml", "LOOKOUT_TEST_ENV").unwrap();
        std::env::remove_var("LOOKOUT_TEST_ENV__RESOLVER__MODEL_OPERATION");

        assert_eq!(config.model_operation, "findById");
        assert_eq!(config.error_code, 400);
    }

    #[test]
    fn test_default_error_spec() {
        let config = ResolverConfig {
            error_message: "Missing".to_string(),
            error_uid: "lookup failed".to_string(),
            error_code: 404,
            ..ResolverConfig::default()
        };
        let spec = config.default_error_spec();
        assert_eq!(spec.message, "Missing");
        assert_eq!(spec.uid, "lookup failed");
        assert_eq!(spec.code, 404);
    }
}
