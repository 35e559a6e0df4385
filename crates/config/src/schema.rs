//! Client configuration schema.
//!
//! Values merge in precedence order: built-in defaults, then an optional
//! YAML file, then `WAYFARE_`-prefixed environment variables.

use serde::{Deserialize, Serialize};

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_llm_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the API gateway (defaults to `http://localhost:8080`).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL of the LLM service hosting the streamed plan-generation
    /// endpoint (defaults to `http://localhost:8000`).
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    /// Fixed timeout applied to every non-streaming request, in seconds
    /// (defaults to 30). The streaming endpoint is not bounded by this.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            llm_base_url: default_llm_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Parses configuration from a YAML string, merged with defaults and
    /// `WAYFARE_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid or extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .merge(Env::prefixed("WAYFARE_"))
            .extract()
    }

    /// Loads configuration from a file path, merged with defaults and
    /// `WAYFARE_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: &std::path::Path) -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Format as _, Serialized, Yaml},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("WAYFARE_"))
            .extract()
    }

    /// Loads configuration from defaults and environment only.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if extraction fails.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Env, Serialized},
        };
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("WAYFARE_"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"
api_base_url: "https://api.wayfare.app"
llm_base_url: "https://llm.wayfare.app"
timeout_secs: 10
"#;

    #[test]
    fn test_default_config() {
        let c = Config::default();
        assert_eq!(c.api_base_url, "http://localhost:8080");
        assert_eq!(c.llm_base_url, "http://localhost:8000");
        assert_eq!(c.timeout_secs, 30);
    }

    #[test]
    fn test_from_yaml_full() {
        figment::Jail::expect_with(|_| {
            let c = Config::from_yaml(SAMPLE_YAML).unwrap();
            assert_eq!(c.api_base_url, "https://api.wayfare.app");
            assert_eq!(c.llm_base_url, "https://llm.wayfare.app");
            assert_eq!(c.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn test_from_yaml_defaults_applied() {
        figment::Jail::expect_with(|_| {
            let c = Config::from_yaml("timeout_secs: 5").unwrap();
            assert_eq!(c.timeout_secs, 5);
            assert_eq!(c.api_base_url, "http://localhost:8080"); // default preserved
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAYFARE_API_BASE_URL", "https://staging.wayfare.app");
            let c = Config::from_yaml(SAMPLE_YAML).unwrap();
            assert_eq!(c.api_base_url, "https://staging.wayfare.app");
            assert_eq!(c.timeout_secs, 10); // yaml value kept
            Ok(())
        });
    }

    #[test]
    fn test_from_env_only() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAYFARE_TIMEOUT_SECS", "7");
            let c = Config::from_env().unwrap();
            assert_eq!(c.timeout_secs, 7);
            Ok(())
        });
    }
}
