//! Chat configuration: secrets file, environment overrides, validation.
//!
//! Precedence, lowest to highest: `secrets.toml`, environment variables,
//! command-line flags. The binary applies flags on the returned
//! [`ChatConfig`] before calling [`ChatConfig::validate`].

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use repe_turn::{ApiKey, Backend};
use serde::Deserialize;
use thiserror::Error;

/// Secrets file read when no `--config` path is given.
pub const DEFAULT_CONFIG_PATH: &str = "secrets.toml";

/// Key of the completions API key, in the file and the environment.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Key of the steering endpoint URL, in the file and the environment.
pub const MODEL_ENDPOINT: &str = "MODEL_ENDPOINT";
/// Key of the completions API base URL, in the file and the environment.
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
/// Key of the optional steering endpoint bearer token.
pub const MODEL_API_KEY: &str = "MODEL_API_KEY";
/// Environment variable bounding each request, in seconds.
pub const TIMEOUT_ENV: &str = "REPE_TIMEOUT_SECS";
/// Environment variable selecting the backend.
pub const BACKEND_ENV: &str = "REPE_BACKEND";
/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "REPE_MODEL";
/// Environment variable overriding the system prompt.
pub const SYSTEM_PROMPT_ENV: &str = "REPE_SYSTEM_PROMPT";

/// Errors from loading or validating configuration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The secrets file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The secrets file is not valid TOML or has wrongly typed keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A setting the selected backend needs is absent.
    #[error("missing required setting {0}")]
    Missing(&'static str),
    /// A setting is present but unusable.
    #[error("invalid {key}: {message}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// On-disk shape of `secrets.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SecretsFile {
    #[serde(rename = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
    #[serde(rename = "MODEL_ENDPOINT")]
    model_endpoint: Option<String>,
    #[serde(rename = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,
    #[serde(rename = "MODEL_API_KEY")]
    model_api_key: Option<String>,
    timeout_secs: Option<u64>,
    backend: Option<Backend>,
    model: Option<String>,
    system_prompt: Option<String>,
}

/// Resolved settings for one run of the chat client.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Which backend serves the conversation.
    pub backend: Backend,
    /// URL of the steering endpoint.
    pub model_endpoint: Option<String>,
    /// Bearer token for the steering endpoint, if it wants one.
    pub model_api_key: Option<ApiKey>,
    /// Key for the completions API.
    pub api_key: Option<ApiKey>,
    /// Base URL of the completions API, for proxies and local servers.
    pub openai_base_url: Option<String>,
    /// Model override; each provider has its own default.
    pub model: Option<String>,
    /// System prompt seeded into every conversation.
    pub system_prompt: Option<String>,
    /// Bound on each request, streamed body included.
    pub timeout: Option<Duration>,
}

impl ChatConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: SecretsFile = toml::from_str(text)?;
        Ok(Self {
            backend: file.backend.unwrap_or_default(),
            model_endpoint: non_empty(file.model_endpoint),
            api_key: non_empty(file.openai_api_key).map(ApiKey::new),
            openai_base_url: non_empty(file.openai_base_url),
            model_api_key: non_empty(file.model_api_key).map(ApiKey::new),
            timeout: positive_secs(file.timeout_secs, "timeout_secs")?,
            model: non_empty(file.model),
            system_prompt: non_empty(file.system_prompt),
        })
    }

    /// Load configuration from a TOML file that must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    /// Load configuration from a TOML file, falling back to defaults
    /// when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Overlay variables from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay variables read through `lookup`. Empty values count as unset.
    pub fn with_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| non_empty(lookup(name));

        if let Some(raw) = var(BACKEND_ENV) {
            self.backend = raw.parse().map_err(|message| ConfigError::Invalid {
                key: BACKEND_ENV,
                message,
            })?;
        }
        if let Some(endpoint) = var(MODEL_ENDPOINT) {
            self.model_endpoint = Some(endpoint);
        }
        if let Some(key) = var(OPENAI_API_KEY) {
            self.api_key = Some(ApiKey::new(key));
        }
        if let Some(url) = var(OPENAI_BASE_URL) {
            self.openai_base_url = Some(url);
        }
        if let Some(key) = var(MODEL_API_KEY) {
            self.model_api_key = Some(ApiKey::new(key));
        }
        if let Some(raw) = var(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: TIMEOUT_ENV,
                message: e.to_string(),
            })?;
            self.timeout = positive_secs(Some(secs), TIMEOUT_ENV)?;
        }
        if let Some(model) = var(MODEL_ENV) {
            self.model = Some(model);
        }
        if let Some(prompt) = var(SYSTEM_PROMPT_ENV) {
            self.system_prompt = Some(prompt);
        }
        Ok(self)
    }

    /// Check that the selected backend has what it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            Backend::Steering if self.model_endpoint.is_none() => {
                Err(ConfigError::Missing(MODEL_ENDPOINT))
            }
            Backend::Completions if self.api_key.as_ref().is_none_or(ApiKey::is_empty) => {
                Err(ConfigError::Missing(OPENAI_API_KEY))
            }
            _ => Ok(()),
        }
    }
}

fn positive_secs(secs: Option<u64>, key: &'static str) -> Result<Option<Duration>, ConfigError> {
    match secs {
        Some(0) => Err(ConfigError::Invalid {
            key,
            message: "must be at least 1 second".into(),
        }),
        other => Ok(other.map(Duration::from_secs)),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn parses_secrets_file() {
        let config = ChatConfig::from_toml_str(
            r#"
            OPENAI_API_KEY = "sk-file"
            MODEL_ENDPOINT = "http://localhost:8000/v1/chat/completions"
            model = "rep-control-70b"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::Steering);
        assert_eq!(config.api_key.as_ref().map(ApiKey::expose), Some("sk-file"));
        assert_eq!(
            config.model_endpoint.as_deref(),
            Some("http://localhost:8000/v1/chat/completions")
        );
        assert_eq!(config.model.as_deref(), Some("rep-control-70b"));
        assert!(config.system_prompt.is_none());
    }

    #[test]
    fn parses_backend_key() {
        let config = ChatConfig::from_toml_str(r#"backend = "completions""#).unwrap();
        assert_eq!(config.backend, Backend::Completions);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(
            ChatConfig::from_toml_str("MODEL_ENDPIONT = \"x\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ChatConfig::from_toml_str("backend = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn empty_values_are_unset() {
        let config = ChatConfig::from_toml_str(r#"OPENAI_API_KEY = """#).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn environment_overrides_file() {
        let config = ChatConfig::from_toml_str(
            r#"
            MODEL_ENDPOINT = "http://file"
            model = "from-file"
            "#,
        )
        .unwrap()
        .with_env_from(env(&[
            (MODEL_ENDPOINT, "http://env"),
            (BACKEND_ENV, "openai"),
            (OPENAI_API_KEY, "sk-env"),
            (OPENAI_BASE_URL, "http://proxy"),
            (MODEL_ENV, ""),
        ]))
        .unwrap();

        assert_eq!(config.model_endpoint.as_deref(), Some("http://env"));
        assert_eq!(config.backend, Backend::Completions);
        assert_eq!(config.api_key.as_ref().map(ApiKey::expose), Some("sk-env"));
        assert_eq!(config.openai_base_url.as_deref(), Some("http://proxy"));
        assert_eq!(config.model.as_deref(), Some("from-file"));
    }

    #[test]
    fn invalid_backend_in_environment() {
        let err = ChatConfig::default()
            .with_env_from(env(&[(BACKEND_ENV, "anthropic")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: BACKEND_ENV, .. }));
    }

    #[test]
    fn validate_requires_backend_settings() {
        let steering = ChatConfig::default();
        assert!(matches!(
            steering.validate(),
            Err(ConfigError::Missing(MODEL_ENDPOINT))
        ));

        let completions = ChatConfig {
            backend: Backend::Completions,
            model_endpoint: Some("http://unused".into()),
            ..ChatConfig::default()
        };
        assert!(matches!(
            completions.validate(),
            Err(ConfigError::Missing(OPENAI_API_KEY))
        ));

        let ok = ChatConfig {
            backend: Backend::Completions,
            api_key: Some(ApiKey::new("sk")),
            ..ChatConfig::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn load_reads_file_and_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "MODEL_ENDPOINT = \"http://disk\"\n").unwrap();

        let config = ChatConfig::load(&path).unwrap();
        assert_eq!(config.model_endpoint.as_deref(), Some("http://disk"));

        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            ChatConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
        let fallback = ChatConfig::load_or_default(&missing).unwrap();
        assert!(fallback.model_endpoint.is_none());
    }

    #[test]
    fn timeout_and_endpoint_key_from_file_and_environment() {
        let config = ChatConfig::from_toml_str(
            r#"
            MODEL_API_KEY = "repe-file"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.model_api_key.as_ref().map(ApiKey::expose), Some("repe-file"));

        let config = config
            .with_env_from(env(&[(TIMEOUT_ENV, "90"), (MODEL_API_KEY, "repe-env")]))
            .unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.model_api_key.as_ref().map(ApiKey::expose), Some("repe-env"));
    }

    #[test]
    fn zero_or_garbage_timeout_is_rejected() {
        assert!(matches!(
            ChatConfig::from_toml_str("timeout_secs = 0"),
            Err(ConfigError::Invalid { key: "timeout_secs", .. })
        ));
        assert!(matches!(
            ChatConfig::default().with_env_from(env(&[(TIMEOUT_ENV, "soon")])),
            Err(ConfigError::Invalid { key: TIMEOUT_ENV, .. })
        ));
    }

    #[test]
    fn api_key_not_in_debug_output() {
        let config = ChatConfig::from_toml_str(r#"OPENAI_API_KEY = "sk-hidden""#).unwrap();
        assert!(!format!("{config:?}").contains("sk-hidden"));
    }
}
