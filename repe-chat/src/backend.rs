//! The backend chosen once at startup.

use std::future::Future;

use repe_provider_openai::OpenAi;
use repe_provider_steering::SteeringProvider;
use repe_turn::{Backend, ChatRequest, Provider, ProviderError, StreamHandle};

use crate::config::{ChatConfig, ConfigError, MODEL_ENDPOINT, OPENAI_API_KEY};

/// A concrete provider selected from [`ChatConfig::backend`].
///
/// [`Provider`] is not object-safe, so runtime selection goes through
/// this enum rather than a trait object.
pub enum ChatBackend {
    /// Steering-enabled endpoint.
    Steering(SteeringProvider),
    /// Generic chat-completions API.
    Completions(OpenAi),
}

impl ChatBackend {
    /// Build the configured provider after validating the configuration.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let backend = match config.backend {
            Backend::Steering => {
                let endpoint = config
                    .model_endpoint
                    .clone()
                    .ok_or(ConfigError::Missing(MODEL_ENDPOINT))?;
                let mut provider = SteeringProvider::new(endpoint);
                if let Some(model) = &config.model {
                    provider = provider.model(model.clone());
                }
                if let Some(key) = &config.model_api_key {
                    provider = provider.api_key(key.clone());
                }
                if let Some(timeout) = config.timeout {
                    provider = provider.timeout(timeout);
                }
                ChatBackend::Steering(provider)
            }
            Backend::Completions => {
                let key = config
                    .api_key
                    .clone()
                    .ok_or(ConfigError::Missing(OPENAI_API_KEY))?;
                let mut provider = OpenAi::new(key);
                if let Some(url) = &config.openai_base_url {
                    provider = provider.base_url(url.clone());
                }
                if let Some(model) = &config.model {
                    provider = provider.model(model.clone());
                }
                if let Some(timeout) = config.timeout {
                    provider = provider.timeout(timeout);
                }
                ChatBackend::Completions(provider)
            }
        };

        tracing::info!(backend = %backend.kind(), "backend selected");
        Ok(backend)
    }

    /// Which backend this is.
    pub fn kind(&self) -> Backend {
        match self {
            ChatBackend::Steering(_) => Backend::Steering,
            ChatBackend::Completions(_) => Backend::Completions,
        }
    }

    /// Whether requests sent here honour the steering directive.
    pub fn supports_steering(&self) -> bool {
        matches!(self, ChatBackend::Steering(_))
    }
}

impl Provider for ChatBackend {
    fn complete_stream(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        async move {
            match self {
                ChatBackend::Steering(provider) => provider.complete_stream(request).await,
                ChatBackend::Completions(provider) => provider.complete_stream(request).await,
            }
        }
    }
}

impl std::fmt::Debug for ChatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ChatBackend").field(&self.kind()).finish()
    }
}
