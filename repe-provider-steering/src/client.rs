//! Steering endpoint client struct and builder.

use std::future::Future;
use std::time::Duration;

use repe_turn::{ApiKey, ChatRequest, Provider, ProviderError, StreamHandle};

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::to_api_request;
use crate::streaming::stream_completion;

/// Default model used when none is specified on the request.
const DEFAULT_MODEL: &str = "rep-control";

/// Client for a steering-enabled chat endpoint.
///
/// Implements [`Provider`] for use anywhere a provider is accepted.
///
/// # Example
///
/// ```no_run
/// use repe_provider_steering::SteeringProvider;
///
/// let client = SteeringProvider::new("https://repe.example.com/v1/chat/completions")
///     .model("rep-control");
/// ```
pub struct SteeringProvider {
    /// Full URL of the chat endpoint.
    pub(crate) endpoint: String,
    /// Default model identifier used when the request does not specify one.
    pub(crate) model: String,
    /// Optional bearer token; the reference endpoint is unauthenticated.
    pub(crate) api_key: Option<ApiKey>,
    /// Overall request timeout, including the streamed body.
    pub(crate) timeout: Option<Duration>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl SteeringProvider {
    /// Create a client for the given endpoint URL.
    ///
    /// Default model: `rep-control`. No authentication, no timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: DEFAULT_MODEL.into(),
            api_key: None,
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send `Authorization: Bearer <key>` with every request.
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Bound the whole request, streamed body included.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The endpoint URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Provider for SteeringProvider {
    /// Post the conversation with its steering coefficient and stream the reply.
    fn complete_stream(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        let url = self.endpoint.clone();
        let default_model = self.model.clone();
        let api_key = self.api_key.clone();
        let timeout = self.timeout;
        let http_client = self.client.clone();

        async move {
            let body = to_api_request(&request, &default_model);

            tracing::debug!(
                url = %url,
                model = %body["model"],
                messages = request.messages.len(),
                coefficient = request.steering.coefficient(),
                concept = %request.steering.concept(),
                "sending steering completion request"
            );

            let mut http_request = http_client
                .post(&url)
                .header("content-type", "application/json")
                .json(&body);
            if let Some(key) = &api_key {
                http_request = http_request.bearer_auth(key.expose());
            }
            if let Some(timeout) = timeout {
                http_request = http_request.timeout(timeout);
            }

            let response = http_request
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;

            let status = response.status();
            if !status.is_success() {
                let headers = response.headers().clone();
                let body_text = response
                    .text()
                    .await
                    .map_err(|e| map_reqwest_error(e, timeout))?;
                return Err(map_http_status(status, &headers, &body_text));
            }

            Ok(stream_completion(response))
        }
    }
}
