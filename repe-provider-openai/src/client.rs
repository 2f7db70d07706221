//! Completions API client.

use std::future::Future;
use std::time::Duration;

use repe_turn::{ApiKey, ChatRequest, Provider, ProviderError, StreamHandle};

use crate::error::{map_http_status, map_reqwest_error};
use crate::mapping::to_api_request;
use crate::streaming::stream_completion;

const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Streaming client for an OpenAI-compatible chat completions API.
///
/// The steering directive carried by each [`ChatRequest`] is not sent;
/// this backend has no way to honour it.
///
/// ```no_run
/// use repe_provider_openai::OpenAi;
/// use repe_turn::ApiKey;
///
/// let client = OpenAi::new(ApiKey::new("sk-..."))
///     .base_url("http://localhost:8080")
///     .model("gpt-4o-mini");
/// ```
pub struct OpenAi {
    pub(crate) api_key: ApiKey,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) client: reqwest::Client,
}

impl OpenAi {
    /// Client for `https://api.openai.com` using `gpt-3.5-turbo`.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Model used when the request names none.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a proxy or local server. A trailing `/` is ignored.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Bound the whole request, streamed body included.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}{COMPLETIONS_PATH}", self.base_url)
    }
}

impl Provider for OpenAi {
    fn complete_stream(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        let url = self.completions_url();
        let body = to_api_request(&request, &self.model);
        let mut http_request = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body);
        if let Some(timeout) = self.timeout {
            http_request = http_request.timeout(timeout);
        }
        let timeout = self.timeout;

        tracing::debug!(
            url = %url,
            model = %body["model"],
            messages = request.messages.len(),
            ignored_steering = %request.steering,
            "sending streaming completion request"
        );

        async move {
            let response = http_request
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;

            let status = response.status();
            if status.is_success() {
                return Ok(stream_completion(response));
            }
            let text = response
                .text()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;
            Err(map_http_status(status, &text))
        }
    }
}
