//! Request mapping to the OpenAI Chat Completions API format.
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat>

use repe_turn::ChatRequest;

/// Convert a [`ChatRequest`] into the Chat Completions JSON body.
#[must_use]
pub fn to_api_request(req: &ChatRequest, default_model: &str) -> serde_json::Value {
    let model = req.model.as_deref().unwrap_or(default_model);

    serde_json::json!({
        "model": model,
        "messages": req.messages,
        "stream": true,
    })
}
