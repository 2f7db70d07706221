//! Request body for the steering endpoint.

use repe_turn::ChatRequest;

/// Convert a [`ChatRequest`] into the steering endpoint's JSON body.
///
/// The field set is fixed: streaming is always on, one choice, no echo, no
/// logprobs, no control vector override. The concept selector has no field
/// on the wire; only the coefficient is sent.
#[must_use]
pub fn to_api_request(req: &ChatRequest, default_model: &str) -> serde_json::Value {
    let model = req.model.as_deref().unwrap_or(default_model);

    serde_json::json!({
        "model": model,
        "messages": req.messages,
        "stream": true,
        "n": 1,
        "echo": false,
        "logprobs": false,
        "control": null,
        "repe_coefficient": req.steering.coefficient(),
    })
}
