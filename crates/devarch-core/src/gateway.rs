//! Inference gateway.
//!
//! [`ModelGateway`] is the seam between the pipeline and the hosted
//! text-completion service. [`InferenceClient`] is the HTTP implementation:
//! one POST per call, no retries, and a tagged decode of the two response
//! envelopes the service is known to return.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::CoreError;

/// Default completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.together.xyz/inference";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-4-Maverick-17B-128E-Instruct-FP8";

/// Maximum number of tokens the model may generate per call.
pub const MAX_TOKENS: u32 = 2048;

/// Sampling temperature sent with every call.
pub const TEMPERATURE: f64 = 0.5;

/// Normalized outcome of one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// Generated text, trimmed.
    Success(String),
    /// Non-200 response: status code and raw body.
    ApiError { status: u16, body: String },
    /// 200 response whose body matched neither known envelope.
    FormatError(String),
}

impl ModelReply {
    pub fn is_success(&self) -> bool {
        matches!(self, ModelReply::Success(_))
    }

    /// The text shown to the user for this reply. Errors are rendered as
    /// readable messages instead of going through a separate channel.
    pub fn into_display_text(self) -> String {
        match self {
            ModelReply::Success(text) => text,
            ModelReply::ApiError { status, body } => format!("❌ API Error {status}: {body}"),
            ModelReply::FormatError(raw) => format!("⚠️ Unrecognized response format: {raw}"),
        }
    }
}

/// Sends a prompt to a text-completion service.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Run one completion.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Http` when the request could not be delivered or
    /// the response body could not be read. HTTP-level failures are not
    /// errors; they come back as [`ModelReply::ApiError`].
    async fn complete(&self, prompt: &str, model: &str) -> Result<ModelReply, CoreError>;
}

// ── Wire types ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ChoiceList {
    choices: Vec<Choice>,
}

/// The two success envelopes, tried in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Flat(ChoiceList),
    Nested { output: ChoiceList },
}

impl Envelope {
    fn into_first_text(self) -> Option<String> {
        let list = match self {
            Envelope::Flat(list) => list,
            Envelope::Nested { output } => output,
        };
        list.choices.into_iter().next().map(|c| c.text)
    }
}

/// Decode a 200 response body into a [`ModelReply`].
///
/// Anything that is not one of the two envelopes with at least one choice,
/// including non-JSON bodies, is echoed back verbatim.
fn decode_success(body: &str) -> ModelReply {
    match serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(Envelope::into_first_text)
    {
        Some(text) => ModelReply::Success(text.trim().to_owned()),
        None => ModelReply::FormatError(body.to_owned()),
    }
}

// ── HTTP client ──────────────────────────────────────────────

/// HTTP client for the hosted inference endpoint.
pub struct InferenceClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl InferenceClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelGateway for InferenceClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, model: &str) -> Result<ModelReply, CoreError> {
        let request = CompletionRequest {
            model,
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "inference endpoint returned an error");
            return Ok(ModelReply::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let reply = decode_success(&body);
        if reply.is_success() {
            debug!(body_len = body.len(), "completion received");
        } else {
            warn!(body_len = body.len(), "unrecognized completion envelope");
        }
        Ok(reply)
    }
}
