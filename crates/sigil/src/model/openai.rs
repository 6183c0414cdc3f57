//! OpenAI-compatible chat-completions client.
//!
//! Requests use strict `json_schema` structured outputs, so the message
//! content of the first choice is the JSON document the stage asked for.

use std::{env, error::Error as StdError, fmt, io, time::Duration};

use log::{debug, trace};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{CodeModel, CompletionRequest, ModelError};

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Longest error body kept in a [`ModelError::Status`].
const MAX_ERROR_BODY: usize = 320;

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// Blocking client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client for `endpoint` authenticating with `api_key`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            agent: ureq::Agent::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client reading the API key from the environment variable
    /// `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingApiKey`] when the variable is unset or
    /// blank.
    pub fn from_env(endpoint: impl Into<String>, api_key_env: &str) -> Result<Self, ModelError> {
        match env::var(api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(endpoint, key.trim())),
            _ => Err(ModelError::MissingApiKey(api_key_env.to_string())),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CodeModel for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        debug!(
            model = request.model(),
            schema = request.response_format().name(),
            messages = request.messages().len();
            "Sending completion request"
        );

        let response = self
            .agent
            .post(&self.endpoint)
            .timeout(request.timeout())
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(request_payload(request));

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(ModelError::Status {
                    status,
                    body: truncate(body.trim(), MAX_ERROR_BODY),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(classify_transport(&transport, request.timeout()));
            }
        };

        let body: Value = response
            .into_json()
            .map_err(|err| classify_io(err, request.timeout()))?;
        trace!(body:%; "Completion response");

        extract_content(body)
    }
}

/// Build the JSON payload for `request`.
fn request_payload(request: &CompletionRequest) -> Value {
    let format = request.response_format();
    json!({
        "model": request.model(),
        "messages": request.messages(),
        "temperature": request.temperature(),
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": format.name(),
                "strict": true,
                "schema": format.schema(),
            }
        }
    })
}

/// Pull the structured output out of a chat-completions response body.
fn extract_content(body: Value) -> Result<String, ModelError> {
    let response: ChatResponse = serde_json::from_value(body)
        .map_err(|err| ModelError::MalformedResponse(err.to_string()))?;

    let choice = response.choices.into_iter().next().ok_or_else(|| {
        ModelError::MalformedResponse("response contained no choices".to_string())
    })?;

    if let Some(refusal) = choice.message.refusal {
        return Err(ModelError::Refusal(refusal));
    }

    match choice.message.content {
        Some(content) => Ok(content),
        None => Err(ModelError::MalformedResponse(format!(
            "response contained no content (finish reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}

fn classify_transport(transport: &ureq::Transport, timeout: Duration) -> ModelError {
    if is_timeout(transport) {
        ModelError::Timeout(timeout)
    } else {
        ModelError::Transport(transport.to_string())
    }
}

fn classify_io(err: io::Error, timeout: Duration) -> ModelError {
    if is_timeout(&err) {
        ModelError::Timeout(timeout)
    } else {
        ModelError::MalformedResponse(err.to_string())
    }
}

/// Walk the source chain looking for an I/O timeout.
fn is_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(
                io_err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ) {
                return true;
            }
            // A custom io::Error reports its payload's source, not the payload.
            if let Some(inner) = io_err.get_ref() {
                if is_timeout(inner) {
                    return true;
                }
            }
        }
        current = err.source();
    }
    false
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
