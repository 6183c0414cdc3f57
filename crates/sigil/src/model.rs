//! The code-generation model capability.
//!
//! Pipeline stages talk to a language model only through [`CodeModel`]: a
//! request goes in, the raw structured-output text comes back. Each stage
//! declares the JSON shape it expects with an [`OutputShape`] type, and
//! [`call`] turns the raw text into that type.
//!
//! Tests replace the model with scripted doubles:
//!
//! ```
//! use sigil::model::{self, CodeModel, CompletionRequest, GeneratedCode, ModelError, OutputShape};
//!
//! struct Echo;
//!
//! impl CodeModel for Echo {
//!     fn complete(&self, _request: &CompletionRequest) -> Result<String, ModelError> {
//!         Ok(r#"{"code": "print(1)", "raised_exception": false, "notes": ""}"#.to_string())
//!     }
//! }
//!
//! let request = CompletionRequest::new("gpt-4o-mini", GeneratedCode::response_format());
//! let generated: GeneratedCode = model::call(&Echo, &request).unwrap();
//! assert_eq!(generated.code.as_deref(), Some("print(1)"));
//! ```

pub mod openai;

use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;

/// Errors raised by a model call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("model refused the request: {0}")]
    Refusal(String),

    #[error("missing API key: environment variable `{0}` is not set")]
    MissingApiKey(String),
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One chat message of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Named JSON schema the model output must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    name: &'static str,
    schema: Value,
}

impl ResponseFormat {
    pub fn new(name: &'static str, schema: Value) -> Self {
        Self { name, schema }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    timeout: Duration,
    response_format: ResponseFormat,
}

impl CompletionRequest {
    /// Create a request with no messages, temperature 1.0 and a 30 second
    /// timeout.
    pub fn new(model: impl Into<String>, response_format: ResponseFormat) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: 1.0,
            timeout: Duration::from_secs(30),
            response_format,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn response_format(&self) -> &ResponseFormat {
        &self.response_format
    }
}

/// A language model that completes chat requests with structured output.
pub trait CodeModel {
    /// Run one completion and return the raw JSON text the model produced.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Timeout`] when the request exceeds its timeout,
    /// and other variants for transport or protocol failures.
    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}

/// A structured output the model is asked to produce.
pub trait OutputShape: DeserializeOwned {
    /// Schema name sent with the request.
    const NAME: &'static str;

    /// JSON schema of the shape.
    fn json_schema() -> Value;

    fn response_format() -> ResponseFormat {
        ResponseFormat::new(Self::NAME, Self::json_schema())
    }
}

/// Code produced by synthesis, refinement and review.
///
/// Missing or null fields deserialize as absent; stages treat absent or
/// blank code as "nothing returned".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratedCode {
    pub code: Option<String>,
    pub raised_exception: bool,
    pub notes: Option<String>,
}

impl OutputShape for GeneratedCode {
    const NAME: &'static str = "generated_code";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": { "type": "string" },
                "raised_exception": { "type": "boolean" },
                "notes": { "type": "string" }
            },
            "required": ["code", "raised_exception", "notes"],
            "additionalProperties": false
        })
    }
}

/// Result of one error-correction attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FixAttempt {
    pub fixed_code: Option<String>,
    pub success: bool,
}

impl OutputShape for FixAttempt {
    const NAME: &'static str = "error_fix";

    fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "fixed_code": { "type": "string" },
                "success": { "type": "boolean" }
            },
            "required": ["fixed_code", "success"],
            "additionalProperties": false
        })
    }
}

/// Run `request` against `model` and parse the output as `T`.
///
/// # Errors
///
/// Propagates the model's error, or returns
/// [`ModelError::MalformedResponse`] when the output is not valid JSON of
/// shape `T`.
pub fn call<T: OutputShape>(
    model: &dyn CodeModel,
    request: &CompletionRequest,
) -> Result<T, ModelError> {
    let raw = model.complete(request)?;
    serde_json::from_str(&raw).map_err(|err| {
        ModelError::MalformedResponse(format!("{} output did not parse: {err}", T::NAME))
    })
}
