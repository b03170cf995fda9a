//! Hosted model that answers chat questions.
//!
//! DESIGN
//! ======
//! The chat flow only needs "plaintext in, text out". Providers differ in
//! shape: a Gradio space returns a JSON array, an OpenAI-compatible endpoint
//! returns choices. Both are normalized into [`InferenceReply`], and the
//! [`Inference`] trait is the seam the chat flow and tests depend on.
//! `InferenceClient` dispatches on `INFERENCE_PROVIDER`.

pub mod config;
pub mod gradio;
pub mod openai;

use config::{InferenceConfig, InferenceProviderKind};

/// Reply text used when the model returns no content at all.
pub const FALLBACK_REPLY: &str = "No response";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by inference client operations.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// No provider is configured; chat replies are unavailable.
    #[error("inference not configured")]
    NotConfigured,

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// A required configuration variable is not set.
    #[error("missing config: env var {var} not set")]
    MissingConfig { var: String },

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed (including timeouts).
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be interpreted.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider reported an error inside a successful response.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for InferenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_INFERENCE_NOT_CONFIGURED",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingConfig { .. } => "E_MISSING_CONFIG",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::Upstream(_) => "E_UPSTREAM",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REPLY
// =============================================================================

/// Raw reply shape from a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InferenceReply {
    Text(String),
    List(Vec<String>),
    Empty,
}

impl InferenceReply {
    /// Normalize to the single answer string: first list element, or the
    /// text itself, or [`FALLBACK_REPLY`] when there is nothing.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) if !text.is_empty() => text,
            Self::List(items) => items
                .into_iter()
                .next()
                .unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            Self::Text(_) | Self::Empty => FALLBACK_REPLY.to_string(),
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Provider-neutral async inference. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Inference: Send + Sync {
    /// Ask the model one plaintext question.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if the request fails or the response is
    /// malformed.
    async fn respond(&self, query: &str) -> Result<InferenceReply, InferenceError>;
}

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete inference client configured from environment variables.
pub struct InferenceClient {
    inner: InferenceProvider,
    label: String,
}

enum InferenceProvider {
    Gradio(gradio::GradioClient),
    OpenAi(openai::OpenAiClient),
}

impl InferenceClient {
    /// Build a client from environment variables. See [`InferenceConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if required config is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, InferenceError> {
        Self::from_config(InferenceConfig::from_env()?)
    }

    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: InferenceConfig) -> Result<Self, InferenceError> {
        let inner = match config.provider {
            InferenceProviderKind::Gradio => InferenceProvider::Gradio(gradio::GradioClient::new(&config)?),
            InferenceProviderKind::OpenAi => InferenceProvider::OpenAi(openai::OpenAiClient::new(&config)?),
        };
        let label = match config.provider {
            InferenceProviderKind::Gradio => format!("gradio:{}", config.endpoint),
            InferenceProviderKind::OpenAi => format!("openai:{}", config.model),
        };
        Ok(Self { inner, label })
    }

    /// Short provider/model label for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[async_trait::async_trait]
impl Inference for InferenceClient {
    async fn respond(&self, query: &str) -> Result<InferenceReply, InferenceError> {
        match &self.inner {
            InferenceProvider::Gradio(c) => c.respond(query).await,
            InferenceProvider::OpenAi(c) => c.respond(query).await,
        }
    }
}

pub(crate) fn build_http(config: &InferenceConfig) -> Result<reqwest::Client, InferenceError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeouts.request_secs))
        .connect_timeout(std::time::Duration::from_secs(config.timeouts.connect_secs))
        .build()
        .map_err(|e| InferenceError::HttpClientBuild(e.to_string()))
}
