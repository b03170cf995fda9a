//! Inference configuration parsed from environment variables.

use super::InferenceError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GRADIO_ENDPOINT: &str = "respond";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceProviderKind {
    Gradio,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    pub provider: InferenceProviderKind,
    pub base_url: String,
    /// Gradio API name (e.g. `respond`). Unused by `OpenAI`.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeouts: InferenceTimeouts,
}

impl InferenceConfig {
    /// Build typed inference config from environment variables.
    ///
    /// - `INFERENCE_PROVIDER`: `gradio` (default) or `openai`
    /// - `INFERENCE_BASE_URL`: required for `gradio`; `OpenAI` default otherwise
    /// - `INFERENCE_ENDPOINT`: Gradio API name, default `respond`
    /// - `INFERENCE_API_KEY_ENV`: names the env var holding the key
    ///   (required for `openai`, optional bearer token for `gradio`)
    /// - `INFERENCE_MODEL`: default `gpt-4o-mini`
    /// - `INFERENCE_MAX_TOKENS`: default 1024
    /// - `INFERENCE_REQUEST_TIMEOUT_SECS`: default 120
    /// - `INFERENCE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for unknown providers or missing required values.
    pub fn from_env() -> Result<Self, InferenceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`InferenceConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown providers or missing required values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InferenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = parse_provider(lookup("INFERENCE_PROVIDER").as_deref())?;

        let base_url = match (provider, lookup("INFERENCE_BASE_URL")) {
            (_, Some(url)) => url,
            (InferenceProviderKind::OpenAi, None) => DEFAULT_OPENAI_BASE_URL.to_string(),
            (InferenceProviderKind::Gradio, None) => {
                return Err(InferenceError::MissingConfig { var: "INFERENCE_BASE_URL".into() });
            }
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let api_key = match lookup("INFERENCE_API_KEY_ENV") {
            Some(key_var) => {
                Some(lookup(&key_var).ok_or_else(|| InferenceError::MissingApiKey { var: key_var.clone() })?)
            }
            None if provider == InferenceProviderKind::OpenAi => {
                return Err(InferenceError::MissingApiKey { var: "INFERENCE_API_KEY_ENV".into() });
            }
            None => None,
        };

        let endpoint = lookup("INFERENCE_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_GRADIO_ENDPOINT.to_string())
            .trim_matches('/')
            .to_string();
        let model = lookup("INFERENCE_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let max_tokens = parse_or(&lookup, "INFERENCE_MAX_TOKENS", DEFAULT_MAX_TOKENS);
        let timeouts = InferenceTimeouts {
            request_secs: parse_or(&lookup, "INFERENCE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "INFERENCE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, base_url, endpoint, api_key, model, max_tokens, timeouts })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_provider(raw: Option<&str>) -> Result<InferenceProviderKind, InferenceError> {
    match raw.unwrap_or("gradio") {
        "gradio" => Ok(InferenceProviderKind::Gradio),
        "openai" => Ok(InferenceProviderKind::OpenAi),
        other => Err(InferenceError::ConfigParse(format!("unknown INFERENCE_PROVIDER: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
