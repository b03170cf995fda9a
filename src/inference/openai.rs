//! OpenAI-compatible `/chat/completions` client.
//!
//! Single-turn only: the portal sends one user question with a short system
//! prompt and reads back the text of every choice.

use serde::Serialize;
use serde_json::Value;

use super::config::InferenceConfig;
use super::{InferenceError, InferenceReply};

/// System prompt sent with every question.
const SYSTEM_PROMPT: &str = "You are the ExamEdge copilot for Indian competitive-exam aspirants. \
Answer briefly. When pointing the user to a portal page, write its path in square brackets, \
for example [/calendar], [/exams] or [/tools/photo].";

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let http = super::build_http(config)?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub async fn respond(&self, query: &str) -> Result<InferenceReply, InferenceError> {
        let messages = [CcMessage { role: "system", content: SYSTEM_PROMPT }, CcMessage { role: "user", content: query }];
        let body = CcRequest { model: &self.model, max_tokens: self.max_tokens, messages: &messages };

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| InferenceError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(InferenceError::ApiResponse { status, body: text });
        }
        parse_chat_completions_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage<'a>],
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: &'a str,
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<InferenceReply, InferenceError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| InferenceError::ApiParse(e.to_string()))?;
    let Some(choices) = root.get("choices").and_then(Value::as_array) else {
        return Err(InferenceError::ApiParse("chat_completions: missing choices".to_string()));
    };

    let texts: Vec<String> = choices
        .iter()
        .filter_map(|choice| {
            choice
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
        })
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
        .collect();

    if texts.is_empty() { Ok(InferenceReply::Empty) } else { Ok(InferenceReply::List(texts)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_choice() {
        let json = serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": "Use [/tools/photo]." },
                "finish_reason": "stop"
            }]
        })
        .to_string();
        let reply = parse_chat_completions_response(&json).unwrap();
        assert_eq!(reply.into_text(), "Use [/tools/photo].");
    }

    #[test]
    fn parse_multiple_choices_keeps_order() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "content": "a" } },
                { "message": { "content": null } },
                { "message": { "content": "b" } }
            ]
        })
        .to_string();
        assert_eq!(
            parse_chat_completions_response(&json).unwrap(),
            InferenceReply::List(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn parse_empty_choices_is_empty_reply() {
        let json = serde_json::json!({ "choices": [] }).to_string();
        assert_eq!(parse_chat_completions_response(&json).unwrap(), InferenceReply::Empty);
    }

    #[test]
    fn parse_missing_choices_errors() {
        let json = serde_json::json!({ "model": "x" }).to_string();
        assert!(parse_chat_completions_response(&json).is_err());
    }

    #[test]
    fn request_shape() {
        let messages = [CcMessage { role: "user", content: "hi" }];
        let body = CcRequest { model: "m", max_tokens: 5, messages: &messages };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 5);
    }
}
