//! Gradio space client.
//!
//! Gradio's HTTP API is two calls: `POST /gradio_api/call/{api}` queues the
//! job and returns an `event_id`, then `GET /gradio_api/call/{api}/{event_id}`
//! streams server-sent events until `complete` (JSON array payload) or
//! `error`.

use serde::Serialize;
use serde_json::Value;

use super::config::InferenceConfig;
use super::{InferenceError, InferenceReply};

pub struct GradioClient {
    http: reqwest::Client,
    call_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct CallRequest<'a> {
    data: [&'a str; 1],
}

impl GradioClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let http = super::build_http(config)?;
        let call_url = format!("{}/gradio_api/call/{}", config.base_url, config.endpoint);
        Ok(Self { http, call_url, token: config.api_key.clone() })
    }

    pub async fn respond(&self, query: &str) -> Result<InferenceReply, InferenceError> {
        let mut queue = self
            .http
            .post(&self.call_url)
            .json(&CallRequest { data: [query] });
        if let Some(token) = &self.token {
            queue = queue.bearer_auth(token);
        }
        let body = read_success(queue.send().await).await?;
        let event_id = parse_event_id(&body)?;

        let mut poll = self.http.get(format!("{}/{event_id}", self.call_url));
        if let Some(token) = &self.token {
            poll = poll.bearer_auth(token);
        }
        let stream = read_success(poll.send().await).await?;
        parse_event_stream(&stream)
    }
}

async fn read_success(sent: Result<reqwest::Response, reqwest::Error>) -> Result<String, InferenceError> {
    let response = sent.map_err(|e| InferenceError::ApiRequest(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| InferenceError::ApiRequest(e.to_string()))?;
    if status != 200 {
        return Err(InferenceError::ApiResponse { status, body: text });
    }
    Ok(text)
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_event_id(json_text: &str) -> Result<String, InferenceError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| InferenceError::ApiParse(e.to_string()))?;
    root.get("event_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| InferenceError::ApiParse("gradio: missing event_id".to_string()))
}

/// Interpret a Gradio SSE body.
///
/// Only the first `complete` or `error` event matters; heartbeats and
/// `generating` updates are skipped.
pub(crate) fn parse_event_stream(body: &str) -> Result<InferenceReply, InferenceError> {
    let mut event: Option<&str> = None;
    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(name) = line.strip_prefix("event:") {
            event = Some(name.trim());
            continue;
        }
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        match event {
            Some("complete") => return parse_complete_payload(data),
            Some("error") => {
                let detail = if data.is_empty() || data == "null" { "gradio reported an error" } else { data };
                return Err(InferenceError::Upstream(detail.to_string()));
            }
            _ => {}
        }
    }
    Err(InferenceError::ApiParse("gradio: stream ended without complete event".to_string()))
}

fn parse_complete_payload(data: &str) -> Result<InferenceReply, InferenceError> {
    let value: Value = serde_json::from_str(data).map_err(|e| InferenceError::ApiParse(e.to_string()))?;
    Ok(match value {
        Value::Array(items) => InferenceReply::List(items.into_iter().filter_map(value_to_text).collect()),
        Value::Null => InferenceReply::Empty,
        other => value_to_text(other).map_or(InferenceReply::Empty, InferenceReply::Text),
    })
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_parsed() {
        assert_eq!(parse_event_id(r#"{"event_id":"abc123"}"#).unwrap(), "abc123");
    }

    #[test]
    fn event_id_missing_errors() {
        assert!(parse_event_id(r#"{"other":1}"#).is_err());
        assert!(parse_event_id(r#"{"event_id":""}"#).is_err());
        assert!(parse_event_id("not json").is_err());
    }

    #[test]
    fn complete_event_yields_list() {
        let body = "event: heartbeat\ndata: null\n\nevent: complete\ndata: [\"Hi [/studio] there\"]\n\n";
        let reply = parse_event_stream(body).unwrap();
        assert_eq!(reply, InferenceReply::List(vec!["Hi [/studio] there".into()]));
        assert_eq!(reply.into_text(), "Hi [/studio] there");
    }

    #[test]
    fn complete_event_with_crlf() {
        let body = "event: complete\r\ndata: [\"ok\", \"ignored\"]\r\n\r\n";
        assert_eq!(parse_event_stream(body).unwrap().into_text(), "ok");
    }

    #[test]
    fn complete_event_skips_nulls_and_stringifies_others() {
        let body = "event: complete\ndata: [null, 42]\n";
        assert_eq!(parse_event_stream(body).unwrap(), InferenceReply::List(vec!["42".into()]));
    }

    #[test]
    fn complete_event_with_bare_string() {
        let body = "event: complete\ndata: \"plain\"\n";
        assert_eq!(parse_event_stream(body).unwrap(), InferenceReply::Text("plain".into()));
    }

    #[test]
    fn complete_event_null_is_empty() {
        let body = "event: complete\ndata: null\n";
        assert_eq!(parse_event_stream(body).unwrap().into_text(), crate::inference::FALLBACK_REPLY);
    }

    #[test]
    fn error_event_is_upstream_error() {
        let body = "event: error\ndata: null\n";
        assert!(matches!(parse_event_stream(body), Err(InferenceError::Upstream(_))));
    }

    #[test]
    fn generating_updates_are_skipped() {
        let body = "event: generating\ndata: [\"par\"]\n\nevent: complete\ndata: [\"partial done\"]\n";
        assert_eq!(parse_event_stream(body).unwrap().into_text(), "partial done");
    }

    #[test]
    fn stream_without_complete_errors() {
        let body = "event: heartbeat\ndata: null\n";
        assert!(matches!(parse_event_stream(body), Err(InferenceError::ApiParse(_))));
    }

    #[test]
    fn call_request_shape() {
        let json = serde_json::to_value(CallRequest { data: ["hello"] }).unwrap();
        assert_eq!(json, serde_json::json!({ "data": ["hello"] }));
    }
}
