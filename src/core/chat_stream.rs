//! Completion gateway: sends the outbound request and decodes the streamed
//! reply into text fragments, one at a time.

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use memchr::memchr;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::api::{ChatRequest, ChatResponse};
use crate::core::conversation::outbound_messages;
use crate::core::message::Turn;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("could not reach the completion service: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("completion request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("completion stream interrupted: {0}")]
    Interrupted(#[source] reqwest::Error),

    #[error("malformed completion stream: {reason}")]
    Malformed { reason: String },

    #[error("completion service reported an error: {message}")]
    Service { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Streaming,
    Completed,
    Failed,
}

/// Connection details for the remote completion service.
#[derive(Clone)]
pub struct CompletionGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submits `system_prompt` followed by `turns` and asks for a streamed
    /// reply. Fails up front when the service is unreachable or answers with
    /// a non-success status; later failures surface from the returned stream.
    pub async fn complete(
        &self,
        system_prompt: &str,
        turns: &[Turn],
    ) -> Result<CompletionStream, GatewayError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: outbound_messages(system_prompt, turns),
            stream: true,
        };
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(chat_completions_url(&self.base_url))
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "completion request failed to send");
                GatewayError::Connect(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(%status, "completion request rejected");
            return Err(GatewayError::Rejected {
                status,
                message: summarize_error_body(&body),
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(GatewayError::Interrupted)
            })
            .boxed();
        Ok(CompletionStream::new(body))
    }
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

enum Step {
    Fragment(String),
    Done,
    Skip,
}

/// Lazy, non-restartable sequence of reply fragments.
///
/// Only raw bytes are buffered between calls; each call decodes at most up to
/// the next fragment.
pub struct CompletionStream {
    body: BoxStream<'static, Result<Vec<u8>, GatewayError>>,
    buffer: Vec<u8>,
    body_finished: bool,
    state: CompletionState,
    fragments: usize,
}

impl CompletionStream {
    pub(crate) fn new(body: BoxStream<'static, Result<Vec<u8>, GatewayError>>) -> Self {
        Self {
            body,
            buffer: Vec::new(),
            body_finished: false,
            state: CompletionState::Streaming,
            fragments: 0,
        }
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    /// Fragments yielded so far.
    pub fn fragments_seen(&self) -> usize {
        self.fragments
    }

    /// Returns the next fragment, a single terminal error, or `None` once the
    /// stream has completed or failed.
    pub async fn next_fragment(&mut self) -> Option<Result<String, GatewayError>> {
        if self.state != CompletionState::Streaming {
            return None;
        }

        loop {
            let line = if let Some(newline_pos) = memchr(b'\n', &self.buffer) {
                let mut line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
                line.pop();
                Some(line)
            } else if self.body_finished {
                // A final line without a trailing newline still counts.
                if self.buffer.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.buffer))
                }
            } else {
                match self.body.next().await {
                    Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                    Some(Err(err)) => return Some(Err(self.fail(err))),
                    None => self.body_finished = true,
                }
                continue;
            };

            let Some(line) = line else {
                self.finish();
                return None;
            };

            match decode_line(&line) {
                Ok(Step::Fragment(fragment)) => {
                    self.fragments += 1;
                    return Some(Ok(fragment));
                }
                Ok(Step::Done) => {
                    self.finish();
                    return None;
                }
                Ok(Step::Skip) => continue,
                Err(err) => return Some(Err(self.fail(err))),
            }
        }
    }

    /// Drains the stream and concatenates every fragment.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut text = String::new();
        while let Some(fragment) = self.next_fragment().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }

    fn finish(&mut self) {
        debug!(fragments = self.fragments, "completion stream finished");
        self.state = CompletionState::Completed;
    }

    fn fail(&mut self, err: GatewayError) -> GatewayError {
        warn!(fragments = self.fragments, error = %err, "completion stream failed");
        self.state = CompletionState::Failed;
        self.buffer.clear();
        err
    }
}

fn decode_line(raw: &[u8]) -> Result<Step, GatewayError> {
    let line = std::str::from_utf8(raw)
        .map_err(|err| GatewayError::Malformed {
            reason: format!("invalid UTF-8 in stream: {err}"),
        })?
        .trim();

    let Some(payload) = line.strip_prefix("data:").map(str::trim_start) else {
        return Ok(Step::Skip);
    };
    if payload.is_empty() {
        return Ok(Step::Skip);
    }
    if payload == "[DONE]" {
        return Ok(Step::Done);
    }

    let response: ChatResponse =
        serde_json::from_str(payload).map_err(|err| GatewayError::Malformed {
            reason: format!("undecodable event ({err}): {}", clip(payload)),
        })?;

    if let Some(error) = &response.error {
        return Err(GatewayError::Service {
            message: extract_error_summary(&serde_json::json!({ "error": error }))
                .unwrap_or_else(|| error.to_string()),
        });
    }

    match response.first_delta_content() {
        Some(content) if !content.is_empty() => Ok(Step::Fragment(content.to_string())),
        _ => Ok(Step::Skip),
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .unwrap_or_else(|| clip(trimmed))
}

fn clip(text: &str) -> String {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
