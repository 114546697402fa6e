//! Groq chat-completions client (OpenAI-compatible API) with streaming.

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::ai::streaming::{StreamEvent, StreamSender};
use crate::ai::Message;
use futures_util::StreamExt;

const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

/// One SSE chunk of a streamed completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GroqClient {
    pub fn new(api_key: &str, endpoint: Option<&str>, model: Option<&str>) -> Self {
        Self {
            client: crate::http::shared_client().clone(),
            api_key: api_key.to_string(),
            endpoint: endpoint
                .unwrap_or(DEFAULT_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    /// Stream a completion, forwarding each non-empty content delta into `tx`
    /// as it arrives and `StreamEvent::Done` once the upstream signals
    /// completion. A dropped receiver (client disconnect) silently stops the
    /// relay. One attempt, no retry.
    pub async fn stream_chat(
        &self,
        messages: Vec<Message>,
        tx: &StreamSender,
    ) -> Result<(), String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            stream: true,
        };

        log::debug!("Sending streaming request to {}", self.url());

        let response = self
            .client
            .post(self.url())
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Groq API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(format!("Groq API error: {}", parsed.error.message));
            }
            return Err(format!(
                "Groq API returned error status: {}, body: {}",
                status, error_text
            ));
        }

        // SSE lines can split across network chunks; buffer bytes and only
        // decode complete lines.
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        'read: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("Failed to read Groq stream: {}", e))?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line_bytes);
                match parse_sse_line(line.trim()) {
                    SseLine::Content(content) => {
                        if tx
                            .send(StreamEvent::ContentDelta { content })
                            .await
                            .is_err()
                        {
                            // Receiver dropped — the client went away.
                            return Ok(());
                        }
                    }
                    SseLine::Done => break 'read,
                    SseLine::Skip => {}
                }
            }
        }

        let _ = tx.send(StreamEvent::Done).await;
        Ok(())
    }
}

enum SseLine {
    /// Non-empty content delta.
    Content(String),
    /// `data: [DONE]` terminator.
    Done,
    /// Comment, empty keep-alive line, or a delta without content.
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    let Ok(chunk) = serde_json::from_str::<ChatCompletionChunk>(data) else {
        return SseLine::Skip;
    };
    match chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
    {
        Some(content) if !content.is_empty() => SseLine::Content(content),
        _ => SseLine::Skip,
    }
}
