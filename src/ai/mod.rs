pub mod groq;
pub mod streaming;

pub use groq::GroqClient;

use serde::{Deserialize, Serialize};
use streaming::StreamSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Unified AI client over the configured provider.
///
/// Enum dispatch — adding a backend means a new module plus a new variant and
/// match arm. The stub variant exists only for endpoint tests.
pub enum AiClient {
    Groq(GroqClient),
    #[cfg(test)]
    Stub(stub::StubClient),
}

impl AiClient {
    /// Model identifier of the active provider (reported by `/status`).
    pub fn model(&self) -> &str {
        match self {
            AiClient::Groq(client) => client.model(),
            #[cfg(test)]
            AiClient::Stub(client) => client.model(),
        }
    }

    /// Stream a completion for `messages`, pushing fragments into `tx` in
    /// arrival order and `StreamEvent::Done` at the end. Exactly one attempt;
    /// failures come back as `Err` without any event having closed the
    /// stream.
    pub async fn stream_chat(
        &self,
        messages: Vec<Message>,
        tx: &StreamSender,
    ) -> Result<(), String> {
        match self {
            AiClient::Groq(client) => client.stream_chat(messages, tx).await,
            #[cfg(test)]
            AiClient::Stub(client) => client.stream_chat(messages, tx).await,
        }
    }
}

#[cfg(test)]
pub mod stub {
    use super::streaming::{StreamEvent, StreamSender};
    use super::Message;
    use std::sync::{Arc, Mutex};

    /// Test double: records the messages of every invocation and replays a
    /// canned fragment sequence.
    #[derive(Clone, Default)]
    pub struct StubClient {
        fragments: Vec<String>,
        calls: Arc<Mutex<Vec<Vec<Message>>>>,
    }

    impl StubClient {
        pub fn with_fragments(fragments: &[&str]) -> Self {
            Self {
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
                calls: Arc::default(),
            }
        }

        pub fn model(&self) -> &str {
            "stub-model"
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn recorded_calls(&self) -> Vec<Vec<Message>> {
            self.calls.lock().unwrap().clone()
        }

        pub async fn stream_chat(
            &self,
            messages: Vec<Message>,
            tx: &StreamSender,
        ) -> Result<(), String> {
            self.calls.lock().unwrap().push(messages);
            for fragment in &self.fragments {
                if tx
                    .send(StreamEvent::ContentDelta {
                        content: fragment.clone(),
                    })
                    .await
                    .is_err()
                {
                    return Ok(());
                }
            }
            let _ = tx.send(StreamEvent::Done).await;
            Ok(())
        }
    }
}
