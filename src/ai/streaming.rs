//! Streaming fragment relay types.
//!
//! The provider pushes partial-content fragments into a bounded channel as
//! they arrive; the HTTP layer drains the channel into the response body.
//! One-directional, finite, not restartable — fragments are forwarded in
//! arrival order with no buffering beyond the channel itself.

use tokio::sync::mpsc;

/// Events emitted while relaying a completion response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A partial-content fragment from the provider.
    ContentDelta { content: String },
    /// The upstream source signalled completion.
    Done,
    /// The upstream call failed; no further events follow.
    Error { message: String },
}

/// Sender for stream events.
pub type StreamSender = mpsc::Sender<StreamEvent>;

/// Receiver for stream events.
pub type StreamReceiver = mpsc::Receiver<StreamEvent>;

/// Create a new stream channel with the specified buffer size.
pub fn create_stream_channel(buffer_size: usize) -> (StreamSender, StreamReceiver) {
    mpsc::channel(buffer_size)
}

/// Create a stream channel with default buffer size (32).
pub fn create_default_stream_channel() -> (StreamSender, StreamReceiver) {
    create_stream_channel(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_send_order() {
        let (tx, mut rx) = create_default_stream_channel();

        for text in ["Hel", "lo", " world"] {
            tx.send(StreamEvent::ContentDelta {
                content: text.to_string(),
            })
            .await
            .unwrap();
        }
        tx.send(StreamEvent::Done).await.unwrap();
        drop(tx);

        let mut collected = String::new();
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::ContentDelta { content } => collected.push_str(&content),
                StreamEvent::Done => break,
                StreamEvent::Error { message } => panic!("unexpected error: {}", message),
            }
        }
        assert_eq!(collected, "Hello world");
    }
}
