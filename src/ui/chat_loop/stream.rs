use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::chat_stream::{CompletionGateway, GatewayError};
use crate::core::session::Submission;

#[derive(Debug)]
pub enum StreamMessage {
    Chunk(String),
    Error(GatewayError),
    End,
}

pub type StreamReceiver = mpsc::Receiver<(StreamMessage, u64)>;

/// Drives completions off the UI task and hands fragments back one at a time.
#[derive(Clone)]
pub struct StreamDispatcher {
    tx: mpsc::Sender<(StreamMessage, u64)>,
}

impl StreamDispatcher {
    /// Capacity 1: the producer waits until the loop has taken the previous
    /// fragment.
    pub fn new() -> (Self, StreamReceiver) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    pub fn spawn(&self, gateway: CompletionGateway, submission: Submission) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            forward_completion(&gateway, submission, &tx).await;
        })
    }
}

async fn forward_completion(
    gateway: &CompletionGateway,
    submission: Submission,
    tx: &mpsc::Sender<(StreamMessage, u64)>,
) {
    let Submission {
        stream_id,
        system_prompt,
        turns,
    } = submission;

    let mut completion = match gateway.complete(&system_prompt, &turns).await {
        Ok(completion) => completion,
        Err(err) => {
            let _ = tx.send((StreamMessage::Error(err), stream_id)).await;
            return;
        }
    };

    while let Some(item) = completion.next_fragment().await {
        match item {
            Ok(fragment) => {
                if tx
                    .send((StreamMessage::Chunk(fragment), stream_id))
                    .await
                    .is_err()
                {
                    // Receiver gone: the UI is shutting down.
                    return;
                }
            }
            Err(err) => {
                let _ = tx.send((StreamMessage::Error(err), stream_id)).await;
                return;
            }
        }
    }

    let _ = tx.send((StreamMessage::End, stream_id)).await;
}
