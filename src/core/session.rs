use tracing::debug;

use crate::core::conversation::ConversationLog;
use crate::core::message::Turn;
use crate::core::prompt::PromptStore;

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Input was empty after trimming.
    Empty,
    /// A completion is still streaming.
    Busy,
}

/// Everything the gateway needs for one completion, captured at submit time.
#[derive(Debug, Clone)]
pub struct Submission {
    pub stream_id: u64,
    pub system_prompt: String,
    pub turns: Vec<Turn>,
}

/// Assistant text assembled so far for the completion in flight.
#[derive(Debug, Clone, Default)]
pub struct PendingReply {
    pub stream_id: u64,
    pub text: String,
    pub fragments: usize,
}

/// State of one interactive session: prompt, transcript, and the reply in
/// flight. Lives from startup until the process exits.
#[derive(Debug, Default)]
pub struct Session {
    prompt: PromptStore,
    log: ConversationLog,
    pending: Option<PendingReply>,
    last_stream_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &PromptStore {
        &self.prompt
    }

    pub fn apply_prompt(&mut self, text: impl Into<String>) {
        self.prompt.apply(text);
    }

    pub fn reset_prompt(&mut self) {
        self.prompt.reset();
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn pending(&self) -> Option<&PendingReply> {
        self.pending.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.stream_id == stream_id)
    }

    /// Appends the user turn and snapshots the prompt and transcript for the
    /// request.
    pub fn submit(&mut self, input: &str) -> Result<Submission, SubmitRejected> {
        if self.is_streaming() {
            return Err(SubmitRejected::Busy);
        }
        if input.trim().is_empty() {
            return Err(SubmitRejected::Empty);
        }

        self.log.append(Turn::user(input));
        self.last_stream_id += 1;
        let stream_id = self.last_stream_id;
        self.pending = Some(PendingReply {
            stream_id,
            ..PendingReply::default()
        });
        debug!(stream_id, turns = self.log.len(), "submitted user turn");

        Ok(Submission {
            stream_id,
            system_prompt: self.prompt.get().to_string(),
            turns: self.log.all().to_vec(),
        })
    }

    /// Returns false when the fragment belongs to a stream that is no longer
    /// current.
    pub fn push_fragment(&mut self, stream_id: u64, fragment: &str) -> bool {
        match self.pending.as_mut() {
            Some(pending) if pending.stream_id == stream_id => {
                pending.text.push_str(fragment);
                pending.fragments += 1;
                true
            }
            _ => false,
        }
    }

    /// Appends the assembled assistant turn.
    pub fn complete_reply(&mut self, stream_id: u64) -> Option<&Turn> {
        if !self.is_current_stream(stream_id) {
            return None;
        }
        let pending = self.pending.take()?;
        debug!(
            stream_id,
            fragments = pending.fragments,
            "assistant reply completed"
        );
        self.log.append(Turn::assistant(pending.text));
        self.log.all().last()
    }

    /// Drops the partial reply without touching the transcript and returns
    /// what had been received.
    pub fn fail_reply(&mut self, stream_id: u64) -> Option<PendingReply> {
        if !self.is_current_stream(stream_id) {
            return None;
        }
        self.pending.take()
    }
}
