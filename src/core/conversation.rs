use crate::api::ChatMessage;
use crate::core::message::Turn;

/// Append-only transcript for one interactive session.
#[derive(Debug, Default, Clone)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Every turn so far, oldest first.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Builds the message list for one request: the system prompt first, then
/// every turn in order.
pub fn outbound_messages(system_prompt: &str, turns: &[Turn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::new("system", system_prompt));
    messages.extend(
        turns
            .iter()
            .map(|turn| ChatMessage::new(turn.role().as_str(), turn.content())),
    );
    messages
}
