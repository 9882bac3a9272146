//! Append-only conversation transcripts
//!
//! Every dialogue (the intent classifier and each branch) owns one
//! `ConversationMemory`. Turns are replayed, oldest first, in front of the
//! current input on every model call.

use crate::llm::LlmMessage;

/// Who said a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One recorded utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    speaker: Speaker,
    text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }

    #[cfg(test)]
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn to_message(&self) -> LlmMessage {
        match self.speaker {
            Speaker::User => LlmMessage::user(self.text.clone()),
            Speaker::Assistant => LlmMessage::assistant(self.text.clone()),
        }
    }
}

/// Transcript of a single dialogue.
///
/// The log only grows. `replay_window` caps how many of the latest turns are
/// sent to the model; it never removes recorded turns.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    key: &'static str,
    turns: Vec<Turn>,
    replay_window: Option<usize>,
}

impl ConversationMemory {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            turns: Vec::new(),
            replay_window: None,
        }
    }

    #[must_use]
    pub fn with_replay_window(mut self, window: Option<usize>) -> Self {
        self.replay_window = window;
        self
    }

    /// Record one user/assistant exchange
    pub fn record_exchange(&mut self, input: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(Turn::user(input));
        self.turns.push(Turn::assistant(reply));
        tracing::debug!(memory = self.key, turns = self.turns.len(), "Recorded exchange");
    }

    /// Turns to replay, oldest first, honoring the replay window.
    ///
    /// A window never starts on an assistant turn, so the replayed history
    /// always opens with what the user said.
    pub fn replay(&self) -> Vec<LlmMessage> {
        let mut start = match self.replay_window {
            Some(window) => self.turns.len().saturating_sub(window),
            None => 0,
        };
        while start < self.turns.len() && self.turns[start].speaker == Speaker::Assistant {
            start += 1;
        }
        self.turns[start..].iter().map(Turn::to_message).collect()
    }

    /// Replayed history followed by the current input
    pub fn messages_with(&self, input: &str) -> Vec<LlmMessage> {
        let mut messages = self.replay();
        messages.push(LlmMessage::user(input));
        messages
    }
}

#[cfg(test)]
impl ConversationMemory {
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
