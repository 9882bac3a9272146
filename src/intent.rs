//! Intent classification
//!
//! One model call per classified input. The classifier keeps its own
//! transcript so earlier labels inform later ones.

use crate::branch::BranchKind;
use crate::llm::{LlmError, LlmRequest, LlmService, Sampling};
use crate::memory::ConversationMemory;
use crate::prompts::intent_prompt;
use std::fmt;

/// Purpose of a user's message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    New,
    Edit,
    Cancel,
    Qa,
    Unclear,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::New,
        Intent::Edit,
        Intent::Cancel,
        Intent::Qa,
        Intent::Unclear,
    ];

    /// The bare token the classifier is told to answer with
    pub fn label(self) -> &'static str {
        match self {
            Intent::New => "New",
            Intent::Edit => "Edit",
            Intent::Cancel => "Cancel",
            Intent::Qa => "QA",
            Intent::Unclear => "Unclear",
        }
    }

    /// Parse a model answer. Surrounding whitespace, quotes and periods are
    /// ignored in any order and nesting, as is case; anything else is
    /// unrecognized.
    pub fn from_label(raw: &str) -> Option<Intent> {
        let token =
            raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | '`' | '.'));
        Intent::ALL
            .into_iter()
            .find(|intent| intent.label().eq_ignore_ascii_case(token))
    }

    /// Branch that handles this intent, if any
    pub fn branch(self) -> Option<BranchKind> {
        match self {
            Intent::New => Some(BranchKind::New),
            Intent::Edit => Some(BranchKind::Edit),
            Intent::Cancel => Some(BranchKind::Cancel),
            Intent::Qa | Intent::Unclear => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one classification call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Exactly what the model answered, trimmed
    pub label: String,
    /// Parsed intent; unrecognized answers become `Unclear`
    pub intent: Intent,
}

impl Classification {
    pub fn from_answer(answer: &str) -> Self {
        let label = answer.trim().to_string();
        let intent = Intent::from_label(&label).unwrap_or_else(|| {
            tracing::debug!(label = %label, "Unrecognized intent label, treating as Unclear");
            Intent::Unclear
        });
        Self { label, intent }
    }
}

/// Model-backed classifier with its own transcript
pub struct IntentClassifier {
    memory: ConversationMemory,
    sampling: Sampling,
}

impl IntentClassifier {
    pub fn new(sampling: Sampling, replay_window: Option<usize>) -> Self {
        Self {
            memory: ConversationMemory::new("intent_history").with_replay_window(replay_window),
            sampling,
        }
    }

    #[cfg(test)]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Classify `input` and record the exchange
    pub async fn classify(
        &mut self,
        llm: &dyn LlmService,
        input: &str,
    ) -> Result<Classification, LlmError> {
        let request = LlmRequest::new(
            intent_prompt(input),
            self.memory.messages_with(input),
            self.sampling,
        );
        let response = llm.complete(&request).await?;
        let classification = Classification::from_answer(&response.text());

        self.memory.record_exchange(input, classification.label.clone());
        tracing::info!(
            label = %classification.label,
            intent = %classification.intent,
            "Classified input"
        );
        Ok(classification)
    }
}
