//! Intent-specific dialogues
//!
//! New, Edit and Cancel are one abstraction parameterized by a system prompt,
//! a memory key and a tool set. Each branch keeps a private transcript; no
//! branch ever sees another branch's turns.

use crate::llm::{ContentBlock, LlmError, LlmMessage, LlmRequest, LlmService, MessageRole, Sampling};
use crate::memory::ConversationMemory;
use crate::prompts::{
    branch_prompt, CANCEL_RESERVATION_PROMPT, EDIT_RESERVATION_PROMPT, NEW_RESERVATION_PROMPT,
};
use crate::tools::{ToolContext, ToolOutput, ToolRegistry};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Function-call round trips allowed before a branch gives up on a turn
pub const MAX_TOOL_ROUNDS: usize = 4;

/// Which dialogue holds the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    New,
    Edit,
    Cancel,
}

impl BranchKind {
    /// Line printed when the conversation enters this branch
    pub fn entry_marker(self) -> &'static str {
        match self {
            BranchKind::New => "entering new",
            BranchKind::Edit => "entering edit",
            BranchKind::Cancel => "cancel",
        }
    }

    pub fn memory_key(self) -> &'static str {
        match self {
            BranchKind::New => "new_chat_history",
            BranchKind::Edit => "edit_chat_history",
            BranchKind::Cancel => "cancel_chat_history",
        }
    }

    pub fn prompt_template(self) -> &'static str {
        match self {
            BranchKind::New => NEW_RESERVATION_PROMPT,
            BranchKind::Edit => EDIT_RESERVATION_PROMPT,
            BranchKind::Cancel => CANCEL_RESERVATION_PROMPT,
        }
    }

    /// Functions this branch is given when tools are enabled
    pub fn tools(self) -> ToolRegistry {
        match self {
            BranchKind::New => ToolRegistry::booking(),
            BranchKind::Edit => ToolRegistry::editing(),
            BranchKind::Cancel => ToolRegistry::cancelling(),
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchKind::New => "new",
            BranchKind::Edit => "edit",
            BranchKind::Cancel => "cancel",
        })
    }
}

/// Opens the note recorded when a turn fails after changing reservations
pub const SAVED_NOTE_PREFIX: &str = "Already saved before the interruption:";

#[derive(Debug, Error)]
pub enum BranchError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Model was still calling functions after {0} rounds")]
    ToolRoundsExhausted(usize),
}

/// A turn that did not reach a final reply
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct TurnFailure {
    #[source]
    pub cause: BranchError,
    /// Results of reservation changes that succeeded before the failure
    pub committed: Vec<String>,
}

impl TurnFailure {
    /// Line describing changes already made, if there were any
    pub fn saved_note(&self) -> Option<String> {
        if self.committed.is_empty() {
            return None;
        }
        Some(format!("{SAVED_NOTE_PREFIX} {}", self.committed.join("; ")))
    }
}

/// One model-backed dialogue with its own transcript
pub struct Branch {
    kind: BranchKind,
    system_prompt: String,
    memory: ConversationMemory,
    tools: ToolRegistry,
    sampling: Sampling,
}

impl Branch {
    pub fn new(
        kind: BranchKind,
        today: NaiveDate,
        tools: ToolRegistry,
        sampling: Sampling,
        replay_window: Option<usize>,
    ) -> Self {
        let system_prompt = branch_prompt(kind.prompt_template(), today, &tools.names());
        Self {
            kind,
            system_prompt,
            memory: ConversationMemory::new(kind.memory_key()).with_replay_window(replay_window),
            tools,
            sampling,
        }
    }

    /// Answer `input`, running any requested functions, and record the
    /// exchange. Function traffic stays out of the transcript. When the turn
    /// fails after a reservation change was saved, the change is recorded in
    /// place of a reply so the next turn knows about it.
    pub async fn respond(
        &mut self,
        llm: &dyn LlmService,
        ctx: &ToolContext,
        input: &str,
    ) -> Result<String, TurnFailure> {
        let mut committed = Vec::new();
        match self.run_turn(llm, ctx, input, &mut committed).await {
            Ok(reply) => {
                self.memory.record_exchange(input, reply.clone());
                Ok(reply)
            }
            Err(cause) => {
                let failure = TurnFailure { cause, committed };
                if let Some(note) = failure.saved_note() {
                    tracing::warn!(
                        branch = %self.kind,
                        changes = failure.committed.len(),
                        error = %failure.cause,
                        "Turn failed after saving reservation changes"
                    );
                    self.memory.record_exchange(input, note);
                }
                Err(failure)
            }
        }
    }

    async fn run_turn(
        &self,
        llm: &dyn LlmService,
        ctx: &ToolContext,
        input: &str,
        committed: &mut Vec<String>,
    ) -> Result<String, BranchError> {
        let mut messages = self.memory.messages_with(input);

        for round in 0..=MAX_TOOL_ROUNDS {
            let request = LlmRequest::new(self.system_prompt.clone(), messages.clone(), self.sampling)
                .with_tools(self.tools.definitions());
            let response = llm.complete(&request).await?;

            let tool_uses = response.tool_uses();
            if tool_uses.is_empty() {
                return Ok(response.text());
            }
            if round == MAX_TOOL_ROUNDS {
                break;
            }

            let mut results = Vec::with_capacity(tool_uses.len());
            for tool_use in tool_uses {
                let output = self
                    .tools
                    .execute(&tool_use.name, tool_use.input.clone(), ctx)
                    .await
                    .unwrap_or_else(|| {
                        tracing::warn!(branch = %self.kind, tool = %tool_use.name, "Model called an unknown function");
                        ToolOutput::error(format!("Unknown function: {}", tool_use.name))
                    });
                tracing::info!(
                    branch = %self.kind,
                    tool = %tool_use.name,
                    success = output.success,
                    "Function call finished"
                );
                if output.success && self.tools.mutates(&tool_use.name) {
                    committed.push(format!("{} {}", tool_use.name, output.output));
                }
                results.push(ContentBlock::tool_result(
                    tool_use.id,
                    output.output,
                    !output.success,
                ));
            }

            messages.push(LlmMessage {
                role: MessageRole::Assistant,
                content: response.content,
            });
            messages.push(LlmMessage {
                role: MessageRole::User,
                content: results,
            });
        }

        Err(BranchError::ToolRoundsExhausted(MAX_TOOL_ROUNDS))
    }
}

#[cfg(test)]
impl Branch {
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }
}
