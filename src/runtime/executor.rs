//! Session executor
//!
//! Owns everything one conversation needs and runs the read, transition,
//! execute loop until the user quits or input ends.

use super::traits::{Console, PROMPT};
use crate::branch::{Branch, BranchError, BranchKind};
use crate::config::Variant;
use crate::intent::IntentClassifier;
use crate::inventory::SeatInventory;
use crate::llm::{LlmError, LlmService, Sampling};
use crate::state_machine::{
    transition, BranchExit, DispatchContext, DispatchState, Effect, Event, TransitionError,
};
use crate::tools::{ToolContext, ToolRegistry};
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Shown when a model call could not be completed
pub const APOLOGY: &str = "Sorry, I couldn't reach the reservation assistant. Please try again.";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Model provider rejected the request: {0}")]
    Provider(#[source] LlmError),
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Per-session settings
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub variant: Variant,
    pub branch_exit: BranchExit,
    pub sampling: Sampling,
    pub replay_window: Option<usize>,
    /// Date the prompts are anchored to
    pub today: NaiveDate,
}

/// The three dialogues of a session
struct Branches {
    new: Branch,
    edit: Branch,
    cancel: Branch,
}

impl Branches {
    fn build(options: &SessionOptions) -> Self {
        let make = |kind: BranchKind| {
            let tools = if options.variant.uses_tools() {
                kind.tools()
            } else {
                ToolRegistry::empty()
            };
            Branch::new(kind, options.today, tools, options.sampling, options.replay_window)
        };
        Self {
            new: make(BranchKind::New),
            edit: make(BranchKind::Edit),
            cancel: make(BranchKind::Cancel),
        }
    }

    #[cfg(test)]
    fn get(&self, kind: BranchKind) -> &Branch {
        match kind {
            BranchKind::New => &self.new,
            BranchKind::Edit => &self.edit,
            BranchKind::Cancel => &self.cancel,
        }
    }

    fn get_mut(&mut self, kind: BranchKind) -> &mut Branch {
        match kind {
            BranchKind::New => &mut self.new,
            BranchKind::Edit => &mut self.edit,
            BranchKind::Cancel => &mut self.cancel,
        }
    }
}

/// One user's conversation with the assistant
pub struct Session<C: Console> {
    llm: Arc<dyn LlmService>,
    console: C,
    context: DispatchContext,
    state: DispatchState,
    classifier: IntentClassifier,
    branches: Branches,
    tools: ToolContext,
}

impl<C: Console> Session<C> {
    pub fn new(
        llm: Arc<dyn LlmService>,
        console: C,
        inventory: Arc<SeatInventory>,
        options: SessionOptions,
    ) -> Self {
        let context = if options.variant.routed() {
            DispatchContext::routed(options.branch_exit)
        } else {
            DispatchContext::direct()
        };
        Self {
            llm,
            console,
            context,
            state: context.initial_state(),
            classifier: IntentClassifier::new(options.sampling, options.replay_window),
            branches: Branches::build(&options),
            tools: ToolContext::new(uuid::Uuid::new_v4().to_string(), inventory),
        }
    }

    pub fn id(&self) -> &str {
        &self.tools.session_id
    }

    /// Run until `/quit` or end of input. Only provider rejections and
    /// console failures end the session early.
    pub async fn run(&mut self) -> Result<(), SessionError> {
        tracing::info!(
            session_id = %self.id(),
            model = %self.llm.model_id(),
            state = ?self.state,
            "Session started"
        );

        while !self.state.is_terminal() {
            let event = match self.console.read_line(PROMPT).await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => Event::from_line(&line),
                None => Event::Quit,
            };
            self.handle_event(event).await?;
        }

        tracing::info!(session_id = %self.id(), "Session ended");
        Ok(())
    }

    /// Apply one event and everything it leads to
    async fn handle_event(&mut self, event: Event) -> Result<(), SessionError> {
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            let result = transition(&self.state, &self.context, event)?;
            if result.new_state != self.state {
                tracing::debug!(from = ?self.state, to = ?result.new_state, "State changed");
            }
            self.state = result.new_state;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect).await? {
                    pending.push_back(next);
                }
            }
        }
        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, SessionError> {
        match effect {
            Effect::Classify { text } => {
                match self.classifier.classify(self.llm.as_ref(), &text).await {
                    Ok(classification) => Ok(Some(Event::Classified {
                        text,
                        classification,
                    })),
                    Err(e) => {
                        self.recover(e).await?;
                        Ok(None)
                    }
                }
            }
            Effect::Print { line } => {
                self.console.write_line(&line).await?;
                Ok(None)
            }
            Effect::Converse { branch, text } => {
                let reply = self
                    .branches
                    .get_mut(branch)
                    .respond(self.llm.as_ref(), &self.tools, &text)
                    .await;
                let failure = match reply {
                    Ok(reply) => {
                        self.console.write_line(&reply).await?;
                        return Ok(None);
                    }
                    Err(failure) => failure,
                };
                // The user hears about saved changes even if the session ends
                if let Some(note) = failure.saved_note() {
                    self.console.write_line(&note).await?;
                }
                match failure.cause {
                    BranchError::Llm(e) => self.recover(e).await?,
                    e @ BranchError::ToolRoundsExhausted(_) => {
                        tracing::warn!(branch = %branch, error = %e, "Branch turn abandoned");
                        self.console.write_line(APOLOGY).await?;
                    }
                }
                Ok(None)
            }
            Effect::Exit => Ok(None),
        }
    }

    /// Fatal provider errors end the session; anything else is apologized
    /// for and the session carries on in its current state.
    async fn recover(&mut self, error: LlmError) -> Result<(), SessionError> {
        if error.kind.is_fatal() {
            tracing::error!(kind = ?error.kind, error = %error, "Model provider rejected the request");
            return Err(SessionError::Provider(error));
        }
        tracing::warn!(kind = ?error.kind, error = %error, "Model call failed");
        self.console.write_line(APOLOGY).await?;
        Ok(())
    }
}

#[cfg(test)]
impl<C: Console> Session<C> {
    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn branch(&self, kind: BranchKind) -> &Branch {
        self.branches.get(kind)
    }
}
