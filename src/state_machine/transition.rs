//! Pure state transition function

use super::state::{DEFAULT_MARKER, MENU_MARKER};
use super::{BranchExit, DispatchContext, DispatchState, Effect, Event};
use crate::branch::BranchKind;
use crate::intent::Classification;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DispatchState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DispatchState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Session has ended")]
    SessionEnded,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs this always produces the same outputs and performs
/// no I/O.
pub fn transition(
    state: &DispatchState,
    context: &DispatchContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        (DispatchState::Done, _) => Err(TransitionError::SessionEnded),

        (_, Event::Quit) => Ok(TransitionResult::new(DispatchState::Done).with_effect(Effect::Exit)),

        // Only one dialogue exists without a classifier
        (_, Event::Menu) if !context.routed => Ok(TransitionResult::new(*state)),

        (_, Event::Menu) => {
            Ok(TransitionResult::new(DispatchState::Classifying).with_effect(Effect::print(MENU_MARKER)))
        }

        (DispatchState::Classifying, Event::UserInput { text }) => {
            Ok(TransitionResult::new(DispatchState::Classifying).with_effect(Effect::Classify { text }))
        }

        (DispatchState::Classifying, Event::Classified { text, classification }) => {
            Ok(route_from_menu(text, &classification))
        }

        (DispatchState::InBranch { branch }, Event::UserInput { text }) => {
            if context.routed && context.branch_exit == BranchExit::Reclassify {
                Ok(TransitionResult::new(*state).with_effect(Effect::Classify { text }))
            } else {
                Ok(TransitionResult::new(*state).with_effect(Effect::converse(branch, text)))
            }
        }

        (DispatchState::InBranch { branch }, Event::Classified { text, classification })
            if context.routed && context.branch_exit == BranchExit::Reclassify =>
        {
            Ok(reroute(branch, text, &classification))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in state {state:?}"
        ))),
    }
}

fn route_from_menu(text: String, classification: &Classification) -> TransitionResult {
    let label = Effect::print(classification.label.clone());
    match classification.intent.branch() {
        Some(branch) => TransitionResult::new(DispatchState::InBranch { branch }).with_effects([
            label,
            Effect::print(branch.entry_marker()),
            Effect::converse(branch, text),
        ]),
        None => TransitionResult::new(DispatchState::Classifying)
            .with_effects([label, Effect::print(DEFAULT_MARKER)]),
    }
}

fn reroute(current: BranchKind, text: String, classification: &Classification) -> TransitionResult {
    let label = Effect::print(classification.label.clone());
    match classification.intent.branch() {
        Some(branch) if branch != current => {
            TransitionResult::new(DispatchState::InBranch { branch }).with_effects([
                label,
                Effect::print(branch.entry_marker()),
                Effect::converse(branch, text),
            ])
        }
        _ => TransitionResult::new(DispatchState::InBranch { branch: current })
            .with_effects([label, Effect::converse(current, text)]),
    }
}
