//! Dispatch state machine
//!
//! Pure transitions from (state, event) to (new state, effects). All model
//! calls and console output happen in the runtime that executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{BranchExit, DispatchContext, DispatchState};
pub use transition::{transition, TransitionError};
