//! Dispatcher state types

use crate::branch::BranchKind;
use std::fmt;
use std::str::FromStr;

/// Marker printed when a label has no branch
pub const DEFAULT_MARKER: &str = "entering default";
/// Printed after `/menu`
pub const MENU_MARKER: &str = "back to menu";

/// Where the next input goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Next input is classified first
    Classifying,
    /// Inputs go to this branch
    InBranch { branch: BranchKind },
    /// Terminal; no further events are accepted
    Done,
}

impl DispatchState {
    pub fn branch(&self) -> Option<BranchKind> {
        match self {
            DispatchState::InBranch { branch } => Some(*branch),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchState::Done)
    }
}

/// What happens to input once a branch holds the conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BranchExit {
    /// Stay in the branch until `/menu`
    #[default]
    Sticky,
    /// Classify every input; a different booking label switches branch
    Reclassify,
}

impl FromStr for BranchExit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sticky" => Ok(BranchExit::Sticky),
            "reclassify" => Ok(BranchExit::Reclassify),
            other => Err(format!(
                "unknown branch exit policy '{other}' (expected sticky or reclassify)"
            )),
        }
    }
}

impl fmt::Display for BranchExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BranchExit::Sticky => "sticky",
            BranchExit::Reclassify => "reclassify",
        })
    }
}

/// Fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchContext {
    /// Without a classifier every input goes to the New branch
    pub routed: bool,
    pub branch_exit: BranchExit,
}

impl DispatchContext {
    pub fn routed(branch_exit: BranchExit) -> Self {
        Self {
            routed: true,
            branch_exit,
        }
    }

    /// Single booking dialogue, no classifier
    pub fn direct() -> Self {
        Self {
            routed: false,
            branch_exit: BranchExit::Sticky,
        }
    }

    pub fn initial_state(&self) -> DispatchState {
        if self.routed {
            DispatchState::Classifying
        } else {
            DispatchState::InBranch {
                branch: BranchKind::New,
            }
        }
    }
}
