//! Effects produced by state transitions

use crate::branch::BranchKind;

/// Work for the runtime to carry out after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the classifier about `text`, then feed back `Event::Classified`
    Classify { text: String },
    /// Print a line to the console
    Print { line: String },
    /// Hand `text` to a branch and print its reply
    Converse { branch: BranchKind, text: String },
    /// Stop reading input
    Exit,
}

impl Effect {
    pub fn print(line: impl Into<String>) -> Self {
        Effect::Print { line: line.into() }
    }

    pub fn converse(branch: BranchKind, text: impl Into<String>) -> Self {
        Effect::Converse {
            branch,
            text: text.into(),
        }
    }
}
