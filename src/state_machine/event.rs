//! Events that drive the dispatcher

use crate::intent::Classification;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A line typed by the user that is not a console command
    UserInput { text: String },
    /// The classifier answered for `text`
    Classified {
        text: String,
        classification: Classification,
    },
    /// `/menu`
    Menu,
    /// `/quit` or end of input
    Quit,
}

impl Event {
    /// Map one console line to an event
    pub fn from_line(line: &str) -> Self {
        match line.trim() {
            "/menu" => Event::Menu,
            "/quit" => Event::Quit,
            _ => Event::UserInput {
                text: line.to_string(),
            },
        }
    }
}
