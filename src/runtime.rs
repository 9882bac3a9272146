//! Runtime for executing one console session
//!
//! Reads lines, feeds them through the dispatcher and carries out the
//! resulting effects against the model and the console.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{Session, SessionOptions};
pub use traits::StdioConsole;
