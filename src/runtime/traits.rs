//! Trait abstractions for runtime I/O
//!
//! The console is a trait so sessions can be driven by scripted input in tests.

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

/// Printed before each read
pub const PROMPT: &str = "Human: ";

/// Line-oriented user I/O
#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and read one line; `None` at end of input
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Print one line
    async fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Console over the process's stdin and stdout
pub struct StdioConsole {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl StdioConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }
}

impl Default for StdioConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdioConsole {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.stdout.write_all(prompt.as_bytes()).await?;
        self.stdout.flush().await?;
        self.lines.next_line().await
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.stdout.write_all(line.as_bytes()).await?;
        self.stdout.write_all(b"\n").await?;
        self.stdout.flush().await
    }
}
