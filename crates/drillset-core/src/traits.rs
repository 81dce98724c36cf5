//! The console collaborator the drill session talks through.
//!
//! The binary implements it over stdin/stdout; tests use
//! [`crate::mock::ScriptedConsole`].

use std::time::Duration;

use anyhow::Result;

/// A line typed by the user and how long the blocking read took.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedAnswer {
    /// The line as read, possibly with surrounding whitespace.
    pub text: String,
    /// Wall-clock time between showing the prompt and receiving the line.
    pub elapsed: Duration,
}

/// Line-based user interaction.
pub trait Console {
    /// Show `prompt` without a trailing newline and block for one line.
    ///
    /// Closed input is an error.
    fn ask(&mut self, prompt: &str) -> Result<TimedAnswer>;

    /// Show a full line of text.
    fn say(&mut self, message: &str) -> Result<()>;
}
