//! Console over stdin/stdout.

use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};

use drillset_core::traits::{Console, TimedAnswer};
use drillset_core::DrillError;

/// Reads answers line by line and times each blocking read.
pub struct StdConsole<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> StdConsole<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

impl<I: BufRead, O: Write> Console for StdConsole<I, O> {
    fn ask(&mut self, prompt: &str) -> Result<TimedAnswer> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let start = Instant::now();
        let mut line = Vec::new();
        let read = self
            .input
            .read_until(b'\n', &mut line)
            .context("failed to read answer")?;
        let elapsed = start.elapsed();

        if read == 0 {
            writeln!(self.output)?;
            return Err(DrillError::InputClosed.into());
        }
        // Undecodable bytes become U+FFFD and fail the answer comparison.
        Ok(TimedAnswer {
            text: String::from_utf8_lossy(&line).into_owned(),
            elapsed,
        })
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()?;
        Ok(())
    }
}
