//! Scripted console for testing.

use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;

use crate::error::DrillError;
use crate::traits::{Console, TimedAnswer};

/// How a scripted answer is produced.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Type exactly this text after the given delay.
    Text(String, Duration),
    /// Type the expected answer of whatever was asked, after the delay.
    Correct(Duration),
    /// Type something that matches no question.
    Wrong,
}

/// A console that replays scripted answers and records everything shown.
///
/// `Correct` replies need the expected answers, so the console is built with
/// a lookup from prompt text to answer.
pub struct ScriptedConsole {
    replies: VecDeque<Reply>,
    answers: Vec<(String, String)>,
    /// Every prompt passed to `ask`, in order.
    pub prompts: Vec<String>,
    /// Every line passed to `say`, in order.
    pub lines: Vec<String>,
}

impl ScriptedConsole {
    /// Create a console for a bank given as `(prompt, answer)` pairs.
    pub fn new(answers: Vec<(String, String)>, replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            answers,
            prompts: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Number of replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    fn answer_for(&self, prompt: &str) -> Option<&str> {
        // Prompts look like "[Think again, ]<question> = ".
        let question = prompt
            .strip_prefix("Think again, ")
            .unwrap_or(prompt)
            .strip_suffix(" = ")
            .unwrap_or(prompt);
        self.answers
            .iter()
            .find(|(p, _)| p == question)
            .map(|(_, a)| a.as_str())
    }
}

impl Console for ScriptedConsole {
    fn ask(&mut self, prompt: &str) -> Result<TimedAnswer> {
        self.prompts.push(prompt.to_string());
        let reply = self.replies.pop_front().ok_or(DrillError::InputClosed)?;
        let answer = match reply {
            Reply::Text(text, elapsed) => TimedAnswer { text, elapsed },
            Reply::Correct(elapsed) => {
                let text = self
                    .answer_for(prompt)
                    .ok_or_else(|| anyhow::anyhow!("no scripted answer for prompt '{prompt}'"))?
                    .to_string();
                TimedAnswer { text, elapsed }
            }
            Reply::Wrong => TimedAnswer {
                text: "\u{1}wrong\u{1}".to_string(),
                elapsed: Duration::from_millis(100),
            },
        };
        Ok(answer)
    }

    fn say(&mut self, message: &str) -> Result<()> {
        self.lines.push(message.to_string());
        Ok(())
    }
}
