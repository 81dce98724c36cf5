//! Core data model types for drillset.
//!
//! The session state is the single record the drill loop owns and persists:
//! the question bank, the working set, the calibrated target time, the
//! append-only answer history and the diagnostic log.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DrillError;

/// Number of questions drilled at the same time.
pub const WORKING_SET_SIZE: usize = 7;

/// A prompt and its expected answer. Identified by its index in the bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Text shown to the user, e.g. `"3 + 4"`.
    pub prompt: String,
    /// Expected answer, compared after trimming whitespace.
    pub answer: String,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }

    /// Whether a line typed by the user answers this question.
    pub fn accepts(&self, input: &str) -> bool {
        input.trim() == self.answer.trim()
    }
}

/// One completed turn for one question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvent {
    /// Index of the question in the bank.
    pub question: usize,
    /// Seconds until the first correct answer, or `None` if the turn needed
    /// at least one retry.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl AnswerEvent {
    pub fn success(question: usize, duration: f64) -> Self {
        Self {
            question,
            duration: Some(duration),
        }
    }

    pub fn failure(question: usize) -> Self {
        Self {
            question,
            duration: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.duration.is_some()
    }
}

/// Mastery of a single question, derived from the history on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MasteryState {
    /// No answer recorded yet.
    Unanswered,
    /// Answered, but not three clean successes in a row.
    Unstable,
    /// The three latest answers were successes; `worst_time` is the slowest.
    Stable { worst_time: f64 },
}

impl MasteryState {
    pub fn worst_time(&self) -> Option<f64> {
        match self {
            MasteryState::Stable { worst_time } => Some(*worst_time),
            _ => None,
        }
    }
}

impl fmt::Display for MasteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasteryState::Unanswered => write!(f, "unanswered"),
            MasteryState::Unstable => write!(f, "unstable"),
            MasteryState::Stable { worst_time } => write!(f, "stable ({worst_time}s)"),
        }
    }
}

/// Everything a session persists between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// The question bank, fixed for the lifetime of the session.
    pub questions: Vec<Question>,
    /// Indices of the questions currently being drilled.
    pub working_set: BTreeSet<usize>,
    /// Calibrated mastery threshold in seconds; `None` until calibrated.
    #[serde(default)]
    pub target_time: Option<f64>,
    /// Append-only answer history, oldest first.
    pub history: Vec<AnswerEvent>,
    /// Human-readable diagnostics, oldest first.
    pub log: Vec<String>,
}

impl SessionState {
    /// A session with an empty history and an uncalibrated target time.
    pub fn new(questions: Vec<Question>, working_set: BTreeSet<usize>) -> Self {
        Self {
            questions,
            working_set,
            target_time: None,
            history: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Append a diagnostic line.
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{line}");
        self.log.push(line);
    }

    /// Prompt text of a question, for diagnostics.
    pub fn prompt(&self, index: usize) -> &str {
        self.questions
            .get(index)
            .map(|q| q.prompt.as_str())
            .unwrap_or("<unknown>")
    }

    /// Bank indices that are not in the working set, ascending.
    pub fn dormant(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.questions.len()).filter(|i| !self.working_set.contains(i))
    }

    /// Index of the question asked on the latest recorded turn.
    pub fn last_asked(&self) -> Option<usize> {
        self.history.last().map(|e| e.question)
    }

    /// Check the structural consistency of a loaded record.
    pub fn validate(&self) -> Result<(), DrillError> {
        let size = self.questions.len();
        if size == 0 {
            return Err(DrillError::InvalidRecord("question bank is empty".into()));
        }
        if self.working_set.is_empty() {
            return Err(DrillError::InvalidRecord("working set is empty".into()));
        }
        if let Some(&idx) = self.working_set.iter().find(|&&i| i >= size) {
            return Err(DrillError::InvalidRecord(format!(
                "working set refers to question {idx}, bank has {size}"
            )));
        }
        for (pos, event) in self.history.iter().enumerate() {
            if event.question >= size {
                return Err(DrillError::InvalidRecord(format!(
                    "history entry {pos} refers to question {}, bank has {size}",
                    event.question
                )));
            }
            if let Some(d) = event.duration {
                if !d.is_finite() || d < 0.0 {
                    return Err(DrillError::InvalidRecord(format!(
                        "history entry {pos} has invalid duration {d}"
                    )));
                }
            }
        }
        if let Some(t) = self.target_time {
            if !t.is_finite() || t < 0.0 {
                return Err(DrillError::InvalidRecord(format!(
                    "invalid target time {t}"
                )));
            }
        }
        Ok(())
    }
}
