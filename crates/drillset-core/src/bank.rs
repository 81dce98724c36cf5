//! Question banks.
//!
//! A session's bank is either the built-in addition table or a TOML file:
//!
//! ```toml
//! [bank]
//! name = "Capitals"
//!
//! [[questions]]
//! prompt = "France"
//! answer = "Paris"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::DrillError;
use crate::model::Question;

/// Intermediate TOML structure for bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    bank: Option<TomlBankHeader>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    prompt: String,
    answer: String,
}

/// All sums `i + j` for `i, j` in `1..=10`, row by row.
pub fn default_bank() -> Vec<Question> {
    let mut questions = Vec::with_capacity(100);
    for i in 1..=10 {
        for j in 1..=10 {
            questions.push(Question::new(format!("{i} + {j}"), (i + j).to_string()));
        }
    }
    questions
}

/// Load a bank from a TOML file.
pub fn load_bank(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;
    parse_bank_str(&content, path)
}

/// Parse a TOML bank from a string (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<Vec<Question>> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    if let Some(header) = &parsed.bank {
        tracing::debug!(
            "loaded bank '{}' with {} questions",
            header.name,
            parsed.questions.len()
        );
    }

    Ok(parsed
        .questions
        .into_iter()
        .map(|q| Question::new(q.prompt, q.answer))
        .collect())
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct BankWarning {
    /// Index of the offending question.
    pub question: usize,
    /// Warning message.
    pub message: String,
}

/// Check that a bank can fill a working set of `working_set_size`, and
/// collect warnings for questions that will be awkward to drill.
pub fn validate_bank(
    questions: &[Question],
    working_set_size: usize,
) -> Result<Vec<BankWarning>, DrillError> {
    if questions.len() < working_set_size.max(1) {
        return Err(DrillError::BankTooSmall {
            size: questions.len(),
            required: working_set_size.max(1),
        });
    }

    let mut warnings = Vec::new();

    let mut seen = std::collections::HashSet::new();
    for (i, q) in questions.iter().enumerate() {
        if !seen.insert(q.prompt.trim()) {
            warnings.push(BankWarning {
                question: i,
                message: format!("duplicate prompt: {}", q.prompt),
            });
        }
    }

    for (i, q) in questions.iter().enumerate() {
        if q.prompt.trim().is_empty() {
            warnings.push(BankWarning {
                question: i,
                message: "prompt is empty".into(),
            });
        }
        if q.answer.trim().is_empty() {
            warnings.push(BankWarning {
                question: i,
                message: "answer is empty".into(),
            });
        }
    }

    Ok(warnings)
}
