//! Mastery classification from the answer history.
//!
//! Classification is recency-biased and failure-intolerant: only the latest
//! run of answers for a question counts, and one failure inside it means the
//! question is not mastered no matter what came before.

use crate::model::{AnswerEvent, MasteryState};

/// Number of consecutive successes needed for a question to be stable.
pub const STABLE_STREAK: usize = 3;

/// Classify one question by scanning the history from newest to oldest.
pub fn classify(history: &[AnswerEvent], question: usize) -> MasteryState {
    let mut seen = 0usize;
    let mut worst = 0.0f64;

    for event in history.iter().rev().filter(|e| e.question == question) {
        let Some(duration) = event.duration else {
            return MasteryState::Unstable;
        };
        worst = if seen == 0 { duration } else { worst.max(duration) };
        seen += 1;
        if seen == STABLE_STREAK {
            return MasteryState::Stable { worst_time: worst };
        }
    }

    if seen == 0 {
        MasteryState::Unanswered
    } else {
        MasteryState::Unstable
    }
}
