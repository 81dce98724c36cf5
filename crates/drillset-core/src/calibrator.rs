//! Target-time calibration.
//!
//! The target time is established once from the first successful answer of
//! every working-set question and only ever tightened afterwards.

use crate::model::{AnswerEvent, SessionState};

/// Upper median: the element at `len / 2` after ordering. Even-length inputs
/// are not averaged.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    let mid = sorted.len() / 2;
    let (_, median, _) = sorted.select_nth_unstable_by(mid, f64::total_cmp);
    Some(*median)
}

/// Duration of the earliest successful answer for a question.
pub fn first_success(history: &[AnswerEvent], question: usize) -> Option<f64> {
    history
        .iter()
        .filter(|e| e.question == question)
        .find_map(|e| e.duration)
}

/// Establish the target time if every working-set question has a first
/// success. Does nothing once a target time exists.
///
/// Returns `true` if the target time was set by this call.
pub fn maybe_establish(state: &mut SessionState) -> bool {
    if state.target_time.is_some() || state.working_set.is_empty() {
        return false;
    }

    let times: Vec<f64> = state
        .working_set
        .iter()
        .filter_map(|&q| first_success(&state.history, q))
        .collect();

    if times.len() < state.working_set.len() {
        let collected = times
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        state.log(format!(
            "Couldn't establish target time, first times in working set so far: {collected}"
        ));
        return false;
    }

    match upper_median(&times) {
        Some(median) => {
            state.target_time = Some(median);
            state.log(format!("Established target time at median: {median}"));
            true
        }
        None => false,
    }
}
