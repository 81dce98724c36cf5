//! Working-set rotation engine.
//!
//! Processes one answer at a time: records it, calibrates the target time
//! until a quorum exists, then retires at most one mastered question from
//! the working set and promotes a dormant one in its place.

use rand::Rng;

use crate::calibrator;
use crate::classifier::classify;
use crate::model::{AnswerEvent, SessionState};
use crate::picker::{pick_promotion, DormantBuckets, Promotion};

/// What a single call to [`on_answer`] changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Target time before the answer was processed.
    pub target_before: Option<f64>,
    /// Target time after the answer was processed.
    pub target_after: Option<f64>,
    /// Question retired from the working set.
    pub mastered: Option<usize>,
    /// Question promoted into the working set.
    pub promoted: Option<Promotion>,
}

impl TurnOutcome {
    fn unchanged(target: Option<f64>) -> Self {
        Self {
            target_before: target,
            target_after: target,
            mastered: None,
            promoted: None,
        }
    }

    /// Whether the target time was established or tightened this turn.
    pub fn target_changed(&self) -> bool {
        self.target_before != self.target_after
    }
}

/// The working-set question with the smallest worst time at or under
/// `target`. Ties go to the lowest index.
pub fn removal_candidate(state: &SessionState, target: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for &q in &state.working_set {
        let Some(worst) = classify(&state.history, q).worst_time() else {
            continue;
        };
        if worst > target {
            continue;
        }
        if best.map_or(true, |(_, b)| worst < b) {
            best = Some((q, worst));
        }
    }
    best
}

/// Record an answer and rotate the working set if a question is mastered.
///
/// `duration` is `None` for a turn that needed a retry.
pub fn on_answer<R: Rng + ?Sized>(
    state: &mut SessionState,
    question: usize,
    duration: Option<f64>,
    rng: &mut R,
) -> TurnOutcome {
    let target_before = state.target_time;
    state.history.push(AnswerEvent {
        question,
        duration,
    });

    calibrator::maybe_establish(state);
    let Some(target) = state.target_time else {
        state.log("No change in working set");
        return TurnOutcome::unchanged(None);
    };

    let mut outcome = TurnOutcome {
        target_before,
        target_after: Some(target),
        mastered: None,
        promoted: None,
    };

    let Some((mastered, worst)) = removal_candidate(state, target) else {
        state.log(format!(
            "Not removing any question, all questions in working set are unstable or above target time {target}"
        ));
        return outcome;
    };

    state.log(format!(
        "Removing {}, its time {worst} <= target time {target}",
        state.prompt(mastered)
    ));
    state.working_set.remove(&mastered);

    let buckets = DormantBuckets::collect(state);
    state.log(format!(
        "Finding new question, unanswered: {}, unstable: {}, with times: {}",
        buckets.unanswered.len(),
        buckets.unstable.len(),
        buckets.stable.len()
    ));

    let Some(promotion) = pick_promotion(&buckets, rng) else {
        // The mastered question is dormant now, so this only happens on an
        // inconsistent bank. Put it back rather than shrink the set.
        state.working_set.insert(mastered);
        tracing::warn!("no dormant question available, keeping {mastered}");
        return outcome;
    };

    match promotion {
        Promotion::Unanswered(q) => {
            state.log(format!("Picking unanswered {}", state.prompt(q)));
        }
        Promotion::Unstable(q) => {
            state.log(format!("Picking unstable {}", state.prompt(q)));
        }
        Promotion::Slowest {
            question: q,
            worst_time,
        } => {
            state.log(format!("Picking with worst time {}", state.prompt(q)));
            if worst_time < target {
                state.log(format!("Reducing target time {target} -> {worst_time}"));
                state.target_time = Some(worst_time);
            }
        }
    }
    state.working_set.insert(promotion.question());

    outcome.mastered = Some(mastered);
    outcome.promoted = Some(promotion);
    outcome.target_after = state.target_time;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, WORKING_SET_SIZE};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn bank(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question::new(format!("q{i}"), format!("{i}")))
            .collect()
    }

    fn state(n: usize, working_set: &[usize]) -> SessionState {
        SessionState::new(bank(n), working_set.iter().copied().collect())
    }

    fn stable(state: &mut SessionState, q: usize, times: [f64; 3]) {
        for t in times {
            state.history.push(AnswerEvent::success(q, t));
        }
    }

    #[test]
    fn first_answer_does_not_rotate() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut s = state(100, &[3, 14, 15, 92, 65, 35, 89]);
        let before = s.working_set.clone();

        let outcome = on_answer(&mut s, 14, Some(1.2), &mut rng);

        assert_eq!(s.history.len(), 1);
        assert_eq!(s.working_set, before);
        assert_eq!(s.target_time, None);
        assert!(!outcome.target_changed());
        assert_eq!(outcome.mastered, None);
        assert_eq!(s.log.last().unwrap(), "No change in working set");
    }

    #[test]
    fn quorum_establishes_upper_median() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut s = state(10, &[0, 1, 2]);
        on_answer(&mut s, 0, Some(2.0), &mut rng);
        on_answer(&mut s, 1, Some(3.0), &mut rng);
        assert_eq!(s.target_time, None);

        let outcome = on_answer(&mut s, 2, Some(4.0), &mut rng);
        assert_eq!(s.target_time, Some(3.0));
        assert!(outcome.target_changed());
        // No question has three successes yet.
        assert_eq!(outcome.mastered, None);
    }

    #[test]
    fn smallest_qualifying_worst_time_is_removed() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut s = state(10, &[0, 1, 2]);
        s.target_time = Some(3.0);
        stable(&mut s, 0, [2.5, 1.0, 1.0]);
        stable(&mut s, 1, [2.0, 1.0, 1.0]);
        stable(&mut s, 2, [9.0, 9.0, 9.0]);
        let last = s.history.pop().unwrap();

        let outcome = on_answer(&mut s, last.question, last.duration, &mut rng);

        assert_eq!(outcome.mastered, Some(1));
        assert!(!s.working_set.contains(&1));
        assert_eq!(s.working_set.len(), 3);
        // Dormant questions are all unanswered, so one of them is promoted.
        assert!(matches!(outcome.promoted, Some(Promotion::Unanswered(q)) if q >= 3));
    }

    #[test]
    fn worst_time_equal_to_target_qualifies() {
        let mut s = state(10, &[0, 1]);
        stable(&mut s, 0, [3.0, 1.0, 1.0]);
        assert_eq!(removal_candidate(&s, 3.0), Some((0, 3.0)));
        assert_eq!(removal_candidate(&s, 2.9), None);
    }

    #[test]
    fn nothing_removed_above_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut s = state(10, &[0, 1]);
        s.target_time = Some(1.0);
        stable(&mut s, 0, [2.0, 1.0, 1.0]);
        let before = s.working_set.clone();

        let outcome = on_answer(&mut s, 1, None, &mut rng);

        assert_eq!(outcome.mastered, None);
        assert_eq!(s.working_set, before);
        assert!(s.log.last().unwrap().starts_with("Not removing any question"));
    }

    fn all_dormant_stable(target: f64) -> (SessionState, TurnOutcome) {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        // Working set {0}, dormant {1, 2, 3} with worst times 5, 2, 4.
        let mut s = state(4, &[0]);
        s.target_time = Some(target);
        stable(&mut s, 1, [5.0, 1.0, 1.0]);
        stable(&mut s, 2, [2.0, 1.0, 1.0]);
        stable(&mut s, 3, [4.0, 1.0, 1.0]);
        stable(&mut s, 0, [0.5, 0.5, 0.5]);
        let last = s.history.pop().unwrap();
        let outcome = on_answer(&mut s, last.question, last.duration, &mut rng);
        (s, outcome)
    }

    #[test]
    fn slowest_dormant_is_promoted_without_raising_target() {
        let (s, outcome) = all_dormant_stable(3.0);
        assert_eq!(outcome.mastered, Some(0));
        assert_eq!(
            outcome.promoted,
            Some(Promotion::Slowest {
                question: 1,
                worst_time: 5.0
            })
        );
        assert_eq!(s.target_time, Some(3.0));
        assert!(!outcome.target_changed());
        assert_eq!(s.working_set, [1].into_iter().collect());
    }

    #[test]
    fn slowest_dormant_tightens_a_looser_target() {
        let (s, outcome) = all_dormant_stable(6.0);
        assert_eq!(outcome.promoted.map(|p| p.question()), Some(1));
        assert_eq!(s.target_time, Some(5.0));
        assert!(outcome.target_changed());
        assert!(s.log.iter().any(|l| l == "Reducing target time 6 -> 5"));
    }

    #[test]
    fn unanswered_promoted_before_unstable() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut s = state(4, &[0]);
        s.target_time = Some(3.0);
        s.history.push(AnswerEvent::failure(1));
        s.history.push(AnswerEvent::success(2, 1.0));
        stable(&mut s, 0, [1.0, 1.0, 1.0]);
        let last = s.history.pop().unwrap();

        let outcome = on_answer(&mut s, last.question, last.duration, &mut rng);
        assert_eq!(outcome.promoted, Some(Promotion::Unanswered(3)));
    }

    #[test]
    fn mastered_question_returns_when_bank_is_exhausted() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut s = state(2, &[0, 1]);
        s.target_time = Some(3.0);
        stable(&mut s, 0, [1.0, 1.0, 1.0]);
        let last = s.history.pop().unwrap();

        let outcome = on_answer(&mut s, last.question, last.duration, &mut rng);
        assert_eq!(outcome.mastered, Some(0));
        assert_eq!(outcome.promoted.map(|p| p.question()), Some(0));
        assert_eq!(s.working_set.len(), 2);
        assert_eq!(s.target_time, Some(1.0));
    }

    #[test]
    fn simulated_session_keeps_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut answer_rng = ChaCha8Rng::seed_from_u64(99);
        let initial: Vec<usize> = (0..WORKING_SET_SIZE).map(|i| i * 3).collect();
        let mut s = state(40, &initial);
        let mut previous_target: Option<f64> = None;

        for _ in 0..2000 {
            let q = crate::picker::next_question(&s.working_set, s.last_asked(), &mut rng)
                .unwrap();
            let duration = if answer_rng.gen_bool(0.85) {
                Some(answer_rng.gen_range(0.5..4.0))
            } else {
                None
            };
            on_answer(&mut s, q, duration, &mut rng);

            assert_eq!(s.working_set.len(), WORKING_SET_SIZE);
            if let (Some(prev), Some(now)) = (previous_target, s.target_time) {
                assert!(now <= prev, "target rose from {prev} to {now}");
            }
            if previous_target.is_some() {
                assert!(s.target_time.is_some());
            }
            previous_target = s.target_time;
        }

        assert!(s.target_time.is_some());
        assert!(s.history.iter().any(|e| !initial.contains(&e.question)));
    }
}
