//! Question selection: what to ask next, and what to promote from the
//! dormant pool when a working-set question is mastered.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::classifier::classify;
use crate::model::{MasteryState, SessionState};

/// Pick the next question uniformly from the working set, never repeating
/// `last_asked` unless it is the only member.
pub fn next_question<R: Rng + ?Sized>(
    working_set: &BTreeSet<usize>,
    last_asked: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    let candidates: Vec<usize> = if working_set.len() > 1 {
        working_set
            .iter()
            .copied()
            .filter(|&q| Some(q) != last_asked)
            .collect()
    } else {
        working_set.iter().copied().collect()
    };
    candidates.choose(rng).copied()
}

/// Which bucket a promoted question came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Promotion {
    /// Never answered.
    Unanswered(usize),
    /// Answered, not stable.
    Unstable(usize),
    /// Stable; the slowest one is promoted.
    Slowest { question: usize, worst_time: f64 },
}

impl Promotion {
    pub fn question(&self) -> usize {
        match self {
            Promotion::Unanswered(q) | Promotion::Unstable(q) => *q,
            Promotion::Slowest { question, .. } => *question,
        }
    }
}

/// Dormant questions partitioned by mastery.
#[derive(Debug, Default)]
pub struct DormantBuckets {
    pub unanswered: Vec<usize>,
    pub unstable: Vec<usize>,
    pub stable: Vec<(usize, f64)>,
}

impl DormantBuckets {
    pub fn collect(state: &SessionState) -> Self {
        let mut buckets = Self::default();
        for q in state.dormant() {
            match classify(&state.history, q) {
                MasteryState::Unanswered => buckets.unanswered.push(q),
                MasteryState::Unstable => buckets.unstable.push(q),
                MasteryState::Stable { worst_time } => buckets.stable.push((q, worst_time)),
            }
        }
        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.unanswered.is_empty() && self.unstable.is_empty() && self.stable.is_empty()
    }
}

/// Choose the dormant question to promote.
///
/// Unanswered questions win over unstable ones, which win over stable ones.
/// Within the first two buckets the pick is uniform; among stable questions
/// the one with the largest worst time is taken, the highest index winning a
/// tie.
pub fn pick_promotion<R: Rng + ?Sized>(buckets: &DormantBuckets, rng: &mut R) -> Option<Promotion> {
    if let Some(&q) = buckets.unanswered.choose(rng) {
        return Some(Promotion::Unanswered(q));
    }
    if let Some(&q) = buckets.unstable.choose(rng) {
        return Some(Promotion::Unstable(q));
    }
    buckets
        .stable
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(question, worst_time)| Promotion::Slowest {
            question,
            worst_time,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn next_question_never_repeats() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ws = set(&[1, 4, 9]);
        let mut last = None;
        for _ in 0..500 {
            let q = next_question(&ws, last, &mut rng).unwrap();
            assert!(ws.contains(&q));
            assert_ne!(Some(q), last);
            last = Some(q);
        }
    }

    #[test]
    fn next_question_covers_the_working_set() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ws = set(&[0, 1, 2, 3, 4, 5, 6]);
        let mut seen = BTreeSet::new();
        for _ in 0..500 {
            seen.insert(next_question(&ws, Some(3), &mut rng).unwrap());
        }
        assert_eq!(seen, set(&[0, 1, 2, 4, 5, 6]));
    }

    #[test]
    fn single_member_is_always_asked() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let ws = set(&[5]);
        assert_eq!(next_question(&ws, Some(5), &mut rng), Some(5));
        assert_eq!(next_question(&BTreeSet::new(), None, &mut rng), None);
    }

    #[test]
    fn unanswered_bucket_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let buckets = DormantBuckets {
            unanswered: vec![8],
            unstable: vec![2, 3],
            stable: vec![(4, 9.0)],
        };
        assert_eq!(
            pick_promotion(&buckets, &mut rng),
            Some(Promotion::Unanswered(8))
        );
    }

    #[test]
    fn unstable_bucket_before_stable() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let buckets = DormantBuckets {
            unanswered: vec![],
            unstable: vec![2],
            stable: vec![(4, 9.0)],
        };
        assert_eq!(
            pick_promotion(&buckets, &mut rng),
            Some(Promotion::Unstable(2))
        );
    }

    #[test]
    fn slowest_stable_question_is_promoted() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let buckets = DormantBuckets {
            unanswered: vec![],
            unstable: vec![],
            stable: vec![(0, 5.0), (1, 2.0), (2, 4.0)],
        };
        assert_eq!(
            pick_promotion(&buckets, &mut rng),
            Some(Promotion::Slowest {
                question: 0,
                worst_time: 5.0
            })
        );
    }

    #[test]
    fn stable_tie_takes_highest_index() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let buckets = DormantBuckets {
            unanswered: vec![],
            unstable: vec![],
            stable: vec![(3, 5.0), (6, 5.0), (7, 1.0)],
        };
        assert_eq!(pick_promotion(&buckets, &mut rng).map(|p| p.question()), Some(6));
    }

    #[test]
    fn empty_buckets_pick_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let buckets = DormantBuckets::default();
        assert!(buckets.is_empty());
        assert_eq!(pick_promotion(&buckets, &mut rng), None);
    }
}
