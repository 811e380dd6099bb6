//! Initial delivery queue construction.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::{SliceRandom, index};
use thiserror::Error;
use tracing::debug;

use crate::model::{DeliveryConfig, QuestionIndex, Selection};

/// Length of an infinite-practice queue.
///
/// Stands in for "unbounded": a session would need 100,000 answers to run dry.
pub const INFINITE_QUEUE_LEN: usize = 100_000;

/// The selection is repeated until the pool holds at least this many entries,
/// then shuffled and cut down to [`INFINITE_QUEUE_LEN`].
const INFINITE_POOL_LEN: usize = 110_000;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Not enough questions for the requested delivery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueueError {
    #[error("no questions match the current filters")]
    NoEligibleQuestions,

    #[error("not enough questions for these filters: {requested} requested, {available} eligible")]
    InsufficientQuestions { requested: usize, available: usize },
}

//
// ─── QUEUE ─────────────────────────────────────────────────────────────────────
//

/// A freshly built queue together with the selection it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryQueue {
    queue: VecDeque<QuestionIndex>,
    snapshot: Vec<QuestionIndex>,
}

impl DeliveryQueue {
    /// Assemble a queue from an explicit order, bypassing selection and shuffling.
    #[must_use]
    pub fn from_parts(queue: VecDeque<QuestionIndex>, snapshot: Vec<QuestionIndex>) -> Self {
        Self { queue, snapshot }
    }

    /// Presentation order; the front is the first question asked.
    #[must_use]
    pub fn queue(&self) -> &VecDeque<QuestionIndex> {
        &self.queue
    }

    /// The selected questions before shuffling or practice expansion.
    #[must_use]
    pub fn snapshot(&self) -> &[QuestionIndex] {
        &self.snapshot
    }

    #[must_use]
    pub fn into_parts(self) -> (VecDeque<QuestionIndex>, Vec<QuestionIndex>) {
        (self.queue, self.snapshot)
    }
}

/// Build the delivery queue for `eligible` questions.
///
/// Range delivery takes `eligible[start..end]`; random delivery draws `count`
/// distinct questions. Infinite practice expands the selection to
/// [`INFINITE_QUEUE_LEN`] entries. The returned queue is always shuffled.
///
/// # Errors
///
/// Returns `QueueError::NoEligibleQuestions` if `eligible` is empty and
/// `QueueError::InsufficientQuestions` if the range end or random count exceeds it.
pub fn build_queue<R: Rng + ?Sized>(
    eligible: &[QuestionIndex],
    delivery: &DeliveryConfig,
    rng: &mut R,
) -> Result<DeliveryQueue, QueueError> {
    if eligible.is_empty() {
        return Err(QueueError::NoEligibleQuestions);
    }

    let selected = select(eligible, delivery.selection(), rng)?;
    let snapshot = selected.clone();

    let mut queue = if delivery.infinite_practice() {
        expand_for_practice(&selected, rng)
    } else {
        selected
    };
    queue.shuffle(rng);

    debug!(
        eligible = eligible.len(),
        selected = snapshot.len(),
        queue = queue.len(),
        infinite = delivery.infinite_practice(),
        "built delivery queue"
    );

    Ok(DeliveryQueue {
        queue: queue.into(),
        snapshot,
    })
}

fn select<R: Rng + ?Sized>(
    eligible: &[QuestionIndex],
    selection: Selection,
    rng: &mut R,
) -> Result<Vec<QuestionIndex>, QueueError> {
    let available = eligible.len();
    match selection {
        Selection::Range { start, end } => {
            if end > available {
                return Err(QueueError::InsufficientQuestions {
                    requested: end,
                    available,
                });
            }
            Ok(eligible[start..end].to_vec())
        }
        Selection::Random { count } => {
            if count > available {
                return Err(QueueError::InsufficientQuestions {
                    requested: count,
                    available,
                });
            }
            Ok(index::sample(rng, available, count)
                .into_iter()
                .map(|i| eligible[i])
                .collect())
        }
    }
}

fn expand_for_practice<R: Rng + ?Sized>(
    selected: &[QuestionIndex],
    rng: &mut R,
) -> Vec<QuestionIndex> {
    let repeats = INFINITE_POOL_LEN.div_ceil(selected.len().max(1));
    let mut pool = Vec::with_capacity(repeats * selected.len());
    for _ in 0..repeats {
        pool.extend_from_slice(selected);
    }
    pool.shuffle(rng);
    pool.truncate(INFINITE_QUEUE_LEN);
    pool
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeSet, HashMap};

    fn eligible(n: usize) -> Vec<QuestionIndex> {
        (0..n).map(|i| QuestionIndex::new(i * 2)).collect()
    }

    fn sorted(indices: impl IntoIterator<Item = QuestionIndex>) -> Vec<usize> {
        let mut values: Vec<_> = indices.into_iter().map(|i| i.value()).collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn range_takes_slice_of_eligible_list() {
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_queue(&eligible(10), &DeliveryConfig::range(0, 3).unwrap(), &mut rng)
            .unwrap();

        assert_eq!(sorted(built.queue().iter().copied()), vec![0, 2, 4]);
        assert_eq!(
            built.snapshot(),
            &[QuestionIndex::new(0), QuestionIndex::new(2), QuestionIndex::new(4)]
        );
    }

    #[test]
    fn range_past_eligible_end_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_queue(&eligible(10), &DeliveryConfig::range(0, 11).unwrap(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::InsufficientQuestions {
                requested: 11,
                available: 10
            }
        );
    }

    #[test]
    fn range_ending_exactly_at_eligible_end_is_fine() {
        let mut rng = StdRng::seed_from_u64(7);
        let built = build_queue(&eligible(4), &DeliveryConfig::range(2, 4).unwrap(), &mut rng)
            .unwrap();
        assert_eq!(sorted(built.queue().iter().copied()), vec![4, 6]);
    }

    #[test]
    fn random_draws_distinct_eligible_questions() {
        let pool = eligible(10);
        let allowed: BTreeSet<_> = pool.iter().copied().collect();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let built = build_queue(&pool, &DeliveryConfig::random(4).unwrap(), &mut rng).unwrap();
            let drawn: BTreeSet<_> = built.queue().iter().copied().collect();
            assert_eq!(built.queue().len(), 4);
            assert_eq!(drawn.len(), 4);
            assert!(drawn.is_subset(&allowed));
        }
    }

    #[test]
    fn random_count_above_eligible_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_queue(&eligible(3), &DeliveryConfig::random(4).unwrap(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::InsufficientQuestions {
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn empty_eligible_list_is_reported() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_queue(&[], &DeliveryConfig::random(1).unwrap(), &mut rng).unwrap_err();
        assert_eq!(err, QueueError::NoEligibleQuestions);
    }

    #[test]
    fn queue_order_is_shuffled_in_range_mode() {
        let pool = eligible(20);
        let config = DeliveryConfig::range(0, 20).unwrap();
        let orders: BTreeSet<Vec<QuestionIndex>> = (0..10)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                build_queue(&pool, &config, &mut rng)
                    .unwrap()
                    .queue()
                    .iter()
                    .copied()
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
        assert!(!orders.contains(&pool));
    }

    #[test]
    fn same_seed_builds_same_queue() {
        let pool = eligible(10);
        let config = DeliveryConfig::random(5).unwrap();
        let a = build_queue(&pool, &config, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = build_queue(&pool, &config, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn infinite_practice_fills_the_bounded_queue() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = DeliveryConfig::range(0, 3)
            .unwrap()
            .with_infinite_practice(true);
        let built = build_queue(&eligible(5), &config, &mut rng).unwrap();

        assert_eq!(built.queue().len(), INFINITE_QUEUE_LEN);
        assert_eq!(built.snapshot().len(), 3);

        let mut counts: HashMap<QuestionIndex, usize> = HashMap::new();
        for index in built.queue() {
            *counts.entry(*index).or_default() += 1;
        }
        assert_eq!(sorted(counts.keys().copied()), vec![0, 2, 4]);
        // 110,001 pooled entries (36,667 each) are cut to 100,000.
        assert!(counts.values().all(|&n| n > 30_000 && n <= 36_667));
    }

    #[test]
    fn infinite_practice_with_one_question_repeats_it() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = DeliveryConfig::random(1)
            .unwrap()
            .with_infinite_practice(true);
        let built = build_queue(&eligible(1), &config, &mut rng).unwrap();
        assert_eq!(built.queue().len(), INFINITE_QUEUE_LEN);
        assert!(built.queue().iter().all(|i| *i == QuestionIndex::new(0)));
    }
}
