//! Answer checking and the queue adaptation that follows it.

use rand::Rng;
use tracing::debug;

use crate::session::{SessionState, SessionStateError};

/// Smallest queue position a missed question is put back at.
pub const REINSERT_MIN_OFFSET: usize = 3;
/// Largest queue position a missed question is put back at.
pub const REINSERT_MAX_OFFSET: usize = 8;

/// Outcome of checking one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    /// Queue position of the re-inserted copy, if the question was put back.
    pub reinserted_at: Option<usize>,
}

/// Case-insensitive exact comparison. Whitespace is significant.
#[must_use]
pub fn answers_match(given: &str, expected: &str) -> bool {
    given.to_lowercase() == expected.to_lowercase()
}

/// Score `given` against `expected` for the current question.
///
/// A correct answer counts towards the tally in infinite practice, or when the
/// question had not been seen before. The current question is marked seen
/// either way.
///
/// # Errors
///
/// Returns `SessionStateError::EmptyQueue` if the session is already complete.
pub fn evaluate(
    given: &str,
    expected: &str,
    state: &mut SessionState,
) -> Result<bool, SessionStateError> {
    let current = state.current_question()?;
    let correct = answers_match(given, expected);

    if correct && (state.infinite_practice() || !state.seen().contains(current)) {
        state.record_correct();
    }
    state.mark_seen(current);
    state.set_answer_submitted();

    Ok(correct)
}

/// Put a missed question back into the queue.
///
/// Only finite sessions re-insert; the copy lands at `min(r, queue length)` for
/// `r` drawn uniformly from `REINSERT_MIN_OFFSET..=REINSERT_MAX_OFFSET`.
/// Returns the position used, or `None` when nothing was inserted.
///
/// # Errors
///
/// Returns `SessionStateError::EmptyQueue` if the session is already complete.
pub fn update_queue<R: Rng + ?Sized>(
    state: &mut SessionState,
    correct: bool,
    rng: &mut R,
) -> Result<Option<usize>, SessionStateError> {
    let current = state.current_question()?;
    if correct || state.infinite_practice() {
        return Ok(None);
    }

    let offset = rng.random_range(REINSERT_MIN_OFFSET..=REINSERT_MAX_OFFSET);
    let position = offset.min(state.queue().len());
    state.insert_at(position, current);
    debug!(
        question = %current,
        position,
        queue = state.queue().len(),
        "re-inserted missed question"
    );

    Ok(Some(position))
}

/// Evaluate an answer and adapt the queue in one step.
///
/// # Errors
///
/// Returns `SessionStateError::EmptyQueue` if the session is already complete.
pub fn check_answer<R: Rng + ?Sized>(
    given: &str,
    expected: &str,
    state: &mut SessionState,
    rng: &mut R,
) -> Result<Evaluation, SessionStateError> {
    let correct = evaluate(given, expected, state)?;
    let reinserted_at = update_queue(state, correct, rng)?;
    Ok(Evaluation {
        correct,
        reinserted_at,
    })
}
