//! Mutable per-session state: the delivery queue, seen tracking and counters.

use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use crate::model::{DeliveryConfig, QuestionIndex};
use crate::queue::DeliveryQueue;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("the delivery queue is empty; check completion before asking for a question")]
    EmptyQueue,
}

//
// ─── SEEN TRACKING ─────────────────────────────────────────────────────────────
//

/// Questions presented at least once.
///
/// Finite sessions deduplicate; infinite practice keeps every presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeenQuestions {
    Set(HashSet<QuestionIndex>),
    List(Vec<QuestionIndex>),
}

impl SeenQuestions {
    #[must_use]
    pub fn for_mode(infinite_practice: bool) -> Self {
        if infinite_practice {
            Self::List(Vec::new())
        } else {
            Self::Set(HashSet::new())
        }
    }

    #[must_use]
    pub fn contains(&self, index: QuestionIndex) -> bool {
        match self {
            Self::Set(set) => set.contains(&index),
            Self::List(list) => list.contains(&index),
        }
    }

    /// Number of presentations recorded; duplicates count in list mode.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Set(set) => set.len(),
            Self::List(list) => list.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn record(&mut self, index: QuestionIndex) {
        match self {
            Self::Set(set) => {
                set.insert(index);
            }
            Self::List(list) => list.push(index),
        }
    }
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// State of one running quiz session.
///
/// The front of `queue` is the current question. `question_indices` is the
/// selection the session started with and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    queue: VecDeque<QuestionIndex>,
    question_indices: Vec<QuestionIndex>,
    seen: SeenQuestions,
    n_correct: usize,
    n_questions: usize,
    infinite_practice: bool,
    answer_submitted: bool,
}

impl SessionState {
    #[must_use]
    pub fn new(queue: DeliveryQueue, delivery: &DeliveryConfig) -> Self {
        let (queue, question_indices) = queue.into_parts();
        let mut state = Self {
            queue,
            question_indices,
            seen: SeenQuestions::for_mode(delivery.infinite_practice()),
            n_correct: 0,
            n_questions: 0,
            infinite_practice: delivery.infinite_practice(),
            answer_submitted: false,
        };
        state.reset(delivery);
        state
    }

    /// Reinitialise counters and seen tracking for `delivery`.
    ///
    /// The queue itself is left alone.
    pub fn reset(&mut self, delivery: &DeliveryConfig) {
        self.infinite_practice = delivery.infinite_practice();
        self.seen = SeenQuestions::for_mode(self.infinite_practice);
        self.n_correct = 0;
        self.n_questions = delivery.question_count();
        self.answer_submitted = false;
    }

    /// The question at the front of the queue.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::EmptyQueue` once the session is complete.
    pub fn current_question(&self) -> Result<QuestionIndex, SessionStateError> {
        self.queue
            .front()
            .copied()
            .ok_or(SessionStateError::EmptyQueue)
    }

    /// Drop the current question and clear its per-question flags.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::EmptyQueue` if there is nothing to advance past.
    pub fn advance(&mut self) -> Result<QuestionIndex, SessionStateError> {
        let current = self.queue.pop_front().ok_or(SessionStateError::EmptyQueue)?;
        self.answer_submitted = false;
        Ok(current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    /// Questions still to be done, as counted for progress.
    ///
    /// Finite sessions count starting questions not yet seen. Infinite practice
    /// counts the queue, minus the current entry once it has been answered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        if self.infinite_practice {
            let answered = usize::from(self.answer_submitted && !self.queue.is_empty());
            self.queue.len() - answered
        } else {
            self.question_indices
                .iter()
                .filter(|index| !self.seen.contains(**index))
                .count()
        }
    }

    #[must_use]
    pub fn queue(&self) -> &VecDeque<QuestionIndex> {
        &self.queue
    }

    #[must_use]
    pub fn question_indices(&self) -> &[QuestionIndex] {
        &self.question_indices
    }

    #[must_use]
    pub fn seen(&self) -> &SeenQuestions {
        &self.seen
    }

    #[must_use]
    pub fn n_correct(&self) -> usize {
        self.n_correct
    }

    #[must_use]
    pub fn n_questions(&self) -> usize {
        self.n_questions
    }

    #[must_use]
    pub fn infinite_practice(&self) -> bool {
        self.infinite_practice
    }

    /// True between checking an answer and advancing.
    #[must_use]
    pub fn answer_submitted(&self) -> bool {
        self.answer_submitted
    }

    pub(crate) fn mark_seen(&mut self, index: QuestionIndex) {
        self.seen.record(index);
    }

    pub(crate) fn record_correct(&mut self) {
        self.n_correct += 1;
    }

    pub(crate) fn set_answer_submitted(&mut self) {
        self.answer_submitted = true;
    }

    pub(crate) fn insert_at(&mut self, position: usize, index: QuestionIndex) {
        let position = position.min(self.queue.len());
        self.queue.insert(position, index);
    }
}
