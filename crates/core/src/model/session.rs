use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::progress::{self, AccuracyTier};
use crate::session::SessionState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// Aggregate summary for a finished quiz session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    question_count: usize,
    answered: usize,
    correct: usize,
    accuracy: f64,
    accuracy_tier: Option<AccuracyTier>,
}

impl SessionSummary {
    /// Build a summary from the final session state.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn from_state(
        state: &SessionState,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        let report = progress::progress(state);

        Ok(Self {
            started_at,
            completed_at,
            question_count: report.total_count,
            answered: report.n_seen,
            correct: report.n_correct,
            accuracy: report.accuracy_fraction,
            accuracy_tier: report.accuracy_tier,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Distinct questions the session targeted.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Answers checked, counting repeated questions once in finite mode.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[must_use]
    pub fn accuracy_tier(&self) -> Option<AccuracyTier> {
        self.accuracy_tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator;
    use crate::model::{DeliveryConfig, QuestionIndex};
    use crate::queue::DeliveryQueue;
    use crate::time::fixed_now;

    fn two_question_state() -> SessionState {
        let indices = vec![QuestionIndex::new(0), QuestionIndex::new(1)];
        let queue = DeliveryQueue::from_parts(indices.clone().into(), indices);
        SessionState::new(queue, &DeliveryConfig::range(0, 2).unwrap())
    }

    #[test]
    fn summary_counts_first_answers() {
        let mut state = two_question_state();
        evaluator::evaluate("merel", "Merel", &mut state).unwrap();
        state.advance().unwrap();
        evaluator::evaluate("koolmees", "Roodborst", &mut state).unwrap();
        state.advance().unwrap();

        let now = fixed_now();
        let summary = SessionSummary::from_state(&state, now, now).unwrap();

        assert_eq!(summary.question_count(), 2);
        assert_eq!(summary.answered(), 2);
        assert_eq!(summary.correct(), 1);
        assert!((summary.accuracy() - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.accuracy_tier(), Some(AccuracyTier::BelowAverage));
    }

    #[test]
    fn summary_rejects_inverted_time_range() {
        let state = two_question_state();
        let now = fixed_now();
        let err =
            SessionSummary::from_state(&state, now, now - chrono::Duration::seconds(1)).unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }
}
