use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use flip_core::evaluator;
use flip_core::filter;
use flip_core::model::{
    Corpus, QuestionIndex, QuizConfig, QuizConfigDraft, SessionId, SessionSummary,
};
use flip_core::progress::{self, Progress};
use flip_core::queue::{self, QueueError};
use flip_core::session::SessionState;

use crate::Clock;
use crate::error::SessionError;
use super::view::{AnswerFeedback, QuestionView, SessionAction, SessionView};

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One running quiz session.
///
/// Owns its state, configuration and random source; nothing is shared with
/// other sessions apart from the read-only corpus.
pub struct QuizSession {
    id: SessionId,
    corpus: Arc<Corpus>,
    config: QuizConfig,
    state: SessionState,
    rng: StdRng,
    clock: Clock,
    suggestions: Option<Vec<String>>,
    feedback: Option<AnswerFeedback>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session with an entropy-seeded random source.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Queue` if the filters leave too few questions and
    /// `SessionError::Config` if the delivery settings are invalid.
    pub fn start(
        corpus: Arc<Corpus>,
        draft: &QuizConfigDraft,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        Self::start_with_rng(corpus, draft, clock, StdRng::from_rng(&mut rand::rng()))
    }

    /// Start a reproducible session.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::start`].
    pub fn start_seeded(
        corpus: Arc<Corpus>,
        draft: &QuizConfigDraft,
        clock: Clock,
        seed: u64,
    ) -> Result<Self, SessionError> {
        Self::start_with_rng(corpus, draft, clock, StdRng::seed_from_u64(seed))
    }

    /// Start a session drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::start`].
    pub fn start_with_rng(
        corpus: Arc<Corpus>,
        draft: &QuizConfigDraft,
        clock: Clock,
        mut rng: StdRng,
    ) -> Result<Self, SessionError> {
        let eligible = filter::eligible_indices(&corpus, &draft.filter.freeze());
        if eligible.is_empty() {
            warn!("no questions match the current filters");
            return Err(QueueError::NoEligibleQuestions.into());
        }

        let config = draft.commit(eligible.len())?;
        let built = queue::build_queue(&eligible, config.delivery(), &mut rng).inspect_err(
            |err| warn!(%err, eligible = eligible.len(), "rejected delivery settings"),
        )?;
        let state = SessionState::new(built, config.delivery());

        let suggestions = config
            .delivery()
            .answer_suggestions()
            .then(|| answer_suggestions(&corpus, state.question_indices()));

        let id = SessionId::new_random();
        info!(
            session = %id,
            eligible = eligible.len(),
            questions = state.n_questions(),
            infinite = state.infinite_practice(),
            "started quiz session"
        );

        Ok(Self {
            id,
            corpus,
            config,
            state,
            rng,
            clock,
            suggestions,
            feedback: None,
            started_at: clock.now(),
            completed_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// The question to answer now.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` once the session is complete.
    pub fn current_question(&self) -> Result<QuestionView, SessionError> {
        let index = self.state.current_question()?;
        let question = self
            .corpus
            .question(index)
            .ok_or(SessionError::UnknownQuestion(index))?;
        Ok(QuestionView {
            index,
            prompt: question.prompt().to_owned(),
        })
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        progress::progress(&self.state)
    }

    /// Sorted distinct answers of the session's questions, when suggestions are on.
    #[must_use]
    pub fn suggestions(&self) -> Option<&[String]> {
        self.suggestions.as_deref()
    }

    /// Feedback for the current question, if it has been checked.
    #[must_use]
    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    /// Check `given` against the current question.
    ///
    /// Checking again before advancing returns the first feedback unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::BlankAnswer` for an empty answer (nothing changes)
    /// and `SessionError::State` once the session is complete.
    pub fn check_answer(&mut self, given: &str) -> Result<AnswerFeedback, SessionError> {
        let index = self.state.current_question()?;
        if let Some(feedback) = &self.feedback {
            return Ok(feedback.clone());
        }
        if given.is_empty() {
            return Err(SessionError::BlankAnswer);
        }

        let (question, expected) = self
            .corpus
            .question(index)
            .zip(self.corpus.answer(index))
            .ok_or(SessionError::UnknownQuestion(index))?;
        let evaluation =
            evaluator::check_answer(given, expected, &mut self.state, &mut self.rng)?;

        let feedback = AnswerFeedback {
            question: index,
            given: given.to_owned(),
            expected: expected.to_owned(),
            correct: evaluation.correct,
            info: question.info().to_owned(),
            tags: question.tags().iter().cloned().collect(),
            reinserted_at: evaluation.reinserted_at,
        };
        self.feedback = Some(feedback.clone());
        Ok(feedback)
    }

    /// Move past the checked question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAnswered` if the current question has not been
    /// checked and `SessionError::State` once the session is complete.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.state.current_question()?;
        if !self.state.answer_submitted() {
            return Err(SessionError::NotAnswered);
        }

        self.state.advance()?;
        self.feedback = None;
        if self.state.is_complete() {
            let completed_at = self.clock.now();
            self.completed_at = Some(completed_at);
            let report = self.progress();
            info!(
                session = %self.id,
                correct = report.n_correct,
                seen = report.n_seen,
                "quiz session complete"
            );
        }
        Ok(())
    }

    /// Dispatch one action and return the new observable state.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying action; the session is unchanged.
    pub fn apply(&mut self, action: SessionAction) -> Result<SessionView, SessionError> {
        match action {
            SessionAction::CheckAnswer(given) => {
                self.check_answer(&given)?;
            }
            SessionAction::Advance => self.advance()?,
        }
        Ok(self.view())
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            current: self.current_question().ok(),
            feedback: self.feedback.clone(),
            progress: self.progress(),
            suggestions: self.suggestions.clone(),
            is_complete: self.is_complete(),
        }
    }

    /// Summary of the session so far; uses the completion time once finished.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the clock went backwards.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let completed_at = self.completed_at.unwrap_or_else(|| self.clock.now());
        Ok(SessionSummary::from_state(
            &self.state,
            self.started_at,
            completed_at,
        )?)
    }

    #[cfg(test)]
    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("queue_len", &self.state.queue().len())
            .field("n_questions", &self.state.n_questions())
            .field("answer_submitted", &self.state.answer_submitted())
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

fn answer_suggestions(corpus: &Corpus, indices: &[QuestionIndex]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|index| corpus.answer(*index))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
