use serde::Serialize;

use flip_core::model::{QuestionIndex, SessionId, TagName};
use flip_core::progress::Progress;

/// A discrete user action on a running session.
///
/// Check and advance are never combined in one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    CheckAnswer(String),
    Advance,
}

/// The current question as shown before answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: QuestionIndex,
    pub prompt: String,
}

/// What the presentation layer shows after an answer is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerFeedback {
    pub question: QuestionIndex,
    pub given: String,
    pub expected: String,
    pub correct: bool,
    pub info: String,
    pub tags: Vec<TagName>,
    /// Queue position the question was put back at after a miss.
    pub reinserted_at: Option<usize>,
}

/// Observable session state after an action.
///
/// Presentation-agnostic: no pre-formatted strings beyond what the corpus holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    /// `None` once the session is complete.
    pub current: Option<QuestionView>,
    /// Feedback for the current question once it has been checked.
    pub feedback: Option<AnswerFeedback>,
    pub progress: Progress,
    /// Answer choices, when suggestions are enabled.
    pub suggestions: Option<Vec<String>>,
    pub is_complete: bool,
}
