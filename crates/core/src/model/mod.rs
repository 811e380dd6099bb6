mod config;
mod ids;
mod question;
mod session;
mod tag;

pub use config::{
    ConfigError, DEFAULT_QUESTION_END_INDEX, DEFAULT_QUESTION_START_INDEX,
    DEFAULT_RANDOM_QUESTIONS, DeliveryConfig, DeliveryDraft, DeliveryToggle, FilterConfig,
    FilterDraft, QuizConfig, QuizConfigDraft, Selection,
};
pub use ids::{ParseIdError, QuestionIndex, SessionId};
pub use question::{Corpus, CorpusError, QuestionRecord};
pub use session::{SessionSummary, SessionSummaryError};
pub use tag::{TagError, TagName};
