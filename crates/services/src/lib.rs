#![forbid(unsafe_code)]

pub mod config_editor;
pub mod error;
pub mod sessions;

pub use flip_core::Clock;
pub use sessions as session;

pub use config_editor::{ConfigAction, ConfigEditor, ConfigOverview};
pub use error::SessionError;

pub use sessions::{
    AnswerFeedback, QuestionView, QuizLoopService, QuizSession, SessionAction, SessionRegistry,
    SessionView,
};
