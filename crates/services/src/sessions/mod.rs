mod registry;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use registry::{DEFAULT_IDLE_TIMEOUT_MINUTES, SessionRegistry};
pub use service::QuizSession;
pub use view::{AnswerFeedback, QuestionView, SessionAction, SessionView};
pub use workflow::QuizLoopService;
