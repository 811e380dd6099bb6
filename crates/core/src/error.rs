use thiserror::Error;

use crate::model::{ConfigError, CorpusError, SessionSummaryError, TagError};
use crate::queue::QueueError;
use crate::session::SessionStateError;

/// Any error raised by the quiz core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}
