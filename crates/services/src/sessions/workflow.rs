use std::sync::Arc;

use flip_core::model::QuizConfigDraft;
use storage::repository::CorpusRepository;

use crate::Clock;
use crate::config_editor::ConfigEditor;
use crate::error::SessionError;
use super::service::QuizSession;

/// Orchestrates corpus loading, configuration and session start.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    corpus: Arc<dyn CorpusRepository>,
    seed: Option<u64>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, corpus: Arc<dyn CorpusRepository>) -> Self {
        Self {
            clock,
            corpus,
            seed: None,
        }
    }

    /// Seed every session this service starts, for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Load the corpus and open a configuration editor on `draft`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the corpus cannot be loaded.
    pub async fn open_editor(&self, draft: QuizConfigDraft) -> Result<ConfigEditor, SessionError> {
        let corpus = self.corpus.load_corpus().await?;
        Ok(ConfigEditor::with_draft(Arc::new(corpus), draft))
    }

    /// Start a session from the editor's current draft.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the draft does not yield a valid session.
    pub fn start_session(&self, editor: &ConfigEditor) -> Result<QuizSession, SessionError> {
        let corpus = Arc::clone(editor.corpus());
        match self.seed {
            Some(seed) => QuizSession::start_seeded(corpus, editor.draft(), self.clock, seed),
            None => QuizSession::start(corpus, editor.draft(), self.clock),
        }
    }

    /// Load the corpus and start a session from `draft` in one step.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for storage or session start failures.
    pub async fn start_from_storage(
        &self,
        draft: QuizConfigDraft,
    ) -> Result<QuizSession, SessionError> {
        let editor = self.open_editor(draft).await?;
        self.start_session(&editor)
    }
}
