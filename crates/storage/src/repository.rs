use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flip_core::model::{Corpus, CorpusError};
use thiserror::Error;
use tracing::debug;

use crate::{json, sample};

/// Errors surfaced by corpus sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("corpus lock poisoned: {0}")]
    Poisoned(String),
}

/// Source of the question corpus and its parallel answers.
///
/// Implementations must uphold the corpus length invariant; [`Corpus`] itself
/// enforces it on construction.
#[async_trait]
pub trait CorpusRepository: Send + Sync {
    /// Load the full corpus.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no corpus is available, or other
    /// storage errors from the underlying source.
    async fn load_corpus(&self) -> Result<Corpus, StorageError>;
}

/// Corpus held in memory, for tests and embedding.
#[derive(Clone, Default)]
pub struct InMemoryCorpus {
    corpus: Arc<Mutex<Option<Corpus>>>,
}

impl InMemoryCorpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_corpus(corpus: Corpus) -> Self {
        Self {
            corpus: Arc::new(Mutex::new(Some(corpus))),
        }
    }

    /// Replace the stored corpus. Sessions already started keep their own copy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if the lock is poisoned.
    pub fn replace(&self, corpus: Corpus) -> Result<(), StorageError> {
        let mut guard = self
            .corpus
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        *guard = Some(corpus);
        Ok(())
    }
}

#[async_trait]
impl CorpusRepository for InMemoryCorpus {
    async fn load_corpus(&self) -> Result<Corpus, StorageError> {
        let guard = self
            .corpus
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }
}

/// Corpus read from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusRepository for JsonFileCorpus {
    async fn load_corpus(&self) -> Result<Corpus, StorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound);
            }
            Err(e) => return Err(e.into()),
        };
        let corpus = json::parse_corpus(&text)?;
        debug!(path = %self.path.display(), questions = corpus.len(), "loaded corpus file");
        Ok(corpus)
    }
}

/// The built-in bird-song corpus.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCorpus;

#[async_trait]
impl CorpusRepository for SampleCorpus {
    async fn load_corpus(&self) -> Result<Corpus, StorageError> {
        Ok(sample::bird_songs()?)
    }
}

/// Corpus source behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub corpus: Arc<dyn CorpusRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(corpus: Corpus) -> Self {
        Self {
            corpus: Arc::new(InMemoryCorpus::with_corpus(corpus)),
        }
    }

    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            corpus: Arc::new(JsonFileCorpus::new(path)),
        }
    }

    #[must_use]
    pub fn sample() -> Self {
        Self {
            corpus: Arc::new(SampleCorpus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flip_core::model::QuestionRecord;
    use std::io::Write;

    fn one_bird() -> Corpus {
        Corpus::from_pairs([(
            QuestionRecord::new("Welke vogel zingt als de Merel?", "", []),
            "Merel".to_string(),
        )])
        .unwrap()
    }

    #[tokio::test]
    async fn empty_in_memory_source_is_not_found() {
        let repo = InMemoryCorpus::new();
        assert!(matches!(
            repo.load_corpus().await,
            Err(StorageError::NotFound)
        ));

        repo.replace(one_bird()).unwrap();
        assert_eq!(repo.load_corpus().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn json_file_source_reads_corpus() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "questions": [ {{ "question": "Welke vogel?", "tags": ["klein"], "answer": "Roodborst" }} ] }}"#
        )
        .unwrap();

        let storage = Storage::json_file(file.path());
        let corpus = storage.corpus.load_corpus().await.unwrap();
        assert_eq!(corpus.answers(), &["Roodborst".to_string()]);
    }

    #[tokio::test]
    async fn missing_json_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::json_file(dir.path().join("absent.json"));
        assert!(matches!(
            storage.corpus.load_corpus().await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn sample_source_loads_bird_songs() {
        let corpus = Storage::sample().corpus.load_corpus().await.unwrap();
        assert_eq!(corpus.len(), 10);
    }
}
