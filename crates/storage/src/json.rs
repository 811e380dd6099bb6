//! JSON corpus files.
//!
//! ```json
//! { "questions": [
//!     { "question": "Welke vogel zingt als de Merel?", "info": "Tuututuu",
//!       "tags": ["veelvoorkomend"], "answer": "Merel" }
//! ] }
//! ```

use flip_core::model::{Corpus, QuestionRecord, TagName};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// On-disk shape of a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub questions: Vec<CorpusEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub question: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub tags: Vec<TagName>,
    pub answer: String,
}

impl CorpusFile {
    #[must_use]
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let questions = corpus
            .entries()
            .map(|(_, question, answer)| CorpusEntry {
                question: question.prompt().to_owned(),
                info: question.info().to_owned(),
                tags: question.tags().iter().cloned().collect(),
                answer: answer.to_owned(),
            })
            .collect();
        Self { questions }
    }

    /// Convert into a validated corpus.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corpus` if an answer is blank.
    pub fn into_corpus(self) -> Result<Corpus, StorageError> {
        let pairs = self.questions.into_iter().map(|entry| {
            (
                QuestionRecord::new(entry.question, entry.info, entry.tags),
                entry.answer,
            )
        });
        Ok(Corpus::from_pairs(pairs)?)
    }
}

/// Parse a corpus from JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON (including blank tag
/// names) and `StorageError::Corpus` for invalid entries.
pub fn parse_corpus(text: &str) -> Result<Corpus, StorageError> {
    let file: CorpusFile =
        serde_json::from_str(text).map_err(|e| StorageError::Serialization(e.to_string()))?;
    file.into_corpus()
}

/// Render a corpus as pretty-printed JSON.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn render_corpus(corpus: &Corpus) -> Result<String, StorageError> {
    serde_json::to_string_pretty(&CorpusFile::from_corpus(corpus))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}
