use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionIndex;
use crate::model::tag::TagName;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorpusError {
    #[error("corpus has {questions} questions but {answers} answers")]
    LengthMismatch { questions: usize, answers: usize },

    #[error("answer for question {index} is empty")]
    EmptyAnswer { index: usize },
}

//
// ─── QUESTION RECORD ───────────────────────────────────────────────────────────
//

/// One quiz item: the prompt shown to the user, the information revealed after
/// answering, and the tags used for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    prompt: String,
    info: String,
    tags: BTreeSet<TagName>,
}

impl QuestionRecord {
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        info: impl Into<String>,
        tags: impl IntoIterator<Item = TagName>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            info: info.into(),
            tags: tags.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn info(&self) -> &str {
        &self.info
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<TagName> {
        &self.tags
    }

    /// Returns true when at least one of this question's tags is in `tags`.
    #[must_use]
    pub fn has_any_tag(&self, tags: &BTreeSet<TagName>) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

//
// ─── CORPUS ────────────────────────────────────────────────────────────────────
//

/// The question corpus together with its parallel list of correct answers.
///
/// Question `i` is answered by answer `i`; both lists always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    questions: Vec<QuestionRecord>,
    answers: Vec<String>,
}

impl Corpus {
    /// Pair questions with their answers.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::LengthMismatch` if the lists differ in length and
    /// `CorpusError::EmptyAnswer` if an answer is blank.
    pub fn new(questions: Vec<QuestionRecord>, answers: Vec<String>) -> Result<Self, CorpusError> {
        if questions.len() != answers.len() {
            return Err(CorpusError::LengthMismatch {
                questions: questions.len(),
                answers: answers.len(),
            });
        }
        if let Some(index) = answers.iter().position(|answer| answer.trim().is_empty()) {
            return Err(CorpusError::EmptyAnswer { index });
        }

        Ok(Self { questions, answers })
    }

    /// Build a corpus from `(question, answer)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::EmptyAnswer` if an answer is blank.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (QuestionRecord, String)>,
    ) -> Result<Self, CorpusError> {
        let (questions, answers) = pairs.into_iter().unzip();
        Self::new(questions, answers)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn question(&self, index: QuestionIndex) -> Option<&QuestionRecord> {
        self.questions.get(index.value())
    }

    #[must_use]
    pub fn answer(&self, index: QuestionIndex) -> Option<&str> {
        self.answers.get(index.value()).map(String::as_str)
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Iterates `(index, question, answer)` in corpus order.
    pub fn entries(&self) -> impl Iterator<Item = (QuestionIndex, &QuestionRecord, &str)> {
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(i, (question, answer))| (QuestionIndex::new(i), question, answer.as_str()))
    }

    /// Every tag used anywhere in the corpus.
    #[must_use]
    pub fn all_tags(&self) -> BTreeSet<TagName> {
        self.questions
            .iter()
            .flat_map(|question| question.tags().iter().cloned())
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    fn question(prompt: &str, tags: &[&str]) -> QuestionRecord {
        QuestionRecord::new(prompt, "info", tags.iter().map(|t| tag(t)))
    }

    #[test]
    fn corpus_rejects_length_mismatch() {
        let err = Corpus::new(vec![question("Q", &[])], Vec::new()).unwrap_err();
        assert_eq!(
            err,
            CorpusError::LengthMismatch {
                questions: 1,
                answers: 0
            }
        );
    }

    #[test]
    fn corpus_rejects_blank_answer() {
        let err = Corpus::new(
            vec![question("Q1", &[]), question("Q2", &[])],
            vec!["Merel".into(), "  ".into()],
        )
        .unwrap_err();
        assert_eq!(err, CorpusError::EmptyAnswer { index: 1 });
    }

    #[test]
    fn entries_pair_questions_with_answers() {
        let corpus = Corpus::from_pairs(vec![
            (question("Q1", &["klein"]), "Merel".to_string()),
            (question("Q2", &[]), "Roodborst".to_string()),
        ])
        .unwrap();

        let entries: Vec<_> = corpus
            .entries()
            .map(|(i, q, a)| (i.value(), q.prompt().to_string(), a.to_string()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (0, "Q1".to_string(), "Merel".to_string()),
                (1, "Q2".to_string(), "Roodborst".to_string()),
            ]
        );
        assert_eq!(corpus.answer(QuestionIndex::new(1)), Some("Roodborst"));
        assert!(corpus.question(QuestionIndex::new(2)).is_none());
    }

    #[test]
    fn all_tags_collects_distinct_tags() {
        let corpus = Corpus::from_pairs(vec![
            (question("Q1", &["klein", "mees"]), "Koolmees".to_string()),
            (question("Q2", &["mees"]), "Pimpelmees".to_string()),
            (question("Q3", &[]), "Tapuit".to_string()),
        ])
        .unwrap();

        let tags: Vec<_> = corpus.all_tags().into_iter().map(String::from).collect();
        assert_eq!(tags, vec!["klein".to_string(), "mees".to_string()]);
    }

    #[test]
    fn has_any_tag_checks_intersection() {
        let q = question("Q", &["duif", "veelvoorkomend"]);
        let wanted: BTreeSet<_> = [tag("duif")].into_iter().collect();
        let other: BTreeSet<_> = [tag("mees")].into_iter().collect();
        assert!(q.has_any_tag(&wanted));
        assert!(!q.has_any_tag(&other));
        assert!(!q.has_any_tag(&BTreeSet::new()));
    }
}
