//! Draft configuration editing against a loaded corpus.
//!
//! The editor owns a [`QuizConfigDraft`] and re-synchronises it with the corpus
//! after every action: selections that are no longer offered are dropped and the
//! delivery numbers are clamped into the eligible list. The returned
//! [`ConfigOverview`] lists what a configuration form would offer next.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use flip_core::filter;
use flip_core::model::{Corpus, DeliveryToggle, QuizConfig, QuizConfigDraft, TagName};
use flip_core::queue::QueueError;

use crate::error::SessionError;

/// One edit of the draft configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    SelectQuestions(BTreeSet<String>),
    IncludeTags(BTreeSet<TagName>),
    ExcludeTags(BTreeSet<TagName>),
    SetToggle { toggle: DeliveryToggle, on: bool },
    SetRandomCount(usize),
    /// Range over the eligible list with an inclusive end, as a two-handle slider reports it.
    SetRange { start: usize, end_inclusive: usize },
    Reset,
}

/// Choices and counts for the current draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigOverview {
    /// Answers of the questions that pass the tag filters, in corpus order.
    pub question_choices: Vec<String>,
    /// Tags offered for inclusion; `None` while explicit questions are selected.
    pub included_tag_choices: Option<Vec<TagName>>,
    /// Tags offered for exclusion; `None` while explicit questions are selected.
    pub excluded_tag_choices: Option<Vec<TagName>>,
    pub total_count: usize,
    pub eligible_count: usize,
    pub selected_count: usize,
}

/// Editable configuration bound to one corpus.
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    corpus: Arc<Corpus>,
    draft: QuizConfigDraft,
}

impl ConfigEditor {
    #[must_use]
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self::with_draft(corpus, QuizConfigDraft::default())
    }

    /// Start from an existing draft, e.g. one read from a config file.
    #[must_use]
    pub fn with_draft(corpus: Arc<Corpus>, draft: QuizConfigDraft) -> Self {
        let mut editor = Self { corpus, draft };
        editor.resync();
        editor
    }

    #[must_use]
    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    #[must_use]
    pub fn draft(&self) -> &QuizConfigDraft {
        &self.draft
    }

    /// Apply one edit and report the resulting choices.
    pub fn update(&mut self, action: ConfigAction) -> ConfigOverview {
        debug!(?action, "updating draft configuration");
        match action {
            ConfigAction::SelectQuestions(answers) => self.draft.filter.selected_questions = answers,
            ConfigAction::IncludeTags(tags) => self.draft.filter.included_tags = tags,
            ConfigAction::ExcludeTags(tags) => self.draft.filter.excluded_tags = tags,
            ConfigAction::SetToggle { toggle, on } => self.draft.delivery.set_toggle(toggle, on),
            ConfigAction::SetRandomCount(count) => self.draft.delivery.n_random_questions = count,
            ConfigAction::SetRange {
                start,
                end_inclusive,
            } => {
                self.draft.delivery.question_start_index = start;
                self.draft.delivery.question_end_index = end_inclusive.saturating_add(1);
            }
            ConfigAction::Reset => self.draft = QuizConfigDraft::default(),
        }
        self.resync();
        self.overview()
    }

    /// Choices and counts for the current draft.
    #[must_use]
    pub fn overview(&self) -> ConfigOverview {
        let eligible_count = self.eligible_count();
        let selected_count = match eligible_count {
            0 => 0,
            1 => 1,
            _ => self.draft.delivery.selected_count(),
        };
        let explicit = !self.draft.filter.selected_questions.is_empty();

        ConfigOverview {
            question_choices: self.question_choices(),
            included_tag_choices: (!explicit)
                .then(|| self.included_tag_choices().into_iter().collect()),
            excluded_tag_choices: (!explicit)
                .then(|| self.excluded_tag_choices().into_iter().collect()),
            total_count: self.corpus.len(),
            eligible_count,
            selected_count,
        }
    }

    /// Freeze the draft into the configuration a session would run with.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Queue` if no question is eligible and
    /// `SessionError::Config` if the delivery settings are invalid.
    pub fn commit(&self) -> Result<QuizConfig, SessionError> {
        let eligible_count = self.eligible_count();
        if eligible_count == 0 {
            warn!("no questions match the current filters");
            return Err(QueueError::NoEligibleQuestions.into());
        }
        Ok(self.draft.commit(eligible_count)?)
    }

    fn eligible_count(&self) -> usize {
        filter::eligible_indices(&self.corpus, &self.draft.filter.freeze()).len()
    }

    fn question_choices(&self) -> Vec<String> {
        let passing = filter::from_selected_tags(&self.corpus, &self.draft.filter.freeze());
        let mut seen = BTreeSet::new();
        passing
            .into_iter()
            .filter_map(|index| self.corpus.answer(index))
            .filter(|answer| seen.insert(*answer))
            .map(str::to_owned)
            .collect()
    }

    fn included_tag_choices(&self) -> BTreeSet<TagName> {
        filter::from_excluded_tags(&self.corpus, &self.draft.filter.excluded_tags)
            .into_iter()
            .filter_map(|index| self.corpus.question(index))
            .flat_map(|question| question.tags().iter().cloned())
            .collect()
    }

    fn excluded_tag_choices(&self) -> BTreeSet<TagName> {
        self.corpus
            .all_tags()
            .into_iter()
            .filter(|tag| !self.draft.filter.included_tags.contains(tag))
            .collect()
    }

    /// Drop selections that are no longer on offer and clamp the delivery numbers.
    fn resync(&mut self) {
        let excluded = self.excluded_tag_choices();
        self.draft
            .filter
            .excluded_tags
            .retain(|tag| excluded.contains(tag));
        let included = self.included_tag_choices();
        self.draft
            .filter
            .included_tags
            .retain(|tag| included.contains(tag));
        let answers: BTreeSet<String> = self.question_choices().into_iter().collect();
        self.draft
            .filter
            .selected_questions
            .retain(|answer| answers.contains(answer));

        let eligible = self.eligible_count();
        let delivery = &mut self.draft.delivery;
        if eligible >= 1 {
            delivery.n_random_questions = delivery.n_random_questions.clamp(1, eligible);
        }
        if eligible >= 2 {
            let start = delivery.question_start_index.min(eligible - 2);
            let end = delivery.question_end_index.min(eligible).max(start + 1);
            delivery.question_start_index = start;
            delivery.question_end_index = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flip_core::model::{QuestionRecord, Selection};

    fn tags(names: &[&str]) -> BTreeSet<TagName> {
        names.iter().map(|n| TagName::new(*n).unwrap()).collect()
    }

    fn tag_list(names: &[&str]) -> Vec<TagName> {
        tags(names).into_iter().collect()
    }

    fn birds() -> Arc<Corpus> {
        let rows: [(&str, &[&str]); 6] = [
            ("Merel", &["veelvoorkomend"]),
            ("Roodborst", &["klein"]),
            ("Koolmees", &["klein", "mees", "veelvoorkomend"]),
            ("Pimpelmees", &["klein", "mees"]),
            ("Houtduif", &["duif", "veelvoorkomend"]),
            ("Tapuit", &[]),
        ];
        let corpus = Corpus::from_pairs(rows.iter().map(|(answer, t)| {
            (
                QuestionRecord::new(format!("Welke vogel zingt als de {answer}?"), "", tags(t)),
                (*answer).to_string(),
            )
        }))
        .unwrap();
        Arc::new(corpus)
    }

    #[test]
    fn fresh_editor_offers_everything() {
        let editor = ConfigEditor::new(birds());
        let overview = editor.overview();

        assert_eq!(overview.question_choices.len(), 6);
        assert_eq!(
            overview.included_tag_choices,
            Some(tag_list(&["duif", "klein", "mees", "veelvoorkomend"]))
        );
        assert_eq!(overview.eligible_count, 6);
        assert_eq!(overview.selected_count, 3);
    }

    #[test]
    fn excluding_a_tag_narrows_the_choices() {
        let mut editor = ConfigEditor::new(birds());
        let overview = editor.update(ConfigAction::ExcludeTags(tags(&["klein"])));

        assert_eq!(
            overview.question_choices,
            vec!["Merel".to_string(), "Houtduif".into(), "Tapuit".into()]
        );
        assert_eq!(
            overview.included_tag_choices,
            Some(tag_list(&["duif", "veelvoorkomend"]))
        );
        assert_eq!(overview.eligible_count, 3);
    }

    #[test]
    fn included_tags_are_not_offered_for_exclusion() {
        let mut editor = ConfigEditor::new(birds());
        let overview = editor.update(ConfigAction::IncludeTags(tags(&["mees"])));
        assert_eq!(
            overview.excluded_tag_choices,
            Some(tag_list(&["duif", "klein", "veelvoorkomend"]))
        );

        // Excluding an included tag is dropped on resync.
        editor.update(ConfigAction::ExcludeTags(tags(&["mees", "duif"])));
        assert_eq!(editor.draft().filter.excluded_tags, tags(&["duif"]));
    }

    #[test]
    fn explicit_selection_hides_tag_choices() {
        let mut editor = ConfigEditor::new(birds());
        let selected: BTreeSet<String> = ["Merel".to_string(), "Grutto".to_string()].into();
        let overview = editor.update(ConfigAction::SelectQuestions(selected));

        assert_eq!(overview.included_tag_choices, None);
        assert_eq!(overview.excluded_tag_choices, None);
        // Unknown answers are not kept.
        assert_eq!(
            editor.draft().filter.selected_questions,
            BTreeSet::from(["Merel".to_string()])
        );
        assert_eq!(overview.eligible_count, 1);
        assert_eq!(overview.selected_count, 1);
    }

    #[test]
    fn random_count_is_clamped_to_eligible() {
        let mut editor = ConfigEditor::new(birds());
        editor.update(ConfigAction::SetToggle {
            toggle: DeliveryToggle::RandomSelection,
            on: true,
        });
        let overview = editor.update(ConfigAction::SetRandomCount(50));
        assert_eq!(editor.draft().delivery.n_random_questions, 6);
        assert_eq!(overview.selected_count, 6);

        editor.update(ConfigAction::SetRandomCount(0));
        assert_eq!(editor.draft().delivery.n_random_questions, 1);
    }

    #[test]
    fn range_is_clamped_after_filters_shrink() {
        let mut editor = ConfigEditor::new(birds());
        editor.update(ConfigAction::SetRange {
            start: 4,
            end_inclusive: 5,
        });
        assert_eq!(editor.draft().delivery.question_start_index, 4);
        assert_eq!(editor.draft().delivery.question_end_index, 6);

        let overview = editor.update(ConfigAction::IncludeTags(tags(&["mees"])));
        assert_eq!(overview.eligible_count, 2);
        assert_eq!(editor.draft().delivery.question_start_index, 0);
        assert_eq!(editor.draft().delivery.question_end_index, 2);

        let config = editor.commit().unwrap();
        assert_eq!(
            config.delivery().selection(),
            Selection::Range { start: 0, end: 2 }
        );
    }

    #[test]
    fn included_tag_without_surviving_questions_is_dropped() {
        let mut editor = ConfigEditor::new(birds());
        editor.update(ConfigAction::IncludeTags(tags(&["duif"])));
        let overview = editor.update(ConfigAction::ExcludeTags(tags(&["veelvoorkomend"])));

        assert!(editor.draft().filter.included_tags.is_empty());
        assert_eq!(
            overview.question_choices,
            vec!["Roodborst".to_string(), "Pimpelmees".into(), "Tapuit".into()]
        );
    }

    #[test]
    fn commit_without_eligible_questions_fails() {
        let empty = Corpus::from_pairs(Vec::new()).unwrap();
        let editor = ConfigEditor::new(Arc::new(empty));
        let overview = editor.overview();
        assert_eq!(overview.eligible_count, 0);
        assert_eq!(overview.selected_count, 0);

        let err = editor.commit().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Queue(QueueError::NoEligibleQuestions)
        ));
        assert!(err.is_recoverable());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut editor = ConfigEditor::new(birds());
        editor.update(ConfigAction::IncludeTags(tags(&["klein"])));
        editor.update(ConfigAction::Reset);
        assert_eq!(editor.draft(), &QuizConfigDraft::default());
    }
}
