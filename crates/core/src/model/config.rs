use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::tag::TagName;

/// First question of the default range (inclusive).
pub const DEFAULT_QUESTION_START_INDEX: usize = 0;
/// End of the default range (exclusive).
pub const DEFAULT_QUESTION_END_INDEX: usize = 3;
/// Number of distinct questions drawn in random selection by default.
pub const DEFAULT_RANDOM_QUESTIONS: usize = 2;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("question range start ({start}) must be before its end ({end})")]
    InvalidRange { start: usize, end: usize },

    #[error("number of random questions must be > 0")]
    InvalidRandomCount,

    #[error("unknown delivery toggle: {value}")]
    UnknownToggle { value: String },
}

//
// ─── FILTERS ───────────────────────────────────────────────────────────────────
//

/// Editable filter settings, mutated freely before a session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDraft {
    pub selected_questions: BTreeSet<String>,
    pub included_tags: BTreeSet<TagName>,
    pub excluded_tags: BTreeSet<TagName>,
}

impl FilterDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the draft into an immutable filter.
    #[must_use]
    pub fn freeze(&self) -> FilterConfig {
        FilterConfig {
            selected_questions: self.selected_questions.clone(),
            included_tags: self.included_tags.clone(),
            excluded_tags: self.excluded_tags.clone(),
        }
    }
}

/// Frozen selection criteria. An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    selected_questions: BTreeSet<String>,
    included_tags: BTreeSet<TagName>,
    excluded_tags: BTreeSet<TagName>,
}

impl FilterConfig {
    /// A filter that lets every question through.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(
        selected_questions: BTreeSet<String>,
        included_tags: BTreeSet<TagName>,
        excluded_tags: BTreeSet<TagName>,
    ) -> Self {
        Self {
            selected_questions,
            included_tags,
            excluded_tags,
        }
    }

    #[must_use]
    pub fn selected_questions(&self) -> &BTreeSet<String> {
        &self.selected_questions
    }

    #[must_use]
    pub fn included_tags(&self) -> &BTreeSet<TagName> {
        &self.included_tags
    }

    #[must_use]
    pub fn excluded_tags(&self) -> &BTreeSet<TagName> {
        &self.excluded_tags
    }

    /// Excluded tags that take part in filtering.
    ///
    /// Explicitly selected questions override tag exclusion, so this is `None`
    /// whenever `selected_questions` is non-empty.
    #[must_use]
    pub fn effective_excluded_tags(&self) -> Option<&BTreeSet<TagName>> {
        if self.selected_questions.is_empty() {
            Some(&self.excluded_tags)
        } else {
            None
        }
    }
}

//
// ─── DELIVERY ──────────────────────────────────────────────────────────────────
//

/// Named on/off switches of the delivery settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryToggle {
    RandomSelection,
    InfinitePractice,
    AnswerSuggestions,
}

impl DeliveryToggle {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryToggle::RandomSelection => "random-selection",
            DeliveryToggle::InfinitePractice => "infinite-practice",
            DeliveryToggle::AnswerSuggestions => "answer-suggestions",
        }
    }
}

impl fmt::Display for DeliveryToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryToggle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "random-selection" => Ok(Self::RandomSelection),
            "infinite-practice" => Ok(Self::InfinitePractice),
            "answer-suggestions" => Ok(Self::AnswerSuggestions),
            _ => Err(ConfigError::UnknownToggle {
                value: s.to_string(),
            }),
        }
    }
}

/// Editable delivery settings with the quiz defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DeliveryDraft {
    pub random_selection: bool,
    pub n_random_questions: usize,
    pub question_start_index: usize,
    pub question_end_index: usize,
    pub infinite_practice: bool,
    pub answer_suggestions: bool,
}

impl Default for DeliveryDraft {
    fn default() -> Self {
        Self {
            random_selection: false,
            n_random_questions: DEFAULT_RANDOM_QUESTIONS,
            question_start_index: DEFAULT_QUESTION_START_INDEX,
            question_end_index: DEFAULT_QUESTION_END_INDEX,
            infinite_practice: false,
            answer_suggestions: false,
        }
    }
}

impl DeliveryDraft {
    pub fn set_toggle(&mut self, toggle: DeliveryToggle, on: bool) {
        match toggle {
            DeliveryToggle::RandomSelection => self.random_selection = on,
            DeliveryToggle::InfinitePractice => self.infinite_practice = on,
            DeliveryToggle::AnswerSuggestions => self.answer_suggestions = on,
        }
    }

    /// Flip a toggle addressed by its name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownToggle` if the name is not recognised.
    pub fn set_toggle_by_name(&mut self, name: &str, on: bool) -> Result<(), ConfigError> {
        let toggle = name.parse::<DeliveryToggle>()?;
        self.set_toggle(toggle, on);
        Ok(())
    }

    /// Number of questions the current settings would select.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        if self.random_selection {
            self.n_random_questions
        } else {
            self.question_end_index
                .saturating_sub(self.question_start_index)
        }
    }

    /// Validate the draft into a frozen delivery config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` if start ≥ end in range mode and
    /// `ConfigError::InvalidRandomCount` if zero random questions are requested.
    pub fn validate(&self) -> Result<DeliveryConfig, ConfigError> {
        let selection = if self.random_selection {
            Selection::Random {
                count: self.n_random_questions,
            }
        } else {
            Selection::Range {
                start: self.question_start_index,
                end: self.question_end_index,
            }
        };
        DeliveryConfig::new(selection, self.infinite_practice, self.answer_suggestions)
    }
}

/// How the initial set of questions is taken from the eligible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Selection {
    /// The half-open range `start..end` of the eligible list.
    Range { start: usize, end: usize },
    /// `count` distinct eligible questions drawn uniformly at random.
    Random { count: usize },
}

impl Selection {
    #[must_use]
    pub fn question_count(&self) -> usize {
        match *self {
            Selection::Range { start, end } => end.saturating_sub(start),
            Selection::Random { count } => count,
        }
    }
}

/// Frozen delivery settings for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    selection: Selection,
    infinite_practice: bool,
    answer_suggestions: bool,
}

impl DeliveryConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if the selection is empty or inverted.
    pub fn new(
        selection: Selection,
        infinite_practice: bool,
        answer_suggestions: bool,
    ) -> Result<Self, ConfigError> {
        match selection {
            Selection::Range { start, end } if start >= end => {
                return Err(ConfigError::InvalidRange { start, end });
            }
            Selection::Random { count: 0 } => return Err(ConfigError::InvalidRandomCount),
            _ => {}
        }

        Ok(Self {
            selection,
            infinite_practice,
            answer_suggestions,
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` if `start >= end`.
    pub fn range(start: usize, end: usize) -> Result<Self, ConfigError> {
        Self::new(Selection::Range { start, end }, false, false)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRandomCount` if `count` is zero.
    pub fn random(count: usize) -> Result<Self, ConfigError> {
        Self::new(Selection::Random { count }, false, false)
    }

    #[must_use]
    pub fn with_infinite_practice(mut self, on: bool) -> Self {
        self.infinite_practice = on;
        self
    }

    #[must_use]
    pub fn with_answer_suggestions(mut self, on: bool) -> Self {
        self.answer_suggestions = on;
        self
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn infinite_practice(&self) -> bool {
        self.infinite_practice
    }

    #[must_use]
    pub fn answer_suggestions(&self) -> bool {
        self.answer_suggestions
    }

    /// Target number of distinct questions for the session.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.selection.question_count()
    }
}

//
// ─── QUIZ CONFIG ───────────────────────────────────────────────────────────────
//

/// Both halves of the editable configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfigDraft {
    pub filter: FilterDraft,
    pub delivery: DeliveryDraft,
}

impl QuizConfigDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze the draft for a session over `eligible_count` questions.
    ///
    /// With exactly one eligible question the delivery is forced to a random
    /// selection of that single question, whatever the range settings say.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the delivery settings are invalid.
    pub fn commit(&self, eligible_count: usize) -> Result<QuizConfig, ConfigError> {
        let delivery = if eligible_count == 1 {
            DeliveryConfig::new(
                Selection::Random { count: 1 },
                self.delivery.infinite_practice,
                self.delivery.answer_suggestions,
            )?
        } else {
            self.delivery.validate()?
        };

        Ok(QuizConfig {
            filter: self.filter.freeze(),
            delivery,
        })
    }
}

/// Filter and delivery settings fixed for the lifetime of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    filter: FilterConfig,
    delivery: DeliveryConfig,
}

impl QuizConfig {
    #[must_use]
    pub fn new(filter: FilterConfig, delivery: DeliveryConfig) -> Self {
        Self { filter, delivery }
    }

    #[must_use]
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    #[must_use]
    pub fn delivery(&self) -> &DeliveryConfig {
        &self.delivery
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
