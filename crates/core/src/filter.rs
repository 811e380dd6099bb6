//! Eligible-question computation from the active filters.
//!
//! Each filter stage yields the set of corpus indices it lets through; an empty
//! filter setting lets everything through. The eligible list is the
//! intersection of all stages, in ascending corpus order.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{Corpus, FilterConfig, QuestionIndex, TagName};

/// Indices of all questions that survive `filter`, ascending and unique.
///
/// An empty result is a normal outcome ("no questions match these filters");
/// callers decide how to report it.
#[must_use]
pub fn eligible_indices(corpus: &Corpus, filter: &FilterConfig) -> Vec<QuestionIndex> {
    let from_questions = from_selected_questions(corpus, filter.selected_questions());
    let from_tags = from_selected_tags(corpus, filter);

    let eligible: Vec<_> = from_questions.intersection(&from_tags).copied().collect();
    debug!(
        corpus = corpus.len(),
        eligible = eligible.len(),
        "computed eligible questions"
    );
    eligible
}

/// Questions whose answer is one of `selected`, or every question when empty.
#[must_use]
pub fn from_selected_questions(
    corpus: &Corpus,
    selected: &BTreeSet<String>,
) -> BTreeSet<QuestionIndex> {
    corpus
        .entries()
        .filter(|(_, _, answer)| selected.is_empty() || selected.contains(*answer))
        .map(|(index, _, _)| index)
        .collect()
}

/// Questions carrying at least one of `included`, or every question when empty.
#[must_use]
pub fn from_included_tags(corpus: &Corpus, included: &BTreeSet<TagName>) -> BTreeSet<QuestionIndex> {
    corpus
        .entries()
        .filter(|(_, question, _)| included.is_empty() || question.has_any_tag(included))
        .map(|(index, _, _)| index)
        .collect()
}

/// Questions carrying none of `excluded`, or every question when empty.
#[must_use]
pub fn from_excluded_tags(corpus: &Corpus, excluded: &BTreeSet<TagName>) -> BTreeSet<QuestionIndex> {
    corpus
        .entries()
        .filter(|(_, question, _)| !question.has_any_tag(excluded))
        .map(|(index, _, _)| index)
        .collect()
}

/// Questions passing both tag stages.
///
/// Tag exclusion is skipped while explicit questions are selected.
#[must_use]
pub fn from_selected_tags(corpus: &Corpus, filter: &FilterConfig) -> BTreeSet<QuestionIndex> {
    let included = from_included_tags(corpus, filter.included_tags());
    match filter.effective_excluded_tags() {
        Some(excluded) => {
            let kept = from_excluded_tags(corpus, excluded);
            included.intersection(&kept).copied().collect()
        }
        None => included,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionRecord;

    fn tags(names: &[&str]) -> BTreeSet<TagName> {
        names.iter().map(|n| TagName::new(*n).unwrap()).collect()
    }

    fn answers(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn birds() -> Corpus {
        let rows: [(&str, &[&str]); 6] = [
            ("Merel", &["veelvoorkomend"]),
            ("Roodborst", &["klein"]),
            ("Koolmees", &["klein", "mees", "veelvoorkomend"]),
            ("Pimpelmees", &["klein", "mees"]),
            ("Houtduif", &["duif", "veelvoorkomend"]),
            ("Tapuit", &[]),
        ];
        Corpus::from_pairs(rows.iter().map(|(answer, t)| {
            (
                QuestionRecord::new(format!("Welke vogel zingt als de {answer}?"), "", tags(t)),
                (*answer).to_string(),
            )
        }))
        .unwrap()
    }

    fn values(indices: &[QuestionIndex]) -> Vec<usize> {
        indices.iter().map(QuestionIndex::value).collect()
    }

    #[test]
    fn unrestricted_filter_keeps_everything() {
        let corpus = birds();
        let eligible = eligible_indices(&corpus, &FilterConfig::unrestricted());
        assert_eq!(values(&eligible), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn selected_questions_match_answers() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&["Tapuit", "Merel"]), tags(&[]), tags(&[]));
        assert_eq!(values(&eligible_indices(&corpus, &filter)), vec![0, 5]);
    }

    #[test]
    fn included_tags_match_any_tag() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&[]), tags(&["mees", "duif"]), tags(&[]));
        assert_eq!(values(&eligible_indices(&corpus, &filter)), vec![2, 3, 4]);
    }

    #[test]
    fn excluded_tags_drop_any_match() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&[]), tags(&[]), tags(&["klein"]));
        assert_eq!(values(&eligible_indices(&corpus, &filter)), vec![0, 4, 5]);
    }

    #[test]
    fn included_and_excluded_tags_intersect() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&[]), tags(&["veelvoorkomend"]), tags(&["mees"]));
        assert_eq!(values(&eligible_indices(&corpus, &filter)), vec![0, 4]);
    }

    #[test]
    fn selected_questions_override_exclusion() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&["Koolmees"]), tags(&[]), tags(&["mees"]));
        assert_eq!(values(&eligible_indices(&corpus, &filter)), vec![2]);
    }

    #[test]
    fn selected_questions_still_respect_inclusion() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&["Merel", "Roodborst"]), tags(&["klein"]), tags(&[]));
        assert_eq!(values(&eligible_indices(&corpus, &filter)), vec![1]);
    }

    #[test]
    fn no_match_yields_empty_list() {
        let corpus = birds();
        let filter = FilterConfig::new(answers(&["Grutto"]), tags(&[]), tags(&[]));
        assert!(eligible_indices(&corpus, &filter).is_empty());

        let filter = FilterConfig::new(answers(&[]), tags(&["steltloper"]), tags(&[]));
        assert!(eligible_indices(&corpus, &filter).is_empty());
    }

    #[test]
    fn untagged_questions_survive_exclusion() {
        let corpus = birds();
        let kept = from_excluded_tags(&corpus, &tags(&["klein", "veelvoorkomend", "duif"]));
        assert_eq!(kept.into_iter().map(|i| i.value()).collect::<Vec<_>>(), vec![5]);
    }
}
