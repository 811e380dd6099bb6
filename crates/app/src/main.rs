use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use flip_core::model::{DeliveryToggle, QuizConfigDraft, SessionSummary, TagName};
use services::{
    AnswerFeedback, Clock, ConfigAction, ConfigEditor, ConfigOverview, QuizLoopService,
    QuizSession, SessionError,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

mod logging;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidRange { raw: String },
    InvalidTag { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidRange { raw } => {
                write!(f, "invalid --range value: {raw} (expected START..END)")
            }
            ArgsError::InvalidTag { raw } => write!(f, "invalid tag: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

/// Parse `START..END` (end exclusive) into a slider position with an inclusive end.
fn parse_range(raw: &str) -> Result<(usize, usize), ArgsError> {
    let invalid = || ArgsError::InvalidRange {
        raw: raw.to_string(),
    };
    let (start, end) = raw.split_once("..").ok_or_else(invalid)?;
    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;
    if end <= start {
        return Err(invalid());
    }
    Ok((start, end - 1))
}

fn parse_tag(raw: String) -> Result<TagName, ArgsError> {
    TagName::new(raw.clone()).map_err(|_| ArgsError::InvalidTag { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --corpus <file.json>    question corpus (default: built-in bird songs)");
    eprintln!("  --config <file.json>    start from a saved draft configuration");
    eprintln!("  --random <n>            draw n distinct questions at random");
    eprintln!("  --range <start..end>    quiz a slice of the eligible questions");
    eprintln!("  --infinite              keep practicing until stdin closes");
    eprintln!("  --suggestions           list the possible answers");
    eprintln!("  --select <answer>       quiz only this question (repeatable)");
    eprintln!("  --include-tag <tag>     keep questions with this tag (repeatable)");
    eprintln!("  --exclude-tag <tag>     drop questions with this tag (repeatable)");
    eprintln!("  --seed <n>              seed the shuffles for a reproducible run");
    eprintln!("  --verbose               debug logging on stderr");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLIP_CORPUS, FLIP_SEED, RUST_LOG");
}

#[derive(Debug, Default)]
struct Args {
    corpus: Option<PathBuf>,
    config: Option<PathBuf>,
    random: Option<usize>,
    range: Option<(usize, usize)>,
    infinite: bool,
    suggestions: bool,
    select: BTreeSet<String>,
    include_tags: BTreeSet<TagName>,
    exclude_tags: BTreeSet<TagName>,
    seed: Option<u64>,
    verbose: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            corpus: std::env::var("FLIP_CORPUS")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            seed: std::env::var("FLIP_SEED")
                .ok()
                .and_then(|value| value.trim().parse().ok()),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--corpus" => parsed.corpus = Some(require_value(args, "--corpus")?.into()),
                "--config" => parsed.config = Some(require_value(args, "--config")?.into()),
                "--random" => {
                    let value = require_value(args, "--random")?;
                    parsed.random = Some(parse_number("--random", value)?);
                }
                "--range" => {
                    let value = require_value(args, "--range")?;
                    parsed.range = Some(parse_range(&value)?);
                }
                "--infinite" => parsed.infinite = true,
                "--suggestions" => parsed.suggestions = true,
                "--select" => {
                    parsed.select.insert(require_value(args, "--select")?);
                }
                "--include-tag" => {
                    let value = require_value(args, "--include-tag")?;
                    parsed.include_tags.insert(parse_tag(value)?);
                }
                "--exclude-tag" => {
                    let value = require_value(args, "--exclude-tag")?;
                    parsed.exclude_tags.insert(parse_tag(value)?);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    parsed.seed = Some(parse_number("--seed", value)?);
                }
                "--verbose" | "-v" => parsed.verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    /// Editor actions for the flags, applied on top of the loaded draft.
    fn config_actions(&self, draft: &QuizConfigDraft) -> Vec<ConfigAction> {
        let mut actions = Vec::new();
        if !self.exclude_tags.is_empty() {
            let mut tags = draft.filter.excluded_tags.clone();
            tags.extend(self.exclude_tags.iter().cloned());
            actions.push(ConfigAction::ExcludeTags(tags));
        }
        if !self.include_tags.is_empty() {
            let mut tags = draft.filter.included_tags.clone();
            tags.extend(self.include_tags.iter().cloned());
            actions.push(ConfigAction::IncludeTags(tags));
        }
        if !self.select.is_empty() {
            let mut answers = draft.filter.selected_questions.clone();
            answers.extend(self.select.iter().cloned());
            actions.push(ConfigAction::SelectQuestions(answers));
        }
        if let Some(count) = self.random {
            actions.push(ConfigAction::SetToggle {
                toggle: DeliveryToggle::RandomSelection,
                on: true,
            });
            actions.push(ConfigAction::SetRandomCount(count));
        }
        if let Some((start, end_inclusive)) = self.range {
            actions.push(ConfigAction::SetToggle {
                toggle: DeliveryToggle::RandomSelection,
                on: false,
            });
            actions.push(ConfigAction::SetRange {
                start,
                end_inclusive,
            });
        }
        if self.infinite {
            actions.push(ConfigAction::SetToggle {
                toggle: DeliveryToggle::InfinitePractice,
                on: true,
            });
        }
        if self.suggestions {
            actions.push(ConfigAction::SetToggle {
                toggle: DeliveryToggle::AnswerSuggestions,
                on: true,
            });
        }
        actions
    }
}

async fn load_draft(path: Option<&PathBuf>) -> Result<QuizConfigDraft, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(QuizConfigDraft::default());
    };
    let raw = tokio::fs::read_to_string(path).await?;
    let draft = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), "loaded draft configuration");
    Ok(draft)
}

fn print_overview(overview: &ConfigOverview) {
    println!(
        "{} of {} questions match the filters, {} in this session.",
        overview.eligible_count, overview.total_count, overview.selected_count
    );
}

fn print_feedback(feedback: &AnswerFeedback) {
    if feedback.correct {
        println!("✅ Correct: {}", feedback.expected);
    } else {
        println!("❌ Wrong: {} (you answered {:?})", feedback.expected, feedback.given);
    }
    if !feedback.tags.is_empty() {
        let tags: Vec<&str> = feedback.tags.iter().map(TagName::as_str).collect();
        println!("   tags: {}", tags.join(", "));
    }
    if !feedback.info.is_empty() {
        println!("   {}", feedback.info);
    }
}

fn print_summary(summary: &SessionSummary) {
    let minutes = (summary.completed_at() - summary.started_at()).num_minutes();
    println!(
        "{} of {} answered correctly ({:.0}%) over {} questions in {minutes} min.",
        summary.correct(),
        summary.answered(),
        summary.accuracy() * 100.0,
        summary.question_count(),
    );
    if let Some(tier) = summary.accuracy_tier() {
        println!("{}", tier.emoji());
    }
}

/// Drive one session over stdin until it completes or input ends.
async fn quiz(session: &mut QuizSession) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !session.is_complete() {
        let question = session.current_question()?;
        println!();
        println!("{}", question.prompt);
        if let Some(suggestions) = session.suggestions() {
            println!("   ({})", suggestions.join(" / "));
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let feedback = match session.check_answer(line.trim()) {
            Ok(feedback) => feedback,
            Err(SessionError::BlankAnswer) => continue,
            Err(err) => return Err(err.into()),
        };
        print_feedback(&feedback);
        println!("{}", session.progress());
        session.advance()?;
    }

    if session.is_complete() {
        println!();
        println!("Dat was de laatste! 🎉");
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    logging::init_logging(&logging::LogConfig::from_verbose(parsed.verbose))?;

    let storage = match &parsed.corpus {
        Some(path) => Storage::json_file(path.clone()),
        None => Storage::sample(),
    };
    let loop_svc =
        QuizLoopService::new(Clock::default(), Arc::clone(&storage.corpus)).with_seed(parsed.seed);

    let draft = load_draft(parsed.config.as_ref()).await?;
    let mut editor: ConfigEditor = loop_svc.open_editor(draft).await?;
    let mut overview = editor.overview();
    for action in parsed.config_actions(editor.draft()) {
        overview = editor.update(action);
    }
    print_overview(&overview);

    let mut session = loop_svc.start_session(&editor)?;
    if session.config().delivery().infinite_practice() {
        println!("Infinite practice: close stdin (Ctrl-D) to stop.");
    }
    quiz(&mut session).await?;
    print_summary(&session.summary()?);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut args.iter().map(|arg| (*arg).to_string()))
    }

    #[test]
    fn range_end_is_exclusive_on_the_command_line() {
        assert_eq!(parse_range("0..3").unwrap(), (0, 2));
        assert_eq!(parse_range(" 2 .. 5 ").unwrap(), (2, 4));
        assert!(matches!(parse_range("3..3"), Err(ArgsError::InvalidRange { .. })));
        assert!(matches!(parse_range("3"), Err(ArgsError::InvalidRange { .. })));
    }

    #[test]
    fn flags_collect_filters_and_toggles() {
        let args = parse(&[
            "--random",
            "4",
            "--include-tag",
            "klein",
            "--include-tag",
            "tuin",
            "--select",
            "Merel",
            "--infinite",
        ])
        .unwrap();
        assert_eq!(args.random, Some(4));
        assert_eq!(args.include_tags.len(), 2);
        assert!(args.select.contains("Merel"));
        assert!(args.infinite);
        assert!(!args.suggestions);
    }

    #[test]
    fn bad_flags_are_reported() {
        assert!(matches!(
            parse(&["--random"]),
            Err(ArgsError::MissingValue { flag: "--random" })
        ));
        assert!(matches!(
            parse(&["--seed", "abc"]),
            Err(ArgsError::InvalidNumber { flag: "--seed", .. })
        ));
        assert!(matches!(parse(&["--include-tag", ""]), Err(ArgsError::InvalidTag { .. })));
        assert!(matches!(parse(&["--deck"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn flags_merge_with_the_loaded_draft() {
        let mut draft = QuizConfigDraft::default();
        draft
            .filter
            .excluded_tags
            .insert(TagName::new("nacht").unwrap());
        let args = parse(&["--exclude-tag", "water", "--range", "1..3"]).unwrap();

        let actions = args.config_actions(&draft);
        let ConfigAction::ExcludeTags(tags) = &actions[0] else {
            panic!("expected excluded tags first, got {actions:?}");
        };
        assert_eq!(tags.len(), 2);
        assert!(actions.contains(&ConfigAction::SetRange {
            start: 1,
            end_inclusive: 2,
        }));
    }
}
