//! Read-only progress and accuracy reporting.

use std::fmt;

use serde::Serialize;

use crate::queue::INFINITE_QUEUE_LEN;
use crate::session::SessionState;

/// Accuracy bucket, from a perfect score down to almost nothing right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTier {
    Perfect,
    Excellent,
    VeryGood,
    Good,
    Average,
    BelowAverage,
    Poor,
    VeryPoor,
    ExtremelyPoor,
}

impl AccuracyTier {
    /// Step function over an accuracy fraction; the highest threshold met wins.
    #[must_use]
    pub fn from_fraction(fraction: f64) -> Self {
        match fraction {
            f if f >= 1.0 => Self::Perfect,
            f if f >= 0.9 => Self::Excellent,
            f if f >= 0.8 => Self::VeryGood,
            f if f >= 0.7 => Self::Good,
            f if f >= 0.6 => Self::Average,
            f if f >= 0.5 => Self::BelowAverage,
            f if f >= 0.4 => Self::Poor,
            f if f >= 0.2 => Self::VeryPoor,
            _ => Self::ExtremelyPoor,
        }
    }

    /// 0 for [`AccuracyTier::Perfect`] up to 8 for [`AccuracyTier::ExtremelyPoor`].
    #[must_use]
    pub fn level(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Perfect => "😁",
            Self::Excellent => "😊",
            Self::VeryGood => "🙂",
            Self::Good => "😌",
            Self::Average => "😐",
            Self::BelowAverage => "😕",
            Self::Poor => "🙁",
            Self::VeryPoor => "😢",
            Self::ExtremelyPoor => "😭",
        }
    }
}

/// Snapshot of how far a session has come and how well it is going.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub done_fraction: f64,
    pub done_count: usize,
    pub total_count: usize,
    pub n_correct: usize,
    pub n_seen: usize,
    pub accuracy_fraction: f64,
    /// `None` until the first answer has been checked.
    pub accuracy_tier: Option<AccuracyTier>,
}

/// Compute progress for `state`. Pure; calling it twice gives the same result.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(state: &SessionState) -> Progress {
    let total_count = if state.infinite_practice() {
        INFINITE_QUEUE_LEN
    } else {
        state.n_questions()
    };
    let done_count = total_count.saturating_sub(state.remaining());
    let done_fraction = if total_count == 0 {
        0.0
    } else {
        (done_count as f64 / total_count as f64).clamp(0.0, 1.0)
    };

    let n_seen = state.seen().len();
    let n_correct = state.n_correct();
    let (accuracy_fraction, accuracy_tier) = if n_seen == 0 {
        (0.0, None)
    } else {
        let fraction = n_correct as f64 / n_seen as f64;
        (fraction, Some(AccuracyTier::from_fraction(fraction)))
    };

    Progress {
        done_fraction,
        done_count,
        total_count,
        n_correct,
        n_seen,
        accuracy_fraction,
        accuracy_tier,
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {:.0}% ({}/{}) -- Correct: {:.0}% ({}/{})",
            self.done_fraction * 100.0,
            self.done_count,
            self.total_count,
            self.accuracy_fraction * 100.0,
            self.n_correct,
            self.n_seen,
        )?;
        if let Some(tier) = self.accuracy_tier {
            write!(f, " {}", tier.emoji())?;
        }
        Ok(())
    }
}
