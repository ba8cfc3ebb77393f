//! Score → qualitative feedback.

use std::fmt;

use serde::Serialize;

/// Feedback tiers, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    NeedsImprovement,
}

/// Minimum score per tier, checked highest first.
const TIERS: [(u8, FeedbackTier); 2] = [
    (90, FeedbackTier::Excellent),
    (70, FeedbackTier::Good),
];

impl FeedbackTier {
    pub fn for_score(score: u8) -> Self {
        TIERS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(FeedbackTier::NeedsImprovement)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent",
            FeedbackTier::Good => "Good",
            FeedbackTier::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A score with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub tier: FeedbackTier,
    pub score: u8,
}

impl Feedback {
    pub fn for_score(score: u8) -> Self {
        Self {
            tier: FeedbackTier::for_score(score),
            score,
        }
    }

    /// User-facing message for this tier.
    pub fn message(&self) -> String {
        let score = self.score;
        match self.tier {
            FeedbackTier::Excellent => {
                format!("🏆 Excellent! Your score is {score}/100. Keep up the great work!")
            }
            FeedbackTier::Good => {
                format!("👍 Good job! Your score is {score}/100. Some improvements needed.")
            }
            FeedbackTier::NeedsImprovement => format!(
                "⚠️ Needs Improvement! Your score is {score}/100. Optimize for better performance."
            ),
        }
    }
}

/// Present a score.
pub fn feedback(score: u8) -> Feedback {
    Feedback::for_score(score)
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
