//! Goal recommendation boundary.
//!
//! # Responsibility
//! - Validate free-text prompts before they reach the hosted recommender.
//! - Constrain recommended amounts to the widget's enumerated goal options.
//!
//! The recommender itself is an external collaborator; implementations are
//! provided by the embedding host. Failures surface to the caller
//! unchanged — there is no retry.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Goal amounts the recommender is allowed to return.
pub const GOAL_OPTIONS: [i64; 4] = [10_000, 25_000, 50_000, 75_000];

/// Minimum prompt length in characters, measured after trimming.
pub const MIN_PROMPT_CHARS: usize = 10;

pub type RecommendationResult<T> = Result<T, RecommendationError>;

/// Boundary error for the recommendation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    /// Prompt too short to describe a savings goal.
    PromptTooShort {
        min_chars: usize,
        actual_chars: usize,
    },
    /// Recommender returned an amount outside `GOAL_OPTIONS`.
    UnsupportedAmount(i64),
    /// Transport or model failure reported by the collaborator.
    Service(String),
}

impl Display for RecommendationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PromptTooShort {
                min_chars,
                actual_chars,
            } => write!(
                f,
                "prompt must be at least {min_chars} characters, got {actual_chars}"
            ),
            Self::UnsupportedAmount(amount) => {
                write!(f, "recommended amount {amount} is not a supported goal option")
            }
            Self::Service(message) => write!(f, "recommendation service failed: {message}"),
        }
    }
}

impl Error for RecommendationError {}

/// External collaborator proposing a goal amount for a free-text prompt.
pub trait GoalRecommender {
    /// Returns one of `GOAL_OPTIONS` for the given (pre-validated) prompt.
    fn recommend_goal(&self, prompt: &str) -> RecommendationResult<i64>;
}

/// Validates prompt length per the widget's form contract.
///
/// Returns the trimmed prompt that should be forwarded to the recommender.
pub fn validate_prompt(prompt: &str) -> RecommendationResult<&str> {
    let trimmed = prompt.trim();
    let actual_chars = trimmed.chars().count();
    if actual_chars < MIN_PROMPT_CHARS {
        return Err(RecommendationError::PromptTooShort {
            min_chars: MIN_PROMPT_CHARS,
            actual_chars,
        });
    }
    Ok(trimmed)
}

/// Full boundary flow: validates the prompt, delegates to the recommender
/// and rejects any amount outside `GOAL_OPTIONS`.
pub fn recommend_goal_amount<G: GoalRecommender + ?Sized>(
    recommender: &G,
    prompt: &str,
) -> RecommendationResult<i64> {
    let trimmed = validate_prompt(prompt)?;
    let amount = recommender.recommend_goal(trimmed)?;
    if !GOAL_OPTIONS.contains(&amount) {
        return Err(RecommendationError::UnsupportedAmount(amount));
    }
    Ok(amount)
}
