//! Core domain logic for the TileTracker savings widget.
//! This crate is the single source of truth for layout and progress
//! invariants.

pub mod db;
pub mod generator;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use generator::partition::{generate, generate_with};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::tile::{
    LayoutValidationError, Tile, TileId, TileLayout, DEFAULT_GOAL, DENOMINATIONS,
};
pub use repo::progress_repo::{
    ProgressRepository, RepoError, RepoResult, SqliteProgressRepository,
};
pub use service::progress::{ProgressError, ProgressResult, ProgressService};
pub use service::recommendation::{
    recommend_goal_amount, validate_prompt, GoalRecommender, RecommendationError,
    RecommendationResult, GOAL_OPTIONS, MIN_PROMPT_CHARS,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
