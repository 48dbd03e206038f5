//! Progress store use-case service.
//!
//! # Responsibility
//! - Own the in-memory goal/layout/completed state and its lifecycle.
//! - Coordinate the partition generator with durable record persistence.
//!
//! # Invariants
//! - Mutating operations are rejected until `load` has completed.
//! - The completed set only ever references ids of the current layout.
//! - Persistence is best-effort: failed reads fall back to defaults, failed
//!   writes are logged and never poison the in-memory session.
//!
//! The service is single-threaded by construction: it is the sole owner and
//! sole mutator of its three records, and every operation runs to
//! completion before the next is issued.

use crate::generator::partition::generate_with;
use crate::model::tile::{TileId, TileLayout, DEFAULT_GOAL};
use crate::repo::progress_repo::ProgressRepository;
use log::{info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProgressResult<T> = Result<T, ProgressError>;

/// Service error for progress-store use-cases.
///
/// Persistence failures never appear here; they are absorbed by the
/// best-effort policy and reported through logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressError {
    /// Mutating call issued before `load` completed.
    NotReady,
    /// Goal must be a positive amount.
    InvalidGoal(i64),
    /// Tile id is not part of the current layout.
    UnknownTile(TileId),
}

impl Display for ProgressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "progress store not loaded yet"),
            Self::InvalidGoal(goal) => write!(f, "goal must be positive, got {goal}"),
            Self::UnknownTile(id) => write!(f, "tile {id} is not part of the current layout"),
        }
    }
}

impl Error for ProgressError {}

/// Use-case service owning the widget's goal, layout and completion state.
pub struct ProgressService<R: ProgressRepository> {
    repo: R,
    rng: Pcg32,
    goal: i64,
    layout: TileLayout,
    completed: BTreeSet<TileId>,
    ready: bool,
}

impl<R: ProgressRepository> ProgressService<R> {
    /// Creates a service with an entropy-seeded random source.
    pub fn new(repo: R) -> Self {
        Self::with_rng(repo, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Creates a service with a deterministic random source.
    ///
    /// Layouts generated from the same seed and call sequence are
    /// reproducible; used by tests and the smoke probe.
    pub fn with_seed(repo: R, seed: u64) -> Self {
        Self::with_rng(repo, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(repo: R, rng: Pcg32) -> Self {
        Self {
            repo,
            rng,
            goal: DEFAULT_GOAL,
            layout: TileLayout::default(),
            completed: BTreeSet::new(),
            ready: false,
        }
    }

    /// Loads the three durable records and marks the store ready.
    ///
    /// # Contract
    /// - Goal defaults to `DEFAULT_GOAL` when absent or unreadable; the
    ///   default is written back best-effort on first run.
    /// - A stored layout that fails validation against the loaded goal is
    ///   regenerated and re-persisted.
    /// - Completed ids not present in the layout are silently dropped.
    /// - Never fails: any read error falls back to in-memory defaults so
    ///   the widget stays usable.
    pub fn load(&mut self) {
        let goal = match self.repo.load_goal() {
            Ok(Some(stored)) if stored > 0 => stored,
            Ok(Some(stored)) => {
                warn!("event=progress_load module=service status=fallback reason=non_positive_goal value={stored}");
                DEFAULT_GOAL
            }
            Ok(None) => {
                if let Err(err) = self.repo.save_goal(DEFAULT_GOAL) {
                    warn!("event=progress_persist module=service status=error record=goal error={err}");
                }
                DEFAULT_GOAL
            }
            Err(err) => {
                warn!("event=progress_load module=service status=fallback record=goal error={err}");
                DEFAULT_GOAL
            }
        };
        self.goal = goal;

        let stored_layout = match self.repo.load_layout() {
            Ok(Some(layout)) => match layout.validate_for_goal(goal) {
                Ok(()) => Some(layout),
                Err(err) => {
                    warn!("event=progress_load module=service status=regenerate record=layout error={err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("event=progress_load module=service status=fallback record=layout error={err}");
                None
            }
        };
        self.layout = match stored_layout {
            Some(layout) => layout,
            None => {
                let fresh = generate_with(goal, &mut self.rng);
                if let Err(err) = self.repo.save_layout(&fresh) {
                    warn!("event=progress_persist module=service status=error record=layout error={err}");
                }
                fresh
            }
        };

        self.completed = match self.repo.load_completed() {
            Ok(Some(ids)) => ids
                .into_iter()
                .filter(|id| self.layout.contains(*id))
                .collect(),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                warn!("event=progress_load module=service status=fallback record=completed error={err}");
                BTreeSet::new()
            }
        };

        self.ready = true;
        info!(
            "event=progress_load module=service status=ok goal={} tiles={} completed={}",
            self.goal,
            self.layout.len(),
            self.completed.len()
        );
    }

    /// Flips completion of one tile and persists the completed-ids record.
    ///
    /// Returns the tile's new membership. Ids outside the current layout
    /// are rejected with `UnknownTile`; toggling the same id twice restores
    /// the prior state.
    pub fn toggle(&mut self, tile_id: TileId) -> ProgressResult<bool> {
        self.ensure_ready()?;
        if !self.layout.contains(tile_id) {
            return Err(ProgressError::UnknownTile(tile_id));
        }

        let now_complete = if self.completed.contains(&tile_id) {
            self.completed.remove(&tile_id);
            false
        } else {
            self.completed.insert(tile_id);
            true
        };

        self.persist_completed();
        Ok(now_complete)
    }

    /// Replaces the goal, regenerates the layout and clears completion.
    ///
    /// All three records are persisted in one atomic write so an
    /// interrupted process never leaves a layout stored against a stale
    /// goal.
    pub fn set_goal(&mut self, new_goal: i64) -> ProgressResult<()> {
        self.ensure_ready()?;
        if new_goal <= 0 {
            return Err(ProgressError::InvalidGoal(new_goal));
        }

        let layout = generate_with(new_goal, &mut self.rng);
        if let Err(err) = self.repo.replace_goal_state(new_goal, &layout) {
            warn!("event=progress_persist module=service status=error record=goal_state error={err}");
        }

        self.goal = new_goal;
        self.layout = layout;
        self.completed.clear();
        info!(
            "event=goal_change module=service status=ok goal={} tiles={}",
            self.goal,
            self.layout.len()
        );
        Ok(())
    }

    /// Clears the completed set and persists it; goal and layout untouched.
    pub fn reset(&mut self) -> ProgressResult<()> {
        self.ensure_ready()?;
        self.completed.clear();
        self.persist_completed();
        Ok(())
    }

    /// Sum of completed tile values. Computed on demand, never stored.
    pub fn derived_sum(&self) -> i64 {
        self.completed
            .iter()
            .filter_map(|id| self.layout.tile_value(*id))
            .sum()
    }

    /// Percentage of goal covered by completed tiles.
    ///
    /// Returns `0.0` for a non-positive goal. Display clamping to
    /// `[0, 100]` is the caller's concern.
    pub fn progress_percent(&self) -> f64 {
        if self.goal <= 0 {
            return 0.0;
        }
        (self.derived_sum() * 100) as f64 / self.goal as f64
    }

    /// Current goal amount.
    pub fn goal(&self) -> i64 {
        self.goal
    }

    /// Current tile layout.
    pub fn layout(&self) -> &TileLayout {
        &self.layout
    }

    /// Ids of tiles the user marked complete.
    pub fn completed(&self) -> &BTreeSet<TileId> {
        &self.completed
    }

    /// Whether `load` has completed and mutations are accepted.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn ensure_ready(&self) -> ProgressResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(ProgressError::NotReady)
        }
    }

    fn persist_completed(&self) {
        if let Err(err) = self.repo.save_completed(&self.completed) {
            warn!("event=progress_persist module=service status=error record=completed error={err}");
        }
    }
}
