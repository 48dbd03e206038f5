//! Tile and layout domain model.
//!
//! # Responsibility
//! - Define the tile record shared by the generator, storage and progress
//!   tracking.
//! - Provide layout validation used by every persistence write path.
//!
//! # Invariants
//! - `id` is a 0-based ordinal equal to the tile's position in its layout.
//! - Tile values are members of `DENOMINATIONS`, except at most one
//!   remainder tile smaller than the smallest denomination.
//! - A layout stored against goal `g` sums exactly to `g`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable ordinal identifier of a tile within one layout.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TileId = u32;

/// Fixed denomination set for standard tiles, in descending order.
pub const DENOMINATIONS: [i64; 6] = [500, 200, 100, 50, 20, 10];

/// Goal installed on first run when no goal record exists yet.
pub const DEFAULT_GOAL: i64 = 10_000;

/// One discrete unit of a savings goal.
///
/// Immutable once generated: identity and value never change for the
/// lifetime of the surrounding layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// 0-based position of this tile in the shuffled layout.
    pub id: TileId,
    /// Denomination value, or the remainder amount for the single odd tile.
    pub value: i64,
}

/// Ordered sequence of tiles covering one goal.
///
/// Serializes transparently as a JSON array of `{id, value}` objects, the
/// shape of the persisted `tilesLayout` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileLayout {
    tiles: Vec<Tile>,
}

/// Validation failure for a layout record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutValidationError {
    /// A tile id does not match its position in the sequence.
    NonContiguousIds { position: usize, id: TileId },
    /// A tile value is neither a standard denomination nor a legal remainder.
    InvalidValue { id: TileId, value: i64 },
    /// More than one remainder tile is present.
    MultipleRemainderTiles { count: usize },
    /// Layout does not sum to the goal it is stored against.
    SumMismatch { expected: i64, actual: i64 },
}

impl Display for LayoutValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonContiguousIds { position, id } => {
                write!(f, "tile at position {position} carries id {id}")
            }
            Self::InvalidValue { id, value } => {
                write!(f, "tile {id} carries invalid value {value}")
            }
            Self::MultipleRemainderTiles { count } => {
                write!(f, "layout contains {count} remainder tiles, at most one allowed")
            }
            Self::SumMismatch { expected, actual } => {
                write!(f, "layout sums to {actual}, expected goal {expected}")
            }
        }
    }
}

impl Error for LayoutValidationError {}

impl TileLayout {
    /// Wraps an already-ordered tile sequence.
    ///
    /// Callers are responsible for id/value consistency; `validate` checks
    /// it explicitly and every repository write path enforces it.
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles }
    }

    /// Tiles in layout order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Number of tiles in the layout.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns whether the layout holds no tiles.
    ///
    /// An empty layout is the valid zero-progress state for a non-positive
    /// goal, not an error.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Sum of all tile values.
    pub fn total_value(&self) -> i64 {
        self.tiles.iter().map(|tile| tile.value).sum()
    }

    /// Returns whether `id` identifies a tile of this layout.
    pub fn contains(&self, id: TileId) -> bool {
        self.tile_value(id).is_some()
    }

    /// Value of the tile with the given id, if present.
    pub fn tile_value(&self, id: TileId) -> Option<i64> {
        self.tiles
            .get(id as usize)
            .filter(|tile| tile.id == id)
            .map(|tile| tile.value)
    }

    /// Checks structural invariants: contiguous ordinal ids, legal values,
    /// at most one remainder tile.
    pub fn validate(&self) -> Result<(), LayoutValidationError> {
        let mut remainder_tiles = 0usize;

        for (position, tile) in self.tiles.iter().enumerate() {
            if tile.id as usize != position {
                return Err(LayoutValidationError::NonContiguousIds {
                    position,
                    id: tile.id,
                });
            }

            if DENOMINATIONS.contains(&tile.value) {
                continue;
            }
            if tile.value > 0 && tile.value < smallest_denomination() {
                remainder_tiles += 1;
                continue;
            }
            return Err(LayoutValidationError::InvalidValue {
                id: tile.id,
                value: tile.value,
            });
        }

        if remainder_tiles > 1 {
            return Err(LayoutValidationError::MultipleRemainderTiles {
                count: remainder_tiles,
            });
        }

        Ok(())
    }

    /// Checks structural invariants plus the sum-equals-goal contract.
    pub fn validate_for_goal(&self, goal: i64) -> Result<(), LayoutValidationError> {
        self.validate()?;

        let actual = self.total_value();
        if actual != goal {
            return Err(LayoutValidationError::SumMismatch {
                expected: goal,
                actual,
            });
        }

        Ok(())
    }
}

/// Smallest standard denomination; anything below it is remainder territory.
pub fn smallest_denomination() -> i64 {
    DENOMINATIONS[DENOMINATIONS.len() - 1]
}
