//! Randomized greedy partitioning of a goal into denomination tiles.
//!
//! # Responsibility
//! - Split a positive goal into a shuffled sequence of denomination tiles
//!   that sums exactly to the goal.
//! - Bias draws toward smaller denominations so layouts keep a mix of tile
//!   sizes instead of collapsing into the largest values.
//!
//! # Invariants
//! - The generated layout sums exactly to the requested goal.
//! - At most one tile per layout carries a non-standard remainder value,
//!   and only when the remaining amount is below every denomination.
//! - `goal <= 0` produces an empty layout, never an error.

use crate::model::tile::{Tile, TileId, TileLayout, DENOMINATIONS};
use once_cell::sync::Lazy;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// Weighted draw pool: denomination `d` appears `ceil(500 / (2 * d))` times
/// (500 once, 200 twice, 100 three times, 50 five, 20 thirteen, 10
/// twenty-five), so one uniform draw over the pool favors small tiles.
static WEIGHTED_POOL: Lazy<Vec<i64>> = Lazy::new(|| {
    DENOMINATIONS
        .iter()
        .flat_map(|&denomination| {
            let copies = (500 + 2 * denomination - 1) / (2 * denomination);
            std::iter::repeat(denomination).take(copies as usize)
        })
        .collect()
});

/// Partitions `goal` into a shuffled tile layout using the thread RNG.
///
/// Callers treat the empty layout returned for `goal <= 0` as a valid
/// zero-progress state.
pub fn generate(goal: i64) -> TileLayout {
    generate_with(goal, &mut rand::rng())
}

/// Partitions `goal` using the provided random source.
///
/// # Contract
/// - The returned layout sums exactly to `goal` for any `goal > 0`.
/// - Tile ids reflect final shuffled positions, so tile order carries no
///   information about draw order.
/// - Identical `goal` and RNG state produce identical layouts.
pub fn generate_with<R: Rng + ?Sized>(goal: i64, rng: &mut R) -> TileLayout {
    if goal <= 0 {
        return TileLayout::default();
    }

    let mut values: Vec<i64> = Vec::new();
    let mut remaining = goal;

    while remaining > 0 {
        let eligible: Vec<i64> = WEIGHTED_POOL
            .iter()
            .copied()
            .filter(|&candidate| candidate <= remaining)
            .collect();

        let value = if let Some(&drawn) = eligible.choose(rng) {
            drawn
        } else if let Some(largest_fit) = DENOMINATIONS.iter().copied().find(|&d| d <= remaining) {
            // Unreachable while the pool carries the smallest denomination;
            // keeps termination independent of the pool's contents.
            largest_fit
        } else {
            // Remaining amount is below every denomination: close the
            // layout with a single remainder tile.
            values.push(remaining);
            break;
        };

        values.push(value);
        remaining -= value;
    }

    values.shuffle(rng);

    let tiles = values
        .into_iter()
        .enumerate()
        .map(|(position, value)| Tile {
            id: position as TileId,
            value,
        })
        .collect();

    TileLayout::from_tiles(tiles)
}
