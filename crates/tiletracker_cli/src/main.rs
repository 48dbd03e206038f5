//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tiletracker_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tiletracker_core::{generate_with, DEFAULT_GOAL};

fn main() {
    println!("tiletracker_core ping={}", tiletracker_core::ping());
    println!(
        "tiletracker_core version={}",
        tiletracker_core::core_version()
    );

    // Seeded sample partition so repeated runs print identical output.
    let mut rng = Pcg32::seed_from_u64(2024);
    let layout = generate_with(DEFAULT_GOAL, &mut rng);
    println!(
        "sample goal={DEFAULT_GOAL} tiles={} sum={}",
        layout.len(),
        layout.total_value()
    );
}
