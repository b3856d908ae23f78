//! Benchmark profiles for the Motif sequence grid.
//!
//! - [`reference_grid`]: the default 11×7 grid, fully populated
//! - [`stress_grid`]: 64×64 grid (4096 cells), fully populated
//! - [`sparse_grid`]: deterministic partial population

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use motif_core::{GridPos, Note, Sequence};
use motif_grid::{GridBounds, GridStore};

/// A short quantized phrase whose pitches start at `base`.
pub fn phrase(base: u8) -> Sequence {
    let notes = (0..8u32)
        .map(|i| Note::quantized(base.wrapping_add(i as u8 * 2), i * 4, i * 4 + 2))
        .collect();
    Sequence::quantized_from(notes, 4, 64)
}

/// Every position of a `cols`×`rows` grid holds a phrase.
pub fn full_grid(cols: u32, rows: u32) -> GridStore {
    let mut grid = GridStore::new(GridBounds::new(cols, rows).expect("bench dims are valid"));
    let positions: Vec<GridPos> = grid.bounds().positions().collect();
    for (i, pos) in positions.into_iter().enumerate() {
        let _ = grid.place_square(pos, Some(phrase(36 + (i % 48) as u8)), false);
    }
    grid
}

/// Default 11×7 grid, fully populated (77 cells).
pub fn reference_grid() -> GridStore {
    full_grid(11, 7)
}

/// 64×64 grid, fully populated (4096 cells).
pub fn stress_grid() -> GridStore {
    full_grid(64, 64)
}

/// A `cols`×`rows` grid with roughly `percent`% of positions occupied,
/// chosen by a fixed multiplicative hash of the position index.
pub fn sparse_grid(cols: u32, rows: u32, percent: u64) -> GridStore {
    let mut grid = GridStore::new(GridBounds::new(cols, rows).expect("bench dims are valid"));
    let positions: Vec<GridPos> = grid.bounds().positions().collect();
    for (i, pos) in positions.into_iter().enumerate() {
        let h = (i as u64).wrapping_mul(6364136223846793007) >> 33;
        if h % 100 < percent {
            let _ = grid.place_square(pos, Some(phrase(48)), false);
        }
    }
    grid
}
