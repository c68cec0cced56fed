use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, rngs::StdRng};

use super::{GenerateOutcome, get_unvisited_neighbors};
use crate::maze::{Cell, Maze};

/// Knock extra holes into a carved maze so that it has more than one solution.
///
/// Makes `floor(rows * cols * density)` attempts. Each attempt picks a random
/// interior cell; a wall cell with at least one carve candidate is opened
/// together with the bridge towards a random candidate. Mazes with fewer than
/// three rows or columns have no interior and are left untouched.
pub fn add_redundant_paths(
    maze: &mut Maze,
    density: f64,
    rng: &mut StdRng,
    cancel: &AtomicBool,
) -> GenerateOutcome {
    let (rows, cols) = maze.dimensions();
    if rows < 3 || cols < 3 {
        return GenerateOutcome::Generated;
    }

    let attempts = (rows as f64 * cols as f64 * density.max(0.0)) as usize;
    let mut opened = 0usize;
    for _ in 0..attempts {
        if cancel.load(Ordering::Acquire) {
            return GenerateOutcome::Cancelled;
        }

        let cell = (rng.random_range(1..=rows - 2), rng.random_range(1..=cols - 2));
        if maze[cell] != Cell::Wall {
            continue;
        }
        let candidates = get_unvisited_neighbors(cell, maze);
        if candidates.is_empty() {
            continue;
        }
        let (_, bridge) = candidates[rng.random_range(0..candidates.len())];
        maze.put(bridge, Cell::Open);
        maze.put(cell, Cell::Open);
        opened += 1;
    }

    tracing::debug!(
        "Opened {} redundant passages out of {} attempts",
        opened,
        attempts
    );
    GenerateOutcome::Generated
}
