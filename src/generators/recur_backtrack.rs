use std::sync::atomic::{AtomicBool, Ordering};

use rand::{Rng, rngs::StdRng};

use super::{GenerateOutcome, get_unvisited_neighbors};
use crate::maze::{Cell, Coord, Maze};

/// Randomized depth-first carve over the 2-step lattice rooted at `start`.
///
/// On completion the open cells form a spanning tree of passages: every lattice
/// cell reachable from `start` is open and joined by exactly one route.
pub fn recursive_backtrack(
    maze: &mut Maze,
    start: Coord,
    rng: &mut StdRng,
    cancel: &AtomicBool,
) -> GenerateOutcome {
    // Initialize the maze with walls
    (0..maze.rows()).for_each(|row| {
        (0..maze.cols()).for_each(|col| {
            maze.put((row, col), Cell::Wall);
        })
    });

    maze.put(start, Cell::Open);

    // The stack will keep only open cells
    let mut stack = vec![start];
    let mut carved = 0usize;

    while let Some(&cell) = stack.last() {
        if cancel.load(Ordering::Acquire) {
            return GenerateOutcome::Cancelled;
        }

        let neighbors = get_unvisited_neighbors(cell, maze);
        if neighbors.is_empty() {
            // Dead end, backtrack
            stack.pop();
            continue;
        }

        let (next, bridge) = neighbors[rng.random_range(0..neighbors.len())];
        maze.put(bridge, Cell::Open);
        maze.put(next, Cell::Open);
        carved += 1;
        // Carve onwards from the new cell; this one stays below it for backtracking
        stack.push(next);
    }

    tracing::debug!("Carved {} passages from {:?}", carved, start);
    GenerateOutcome::Generated
}
