use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use super::{SearchOutcome, mark_visited, passable_neighbors, reconstruct_path};
use crate::maze::{Coord, Maze};

/// Open-set entry. Field order gives the heap ordering: lowest `f` first,
/// then earliest insertion for reproducible tie-breaking.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenEntry {
    /// Estimated total cost `g + h`
    f: usize,
    /// Insertion sequence number
    seq: usize,
    coord: Coord,
}

/// Manhattan distance, admissible and consistent on a 4-connected unit-cost grid.
fn heuristic(a: Coord, b: Coord) -> usize {
    a.0.abs_diff(b.0) as usize + a.1.abs_diff(b.1) as usize
}

pub fn solve_astar(
    maze: &mut Maze,
    start: Coord,
    goal: Coord,
    cancel: &AtomicBool,
) -> SearchOutcome {
    // Using Reverse to turn the max-heap into a min-heap
    let mut open: BinaryHeap<Reverse<OpenEntry>> = BinaryHeap::new();
    let mut seq = 0;
    open.push(Reverse(OpenEntry {
        f: heuristic(start, goal),
        seq,
        coord: start,
    }));

    let mut came_from = HashMap::new();
    let mut g_score = HashMap::from([(start, 0usize)]);
    let mut closed = HashSet::new();

    while let Some(Reverse(current)) = open.pop() {
        if cancel.load(Ordering::Acquire) {
            return SearchOutcome::Cancelled;
        }

        // Stale duplicate of a cell that was already expanded with a better score
        if !closed.insert(current.coord) {
            continue;
        }

        if current.coord == goal {
            return SearchOutcome::Found(reconstruct_path(&came_from, start, goal));
        }

        mark_visited(maze, current.coord);

        let tentative_g = g_score[&current.coord] + 1;
        let neighbors = passable_neighbors(current.coord, maze).collect::<Vec<_>>();
        for neighbor in neighbors {
            let is_better = g_score
                .get(&neighbor)
                .is_none_or(|&existing| tentative_g < existing);
            if !is_better {
                continue;
            }
            g_score.insert(neighbor, tentative_g);
            came_from.insert(neighbor, current.coord);
            seq += 1;
            open.push(Reverse(OpenEntry {
                f: tentative_g + heuristic(neighbor, goal),
                seq,
                coord: neighbor,
            }));
        }
    }

    SearchOutcome::NoPath
}
