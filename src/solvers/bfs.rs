use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicBool, Ordering},
};

use super::{SearchOutcome, mark_visited, passable_neighbors, reconstruct_path};
use crate::maze::{Coord, Maze};

/// Breadth-first search. Every cell enters the queue at most once, guarded by
/// `came_from` at enqueue time, so the first time the goal is dequeued its
/// back-pointers form a shortest path.
pub fn solve_bfs(maze: &mut Maze, start: Coord, goal: Coord, cancel: &AtomicBool) -> SearchOutcome {
    let mut queue = VecDeque::from([start]);
    let mut came_from = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if cancel.load(Ordering::Acquire) {
            return SearchOutcome::Cancelled;
        }

        // Goal test happens before the cell is annotated or expanded
        if current == goal {
            return SearchOutcome::Found(reconstruct_path(&came_from, start, goal));
        }

        mark_visited(maze, current);

        let neighbors = passable_neighbors(current, maze).collect::<Vec<_>>();
        for neighbor in neighbors {
            if neighbor == start || came_from.contains_key(&neighbor) {
                continue;
            }
            came_from.insert(neighbor, current);
            queue.push_back(neighbor);
        }
    }

    SearchOutcome::NoPath
}
