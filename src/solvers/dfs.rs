use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use super::{SearchOutcome, mark_visited, passable_neighbors, reconstruct_path};
use crate::maze::{Coord, Maze};

/// Depth-first search. Finds a path, not necessarily a shortest one.
pub fn solve_dfs(maze: &mut Maze, start: Coord, goal: Coord, cancel: &AtomicBool) -> SearchOutcome {
    let mut stack = vec![start];
    let mut came_from = HashMap::new();
    let mut visited = HashSet::new();

    while let Some(current) = stack.pop() {
        if cancel.load(Ordering::Acquire) {
            return SearchOutcome::Cancelled;
        }

        if current == goal {
            return SearchOutcome::Found(reconstruct_path(&came_from, start, goal));
        }

        if !visited.insert(current) {
            continue;
        }
        mark_visited(maze, current);

        // Push in reverse so the first direction is explored first
        let neighbors = passable_neighbors(current, maze).collect::<Vec<_>>();
        for &neighbor in neighbors.iter().rev() {
            if visited.contains(&neighbor) {
                continue;
            }
            // Latest discovery wins so the back-pointer matches the branch being explored
            came_from.insert(neighbor, current);
            stack.push(neighbor);
        }
    }

    SearchOutcome::NoPath
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::tests::parse;

    #[test]
    fn test_follows_first_direction() {
        // Right is explored before left and down, so DFS snakes through the open grid
        let mut maze = parse(&["S..", "...", "..G"]);
        let outcome = solve_dfs(&mut maze, (0, 0), (2, 2), &AtomicBool::new(false));
        assert_eq!(
            outcome.path().unwrap(),
            &[
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 2),
                (1, 1),
                (1, 0),
                (2, 0),
                (2, 1),
                (2, 2)
            ]
        );
    }
}
