use std::{collections::HashMap, sync::atomic::AtomicBool};

mod astar;
mod bfs;
mod dfs;

use astar::solve_astar;
use bfs::solve_bfs;
use dfs::solve_dfs;

use crate::{
    error::{MazeError, Result},
    maze::{Cell, Coord, Maze, get_neighbors},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    AStar,
    Bfs,
    Dfs,
}

impl Solver {
    pub const ALL: [Solver; 3] = [Solver::Dfs, Solver::AStar, Solver::Bfs];

    /// Prefix used for solved maze files, e.g. `aStar_3.csv`.
    pub fn slug(&self) -> &'static str {
        match self {
            Solver::AStar => "aStar",
            Solver::Bfs => "bfs",
            Solver::Dfs => "dfs",
        }
    }
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::AStar => write!(f, "A* Search"),
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
        }
    }
}

/// Result of a search run. An unreachable goal is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Ordered cells from start to goal, both inclusive
    Found(Vec<Coord>),
    /// Frontier exhausted without reaching the goal
    NoPath,
    /// The cancel flag was raised before the search finished
    Cancelled,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&[Coord]> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// Search from `start` to `goal` with the selected algorithm.
///
/// Expanded cells are annotated as `Visited` in visitation order (`Start` and
/// `Goal` cells keep their codes), which is what an attached event sink animates.
/// `cancel` is checked once per iteration.
pub fn search(
    maze: &mut Maze,
    solver: Solver,
    start: Coord,
    goal: Coord,
    cancel: &AtomicBool,
) -> Result<SearchOutcome> {
    validate_endpoint(maze, start)?;
    validate_endpoint(maze, goal)?;

    if start == goal {
        return Ok(SearchOutcome::Found(vec![start]));
    }

    let outcome = match solver {
        Solver::AStar => solve_astar(maze, start, goal, cancel),
        Solver::Bfs => solve_bfs(maze, start, goal, cancel),
        Solver::Dfs => solve_dfs(maze, start, goal, cancel),
    };
    match &outcome {
        SearchOutcome::Found(path) => {
            tracing::debug!("{} found a path of {} cells", solver, path.len())
        }
        SearchOutcome::NoPath => tracing::debug!("{} exhausted the frontier", solver),
        SearchOutcome::Cancelled => tracing::debug!("{} was cancelled", solver),
    }
    Ok(outcome)
}

/// Locate the maze's unique `Start` and `Goal` cells and search between them.
pub fn solve_maze(maze: &mut Maze, solver: Solver, cancel: &AtomicBool) -> Result<SearchOutcome> {
    let start = maze.find_unique(Cell::Start)?;
    let goal = maze.find_unique(Cell::Goal)?;
    search(maze, solver, start, goal, cancel)
}

fn validate_endpoint(maze: &Maze, coord: Coord) -> Result<()> {
    if maze.get(coord)? == Cell::Wall {
        return Err(MazeError::InvalidEndpoint {
            coord,
            reason: "endpoint lies on a wall",
        });
    }
    Ok(())
}

/// In-bounds, non-wall neighbors of `coord`.
fn passable_neighbors(coord: Coord, maze: &Maze) -> impl Iterator<Item = Coord> + '_ {
    get_neighbors(coord, maze).filter(move |&c| maze[c].is_passable())
}

/// Annotate an expanded cell, leaving the endpoints untouched.
fn mark_visited(maze: &mut Maze, coord: Coord) {
    if !matches!(maze[coord], Cell::Start | Cell::Goal) {
        maze.put(coord, Cell::Visited);
    }
}

/// Follow back-pointers from `goal` until `start` and return the path in forward order.
fn reconstruct_path(came_from: &HashMap<Coord, Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}
