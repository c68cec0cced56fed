//! One generate or solve run, from files on disk back to files on disk.
//!
//! Both jobs take an optional event sink, which the terminal renderer uses to
//! animate the run, and a cancel flag checked once per algorithm iteration.

use std::{
    path::{Path, PathBuf},
    sync::{atomic::AtomicBool, mpsc::SyncSender},
};

use crate::{
    config::Config,
    error::Result,
    generators::{GenerateOutcome, generate_maze},
    maze::{Coord, Maze, grid::GridEvent},
    solvers::{SearchOutcome, Solver, solve_maze},
    store,
};

/// A freshly generated and saved maze.
pub struct Generated {
    pub index: u32,
    pub path: PathBuf,
    pub start: Coord,
    pub goal: Coord,
    pub maze: Maze,
}

/// A finished search over a stored maze.
pub struct Solved {
    /// Index of the `maze_<N>.csv` that was solved
    pub index: u32,
    pub outcome: SearchOutcome,
    /// Written `(csv, pdf)` files, present only when a path was found
    pub files: Option<(PathBuf, PathBuf)>,
    pub maze: Maze,
}

/// Generate a maze with the configured dimensions and append it to the input directory.
/// Returns `None` when cancelled; nothing is written in that case.
pub fn generate(
    config: &Config,
    start: Coord,
    goal: Coord,
    events: Option<SyncSender<GridEvent>>,
    cancel: &AtomicBool,
) -> Result<Option<Generated>> {
    let generation = &config.generation;
    let mut maze = Maze::new(generation.rows, generation.cols)?;
    if let Some(events) = events {
        maze.attach_events(events);
    }
    let result = generate_maze(&mut maze, start, goal, generation, cancel);
    // Always end the trace, even on error, so the renderer can finish
    maze.detach_events();

    let (outcome, start, goal) = result?;
    if outcome == GenerateOutcome::Cancelled {
        return Ok(None);
    }
    let (index, path) = store::save_new_maze(&maze, &config.store)?;
    Ok(Some(Generated {
        index,
        path,
        start,
        goal,
        maze,
    }))
}

/// Solve the latest maze in the input directory, or `input` when given, and save
/// the solution when a path is found.
pub fn solve(
    config: &Config,
    solver: Solver,
    input: Option<&Path>,
    events: Option<SyncSender<GridEvent>>,
    cancel: &AtomicBool,
) -> Result<Solved> {
    let (index, mut maze) = match input {
        Some(path) => {
            let index = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(store::parse_maze_index)
                .unwrap_or_else(|| {
                    tracing::warn!(
                        "{} is not named maze_<N>.csv, saving results under index 0",
                        path.display()
                    );
                    0
                });
            (index, store::load_maze(path)?)
        }
        None => store::load_latest_maze(&config.store)?,
    };
    // A previously solved file still carries its annotations
    maze.clear_annotations();

    if let Some(events) = events {
        maze.attach_events(events);
    }
    let result = solve_maze(&mut maze, solver, cancel).and_then(|outcome| {
        if let SearchOutcome::Found(path) = &outcome {
            maze.mark_path(path)?;
        }
        Ok(outcome)
    });
    maze.detach_events();
    let outcome = result?;

    let files = match &outcome {
        SearchOutcome::Found(path) => {
            tracing::info!("{} found a path of {} cells in maze {}", solver, path.len(), index);
            Some(store::save_solution(
                &maze,
                &config.store,
                &config.palette,
                solver,
                index,
            )?)
        }
        SearchOutcome::NoPath => {
            tracing::info!("{} found no path in maze {}", solver, index);
            None
        }
        SearchOutcome::Cancelled => {
            tracing::info!("{} was cancelled on maze {}", solver, index);
            None
        }
    };
    Ok(Solved {
        index,
        outcome,
        files,
        maze,
    })
}
