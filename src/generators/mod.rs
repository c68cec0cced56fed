use std::sync::atomic::AtomicBool;

use rand::{SeedableRng, rngs::StdRng};

mod recur_backtrack;
mod redundancy;

use recur_backtrack::recursive_backtrack;
use redundancy::add_redundant_paths;

use crate::{
    config::GenerationConfig,
    error::{MazeError, Result},
    maze::{Cell, Coord, Maze},
};

/// Get a random number generator, optionally seeded for reproducibility.
fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Generated,
    Cancelled,
}

/// Snap a coordinate onto the even/even lattice the carve walks on, rounding
/// each axis down.
pub fn normalize_to_lattice(coord: Coord) -> Coord {
    (coord.0 & !1, coord.1 & !1)
}

/// Get carve candidates of a cell.
/// A candidate is a cell two steps away in the cardinal directions that is still a wall
/// and within the maze bounds. Each candidate is paired with the bridge cell between it
/// and `coord`.
fn get_unvisited_neighbors(coord: Coord, maze: &Maze) -> Vec<(Coord, Coord)> {
    let (row, col) = coord;
    [
        (row.checked_sub(2), Some(col)),
        (row.checked_add(2), Some(col)),
        (Some(row), col.checked_sub(2)),
        (Some(row), col.checked_add(2)),
    ]
    .into_iter()
    .filter_map(|(r, c)| Some((r?, c?)))
    .filter(|&c| maze.is_in_bounds(c) && maze[c] == Cell::Wall)
    .map(|(r, c)| {
        // Midpoint of two cells on the same row or column, two steps apart
        let bridge = (row.min(r) + row.abs_diff(r) / 2, col.min(c) + col.abs_diff(c) / 2);
        ((r, c), bridge)
    })
    .collect()
}

/// Carve a maze into `maze`, inject redundant paths, then mark the endpoints.
///
/// `start` is snapped onto the even/even lattice (see [`normalize_to_lattice`]).
/// `goal` is snapped too unless it would land on the start, which happens when
/// it lies in the start's 2x2 block (always the case for 1- or 2-cell wide
/// mazes). Such a goal is kept where it was asked for and, if it is the
/// diagonal neighbour of the start, the corner between them is opened.
/// Returns the final endpoints alongside the outcome.
pub fn generate_maze(
    maze: &mut Maze,
    start: Coord,
    goal: Coord,
    config: &GenerationConfig,
    cancel: &AtomicBool,
) -> Result<(GenerateOutcome, Coord, Coord)> {
    if !(0.0..=1.0).contains(&config.density) {
        return Err(MazeError::InvalidDensity(config.density));
    }
    // Bounds are checked before snapping so callers get their own coordinate back
    maze.get(start)?;
    maze.get(goal)?;
    let start = normalize_to_lattice(start);
    let snapped_goal = normalize_to_lattice(goal);
    let goal_in_start_block = snapped_goal == start;
    let goal = if goal_in_start_block { goal } else { snapped_goal };
    if start == goal {
        return Err(MazeError::InvalidEndpoint {
            coord: goal,
            reason: "start and goal are the same cell",
        });
    }

    let mut rng = get_rng(config.seed);

    if recursive_backtrack(maze, start, &mut rng, cancel) == GenerateOutcome::Cancelled {
        tracing::info!("Maze generation cancelled during carving");
        return Ok((GenerateOutcome::Cancelled, start, goal));
    }
    if add_redundant_paths(maze, config.density, &mut rng, cancel) == GenerateOutcome::Cancelled
    {
        tracing::info!("Maze generation cancelled during redundant path injection");
        return Ok((GenerateOutcome::Cancelled, start, goal));
    }

    if goal_in_start_block && goal.0 != start.0 && goal.1 != start.1 {
        maze.put((start.0, goal.1), Cell::Open);
    }
    maze.put(start, Cell::Start);
    maze.put(goal, Cell::Goal);
    tracing::info!(
        "Generated {}x{} maze with start {:?} and goal {:?}",
        maze.rows(),
        maze.cols(),
        start,
        goal
    );
    Ok((GenerateOutcome::Generated, start, goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::get_neighbors;
    use std::collections::{HashSet, VecDeque};

    fn config(rows: u16, cols: u16, seed: u64) -> GenerationConfig {
        GenerationConfig {
            rows,
            cols,
            density: 0.15,
            seed: Some(seed),
        }
    }

    fn generate(rows: u16, cols: u16, seed: u64) -> Maze {
        let mut maze = Maze::new(rows, cols).unwrap();
        let (outcome, _, _) = generate_maze(
            &mut maze,
            (0, 0),
            (rows - 1, cols - 1),
            &config(rows, cols, seed),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(outcome, GenerateOutcome::Generated);
        maze
    }

    #[test]
    fn test_normalize_to_lattice() {
        assert_eq!(normalize_to_lattice((0, 0)), (0, 0));
        assert_eq!(normalize_to_lattice((3, 4)), (2, 4));
        assert_eq!(normalize_to_lattice((5, 7)), (4, 6));
    }

    #[test]
    fn test_get_unvisited_neighbors() {
        let maze = Maze::new(7, 7).unwrap();
        let neighbors = get_unvisited_neighbors((2, 2), &maze);
        assert_eq!(
            neighbors,
            vec![
                ((0, 2), (1, 2)),
                ((4, 2), (3, 2)),
                ((2, 0), (2, 1)),
                ((2, 4), (2, 3))
            ]
        );
        assert_eq!(get_unvisited_neighbors((0, 0), &maze).len(), 2);
    }

    #[test]
    fn test_single_start_and_goal() {
        for seed in 0..5 {
            let maze = generate(15, 21, seed);
            assert_eq!(maze.find_unique(Cell::Start).unwrap(), (0, 0));
            assert_eq!(maze.find_unique(Cell::Goal).unwrap(), (14, 20));
        }
    }

    /// Panics unless every passable cell can be reached from the start.
    fn assert_all_reachable(maze: &Maze) {
        let start = maze.find_unique(Cell::Start).unwrap();

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for n in get_neighbors(current, maze) {
                if maze[n].is_passable() && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        let passable = maze.cells().iter().filter(|c| c.is_passable()).count();
        assert_eq!(seen.len(), passable, "maze has an island:\n{}", maze);
    }

    #[test]
    fn test_every_open_cell_reachable_from_start() {
        for seed in 0..10 {
            assert_all_reachable(&generate(21, 17, seed));
        }
    }

    #[test]
    fn test_lattice_fully_carved() {
        let maze = generate(11, 13, 42);
        for row in (0..11).step_by(2) {
            for col in (0..13).step_by(2) {
                assert!(maze[(row, col)].is_passable(), "({}, {})", row, col);
            }
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = generate(15, 15, 7);
        let b = generate(15, 15, 7);
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn test_endpoints_snapped_to_lattice() {
        let mut maze = Maze::new(9, 9).unwrap();
        let (_, start, goal) = generate_maze(
            &mut maze,
            (1, 3),
            (7, 8),
            &config(9, 9, 1),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(start, (0, 2));
        assert_eq!(goal, (6, 8));
        assert_eq!(maze[(0, 2)], Cell::Start);
        assert_eq!(maze[(6, 8)], Cell::Goal);
    }

    #[test]
    fn test_coinciding_endpoints_rejected() {
        let mut maze = Maze::new(9, 9).unwrap();
        let result = generate_maze(
            &mut maze,
            (3, 3),
            (2, 2),
            &config(9, 9, 1),
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(MazeError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_goal_in_start_block_kept_in_place() {
        for goal in [(2, 3), (3, 2), (3, 3)] {
            let mut maze = Maze::new(9, 9).unwrap();
            let (_, start, kept) = generate_maze(
                &mut maze,
                (2, 2),
                goal,
                &config(9, 9, 1),
                &AtomicBool::new(false),
            )
            .unwrap();
            assert_eq!((start, kept), ((2, 2), goal));
            assert_eq!(maze[goal], Cell::Goal);
            assert_all_reachable(&maze);
        }
    }

    #[test]
    fn test_density_outside_unit_range_rejected() {
        for density in [-0.1, 1.5, f64::INFINITY, f64::NAN] {
            let mut maze = Maze::new(9, 9).unwrap();
            let mut config = config(9, 9, 1);
            config.density = density;
            let result = generate_maze(
                &mut maze,
                (0, 0),
                (8, 8),
                &config,
                &AtomicBool::new(false),
            );
            assert!(matches!(result, Err(MazeError::InvalidDensity(_))));
        }
    }

    #[test]
    fn test_out_of_bounds_endpoint_rejected() {
        let mut maze = Maze::new(5, 5).unwrap();
        let result = generate_maze(
            &mut maze,
            (0, 0),
            (5, 0),
            &config(5, 5, 1),
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(MazeError::OutOfBounds { .. })));
    }

    #[test]
    fn test_tiny_grid_only_start_open() {
        let mut maze = Maze::new(1, 2).unwrap();
        let (outcome, _, goal) = generate_maze(
            &mut maze,
            (0, 0),
            (0, 1),
            &config(1, 2, 3),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(outcome, GenerateOutcome::Generated);
        assert_eq!(goal, (0, 1));
        assert_eq!(maze.cells(), &[Cell::Start, Cell::Goal]);

        let mut maze = Maze::new(2, 2).unwrap();
        generate_maze(
            &mut maze,
            (0, 0),
            (1, 1),
            &config(2, 2, 3),
            &AtomicBool::new(false),
        )
        .unwrap();
        assert_eq!(
            maze.cells(),
            &[Cell::Start, Cell::Open, Cell::Wall, Cell::Goal]
        );
        assert_all_reachable(&maze);

        let mut maze = Maze::new(1, 1).unwrap();
        let result = generate_maze(
            &mut maze,
            (0, 0),
            (0, 0),
            &config(1, 1, 3),
            &AtomicBool::new(false),
        );
        assert!(matches!(result, Err(MazeError::InvalidEndpoint { .. })));

        let mut maze = Maze::new(2, 2).unwrap();
        let mut rng = get_rng(Some(3));
        let outcome =
            recursive_backtrack(&mut maze, (0, 0), &mut rng, &AtomicBool::new(false));
        assert_eq!(outcome, GenerateOutcome::Generated);
        assert_eq!(
            maze.cells(),
            &[Cell::Open, Cell::Wall, Cell::Wall, Cell::Wall]
        );
    }

    #[test]
    fn test_cancelled_before_carving() {
        let mut maze = Maze::new(9, 9).unwrap();
        let (outcome, _, _) = generate_maze(
            &mut maze,
            (0, 0),
            (8, 8),
            &config(9, 9, 1),
            &AtomicBool::new(true),
        )
        .unwrap();
        assert_eq!(outcome, GenerateOutcome::Cancelled);
        assert!(maze.find_unique(Cell::Start).is_err());
    }
}
