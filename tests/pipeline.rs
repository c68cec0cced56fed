use std::{path::Path, sync::atomic::AtomicBool};

use mazerun::{
    config::Config,
    error::MazeError,
    jobs,
    maze::Cell,
    solvers::{SearchOutcome, Solver},
    store,
};

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.generation.rows = 15;
    config.generation.cols = 21;
    config.generation.seed = Some(7);
    config.store.input_dir = dir.join("input");
    config.store.csv_output_dir = dir.join("csv");
    config.store.pdf_output_dir = dir.join("pdf");
    config
}

fn path_len(outcome: &SearchOutcome) -> usize {
    outcome.path().map(|path| path.len()).unwrap_or_default()
}

#[test]
fn test_generate_then_solve_with_every_algorithm() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let cancel = AtomicBool::new(false);

    let generated = jobs::generate(&config, (0, 0), (14, 20), None, &cancel)
        .unwrap()
        .unwrap();
    assert_eq!(generated.index, 1);
    assert_eq!(generated.path, config.store.input_dir.join("maze_1.csv"));
    assert!(generated.path.exists());

    let astar = jobs::solve(&config, Solver::AStar, None, None, &cancel).unwrap();
    let bfs = jobs::solve(&config, Solver::Bfs, None, None, &cancel).unwrap();
    let dfs = jobs::solve(&config, Solver::Dfs, None, None, &cancel).unwrap();

    // Both shortest-path searches agree on the length
    assert!(path_len(&astar.outcome) > 0);
    assert_eq!(path_len(&astar.outcome), path_len(&bfs.outcome));
    assert!(path_len(&dfs.outcome) >= path_len(&bfs.outcome));

    for (solver, solved) in [(Solver::AStar, &astar), (Solver::Bfs, &bfs), (Solver::Dfs, &dfs)] {
        assert_eq!(solved.index, 1);
        let (csv, pdf) = solved.files.clone().unwrap();
        assert_eq!(csv, store::solution_paths(&config.store, solver, 1).0);
        assert!(csv.exists());
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF-"));

        let saved = store::load_maze(&csv).unwrap();
        assert_eq!(saved.find_unique(Cell::Start).unwrap(), (0, 0));
        assert_eq!(saved.find_unique(Cell::Goal).unwrap(), (14, 20));
        assert!(saved.cells().contains(&Cell::FinalPath));
    }
}

#[test]
fn test_generated_indices_increase() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    let cancel = AtomicBool::new(false);

    let first = jobs::generate(&config, (0, 0), (14, 20), None, &cancel)
        .unwrap()
        .unwrap();
    config.generation.seed = Some(8);
    let second = jobs::generate(&config, (0, 0), (14, 20), None, &cancel)
        .unwrap()
        .unwrap();
    assert_eq!((first.index, second.index), (1, 2));

    // The solver picks the newest maze
    let solved = jobs::solve(&config, Solver::Bfs, None, None, &cancel).unwrap();
    assert_eq!(solved.index, 2);
    assert_eq!(solved.maze.cells().len(), 15 * 21);
}

#[test]
fn test_solved_file_can_be_solved_again() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let cancel = AtomicBool::new(false);

    jobs::generate(&config, (0, 0), (14, 20), None, &cancel)
        .unwrap()
        .unwrap();
    let first = jobs::solve(&config, Solver::AStar, None, None, &cancel).unwrap();
    let (csv, _) = first.files.unwrap();

    let again = jobs::solve(&config, Solver::Bfs, Some(&csv), None, &cancel).unwrap();
    assert_eq!(path_len(&again.outcome), path_len(&first.outcome));
    // Not a maze_<N>.csv name
    assert_eq!(again.index, 0);
}

#[test]
fn test_solve_without_mazes_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let result = jobs::solve(&config, Solver::AStar, None, None, &AtomicBool::new(false));
    assert!(matches!(result, Err(MazeError::NoMazeFiles(_))));
}

#[test]
fn test_cancelled_generation_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let generated = jobs::generate(&config, (0, 0), (14, 20), None, &AtomicBool::new(true)).unwrap();
    assert!(generated.is_none());
    assert!(store::latest_maze(&config.store.input_dir).unwrap().is_none());
}
