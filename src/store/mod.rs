//! Maze files on disk.
//!
//! Generated mazes are appended to the input directory as `maze_<N>.csv`, where
//! `N` is one more than the largest index already present. Solvers pick the
//! file with the largest index and write their results to
//! `<csv_dir>/<slug>/<slug>_<N>.csv` and `<pdf_dir>/<slug>/<slug>_<N>.pdf`.

mod csv_codec;
mod pdf;

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

pub use csv_codec::{read_maze, write_maze};
pub use pdf::{CellRect, PageLayout, layout_page, render_pdf, write_pdf};

use crate::{
    config::{Palette, StoreConfig},
    error::{MazeError, Result},
    maze::Maze,
    solvers::Solver,
};

const MAZE_PREFIX: &str = "maze_";
const CSV_EXT: &str = ".csv";

pub fn maze_file_name(index: u32) -> String {
    format!("{MAZE_PREFIX}{index}{CSV_EXT}")
}

/// Extract `N` from a `maze_<N>.csv` file name.
pub fn parse_maze_index(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(MAZE_PREFIX)?
        .strip_suffix(CSV_EXT)?
        .parse()
        .ok()
}

/// Indices of every `maze_<N>.csv` in `dir`. A missing directory has none.
fn maze_indices(dir: &Path) -> Result<Vec<u32>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut indices = Vec::new();
    for entry in entries {
        let entry = entry?;
        if let Some(index) = entry.file_name().to_str().and_then(parse_maze_index) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Index for the next generated maze: largest existing index plus one, or 1.
pub fn next_maze_index(dir: &Path) -> Result<u32> {
    match maze_indices(dir)?.into_iter().max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| MazeError::IndexExhausted(dir.to_path_buf())),
    }
}

/// The most recently generated maze file, if any.
pub fn latest_maze(dir: &Path) -> Result<Option<(u32, PathBuf)>> {
    Ok(maze_indices(dir)?
        .into_iter()
        .max()
        .map(|index| (index, dir.join(maze_file_name(index)))))
}

pub fn load_maze(path: &Path) -> Result<Maze> {
    read_maze(BufReader::new(File::open(path)?))
}

pub fn save_maze(maze: &Maze, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_maze(maze, BufWriter::new(File::create(path)?))
}

/// Append `maze` to the input directory under the next free index.
pub fn save_new_maze(maze: &Maze, config: &StoreConfig) -> Result<(u32, PathBuf)> {
    let index = next_maze_index(&config.input_dir)?;
    let path = config.input_dir.join(maze_file_name(index));
    save_maze(maze, &path)?;
    tracing::info!("Maze saved to {}", path.display());
    Ok((index, path))
}

/// Load the maze with the largest index from the input directory.
pub fn load_latest_maze(config: &StoreConfig) -> Result<(u32, Maze)> {
    let (index, path) = latest_maze(&config.input_dir)?
        .ok_or_else(|| MazeError::NoMazeFiles(config.input_dir.clone()))?;
    tracing::info!("Loading maze from {}", path.display());
    Ok((index, load_maze(&path)?))
}

/// Where the solved copy of maze `index` goes, as `(csv, pdf)`.
pub fn solution_paths(config: &StoreConfig, solver: Solver, index: u32) -> (PathBuf, PathBuf) {
    let slug = solver.slug();
    (
        config
            .csv_output_dir
            .join(slug)
            .join(format!("{slug}_{index}.csv")),
        config
            .pdf_output_dir
            .join(slug)
            .join(format!("{slug}_{index}.pdf")),
    )
}

/// Persist a solved maze as CSV and PDF. Returns the written paths.
pub fn save_solution(
    maze: &Maze,
    config: &StoreConfig,
    palette: &Palette,
    solver: Solver,
    index: u32,
) -> Result<(PathBuf, PathBuf)> {
    let (csv_path, pdf_path) = solution_paths(config, solver, index);
    save_maze(maze, &csv_path)?;
    if let Some(parent) = pdf_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    pdf::write_pdf(
        &pdf_path,
        maze,
        palette,
        config.pdf_cell_size,
        config.pdf_margin,
    )?;
    tracing::info!(
        "Solution saved to {} and {}",
        csv_path.display(),
        pdf_path.display()
    );
    Ok((csv_path, pdf_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_maze_index() {
        assert_eq!(parse_maze_index("maze_1.csv"), Some(1));
        assert_eq!(parse_maze_index("maze_42.csv"), Some(42));
        assert_eq!(parse_maze_index("maze_.csv"), None);
        assert_eq!(parse_maze_index("maze_3.pdf"), None);
        assert_eq!(parse_maze_index("bfs_3.csv"), None);
        assert_eq!(parse_maze_index("maze_x.csv"), None);
    }

    #[test]
    fn test_solution_paths() {
        let config = StoreConfig::default();
        let (csv, pdf) = solution_paths(&config, Solver::AStar, 7);
        assert_eq!(csv, PathBuf::from("mazes_output_csv/aStar/aStar_7.csv"));
        assert_eq!(pdf, PathBuf::from("mazes_output_pdf/aStar/aStar_7.pdf"));
    }

    #[test]
    fn test_next_index_after_largest() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["maze_2.csv", "maze_10.csv", "aStar_50.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "1\n").unwrap();
        }
        assert_eq!(next_maze_index(dir.path()).unwrap(), 11);
        assert_eq!(latest_maze(dir.path()).unwrap().unwrap().0, 10);
    }

    #[test]
    fn test_index_exhausted_at_u32_max() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(maze_file_name(u32::MAX)), "1\n").unwrap();
        assert!(matches!(
            next_maze_index(dir.path()),
            Err(MazeError::IndexExhausted(_))
        ));
    }

    #[test]
    fn test_missing_dir_starts_at_one() {
        let path = Path::new("this/directory/does/not/exist");
        assert_eq!(next_maze_index(path).unwrap(), 1);
        assert!(latest_maze(path).unwrap().is_none());
    }
}
