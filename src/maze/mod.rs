pub mod cell;
pub mod grid;

use std::{fmt, sync::mpsc::SyncSender};

pub use cell::Cell;
use grid::{Grid, GridEvent};

use crate::error::{MazeError, Result};

/// A grid coordinate as `(row, col)`.
pub type Coord = (u16, u16);

/// Rectangular maze of cell state codes.
///
/// The maze is exclusively owned by whichever phase (generation, search,
/// persistence) is running, so no interior locking is needed. All public
/// accessors are bounds-checked; the `Index` impl is reserved for coordinates
/// already known to be in bounds.
pub struct Maze {
    grid: Grid,
}

impl Maze {
    /// Creates a new maze with the given dimensions, filled with walls.
    pub fn new(rows: u16, cols: u16) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MazeError::InvalidDimensions {
                rows: rows as usize,
                cols: cols as usize,
            });
        }
        Ok(Maze {
            grid: Grid::new(rows, cols, Cell::Wall),
        })
    }

    /// Builds a maze from decoded rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(MazeError::MalformedInput {
                line: 1,
                reason: "maze has no rows".to_string(),
            });
        };
        let num_cols = first.len();
        if num_cols == 0 {
            return Err(MazeError::MalformedInput {
                line: 1,
                reason: "maze has no columns".to_string(),
            });
        }
        if rows.len() > u16::MAX as usize || num_cols > u16::MAX as usize {
            return Err(MazeError::MalformedInput {
                line: 1,
                reason: format!(
                    "maze of {}x{} exceeds the {}x{} limit",
                    rows.len(),
                    num_cols,
                    u16::MAX,
                    u16::MAX
                ),
            });
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != num_cols) {
            return Err(MazeError::MalformedInput {
                line: i + 1,
                reason: format!("expected {} columns, found {}", num_cols, row.len()),
            });
        }

        let num_rows = rows.len() as u16;
        let data = rows.into_iter().flatten().collect::<Box<[Cell]>>();
        Ok(Maze {
            grid: Grid::from_data(num_rows, num_cols as u16, data),
        })
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.grid.rows(), self.grid.cols())
    }

    pub fn rows(&self) -> u16 {
        self.grid.rows()
    }

    pub fn cols(&self) -> u16 {
        self.grid.cols()
    }

    /// Checks if the given coordinate is within the bounds of the maze.
    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.grid.rows() && coord.1 < self.grid.cols()
    }

    fn check_bounds(&self, coord: Coord) -> Result<()> {
        if self.is_in_bounds(coord) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                coord,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            })
        }
    }

    pub fn get(&self, coord: Coord) -> Result<Cell> {
        self.check_bounds(coord)?;
        Ok(self.grid[coord])
    }

    pub fn set(&mut self, coord: Coord, cell: Cell) -> Result<()> {
        self.check_bounds(coord)?;
        self.grid.set(coord, cell);
        Ok(())
    }

    /// Locates the single cell holding `cell`.
    /// Fails with [`MazeError::NotFound`] when there are zero or several.
    pub fn find_unique(&self, cell: Cell) -> Result<Coord> {
        let mut found = None;
        let mut count = 0;
        for (i, c) in self.grid.data.iter().enumerate() {
            if *c == cell {
                count += 1;
                found.get_or_insert(i);
            }
        }
        match (count, found) {
            (1, Some(i)) => Ok(self.unravel_index(i)),
            _ => Err(MazeError::NotFound { cell, count }),
        }
    }

    fn unravel_index(&self, i: usize) -> Coord {
        let cols = self.grid.cols() as usize;
        ((i / cols) as u16, (i % cols) as u16)
    }

    /// Raw row-major cell data.
    pub fn cells(&self) -> &[Cell] {
        &self.grid.data
    }

    /// Iterates over the maze one row at a time.
    pub fn row_slices(&self) -> impl Iterator<Item = &[Cell]> {
        self.grid.data.chunks(self.grid.cols() as usize)
    }

    /// Stream every subsequent cell change to `sender`, starting with a snapshot.
    pub fn attach_events(&mut self, sender: SyncSender<GridEvent>) {
        self.grid.attach(sender);
    }

    /// Stop streaming cell changes. Dropping the sender ends the trace.
    pub fn detach_events(&mut self) {
        self.grid.detach();
    }

    /// Resets `Visited` and `FinalPath` annotations back to `Open`.
    pub fn clear_annotations(&mut self) {
        (0..self.grid.rows()).for_each(|row| {
            (0..self.grid.cols()).for_each(|col| {
                if self.grid[(row, col)].is_annotation() {
                    self.grid.set((row, col), Cell::Open);
                }
            })
        });
    }

    /// Writes `FinalPath` along `path`. `Start` and `Goal` cells keep their codes.
    pub fn mark_path(&mut self, path: &[Coord]) -> Result<()> {
        for &coord in path {
            if !matches!(self.get(coord)?, Cell::Start | Cell::Goal) {
                self.grid.set(coord, Cell::FinalPath);
            }
        }
        Ok(())
    }

    /// Unchecked write for coordinates already known to be in bounds.
    pub(crate) fn put(&mut self, coord: Coord, cell: Cell) {
        self.grid.set(coord, cell);
    }
}

impl std::ops::Index<Coord> for Maze {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.grid[index]
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.row_slices() {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Get neighbors of a cell.
/// A neighbor is considered a cell that is one step away in the cardinal directions,
/// yielded in the order right, left, down, up.
pub fn get_neighbors(coord: Coord, maze: &Maze) -> impl Iterator<Item = Coord> + '_ {
    let (row, col) = coord;
    let neighbors = if maze.is_in_bounds(coord) {
        // NOTE: This way of handling underflow/overflow is overflow-safe.
        // When row or col is 0, wrap the decrement to u16::MAX and let the bounds check
        // filter it out. The increment saturates at u16::MAX, which is never a valid index
        // since the largest dimension numerically possible is u16::MAX.
        vec![
            (row, col.saturating_add(1)),
            (row, col.wrapping_sub(1)),
            (row.saturating_add(1), col),
            (row.wrapping_sub(1), col),
        ]
    } else {
        // No neighbors if the coordinate is out of bounds
        vec![]
    };

    neighbors.into_iter().filter(move |&c| maze.is_in_bounds(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maze_indexing() {
        let mut maze = Maze::new(5, 5).unwrap();
        maze.set((2, 3), Cell::Start).unwrap();
        assert_eq!(maze.get((2, 3)).unwrap(), Cell::Start);
        assert_eq!(maze[(2, 3)], Cell::Start);
        assert_eq!(maze.get((3, 2)).unwrap(), Cell::Wall);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut maze = Maze::new(3, 4).unwrap();
        assert!(!maze.is_in_bounds((3, 0)));
        assert!(!maze.is_in_bounds((0, 4)));
        assert!(maze.is_in_bounds((2, 3)));
        assert!(matches!(
            maze.get((3, 0)),
            Err(MazeError::OutOfBounds { coord: (3, 0), .. })
        ));
        assert!(matches!(
            maze.set((0, 4), Cell::Open),
            Err(MazeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Maze::new(0, 3),
            Err(MazeError::InvalidDimensions { rows: 0, cols: 3 })
        ));
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec![Cell::Open; 3], vec![Cell::Open; 2]];
        assert!(matches!(
            Maze::from_rows(rows),
            Err(MazeError::MalformedInput { line: 2, .. })
        ));
        assert!(matches!(
            Maze::from_rows(vec![]),
            Err(MazeError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_find_unique() {
        let mut maze = Maze::new(3, 3).unwrap();
        assert!(matches!(
            maze.find_unique(Cell::Start),
            Err(MazeError::NotFound {
                cell: Cell::Start,
                count: 0
            })
        ));
        maze.set((1, 2), Cell::Start).unwrap();
        assert_eq!(maze.find_unique(Cell::Start).unwrap(), (1, 2));
        maze.set((2, 0), Cell::Start).unwrap();
        assert!(matches!(
            maze.find_unique(Cell::Start),
            Err(MazeError::NotFound { count: 2, .. })
        ));
    }

    #[test]
    fn test_get_neighbors() {
        let maze = Maze::new(3, 3).unwrap();
        let corner = get_neighbors((0, 0), &maze).collect::<Vec<_>>();
        assert_eq!(corner, vec![(0, 1), (1, 0)]);
        let center = get_neighbors((1, 1), &maze).collect::<Vec<_>>();
        assert_eq!(center, vec![(1, 2), (1, 0), (2, 1), (0, 1)]);
        assert_eq!(get_neighbors((5, 5), &maze).count(), 0);
    }

    #[test]
    fn test_mark_path_keeps_endpoints() {
        let mut maze = Maze::new(1, 3).unwrap();
        maze.set((0, 0), Cell::Start).unwrap();
        maze.set((0, 1), Cell::Visited).unwrap();
        maze.set((0, 2), Cell::Goal).unwrap();
        maze.mark_path(&[(0, 0), (0, 1), (0, 2)]).unwrap();
        assert_eq!(maze.cells(), &[Cell::Start, Cell::FinalPath, Cell::Goal]);

        maze.clear_annotations();
        assert_eq!(maze.cells(), &[Cell::Start, Cell::Open, Cell::Goal]);
    }
}
