use std::sync::mpsc::SyncSender;

use super::Coord;
use super::cell::Cell;

/// A change to the grid, streamed to whoever animates the maze.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// Full grid contents, sent once when a sink is attached.
    Snapshot {
        rows: u16,
        cols: u16,
        cells: Box<[Cell]>,
    },
    /// A single cell changed from `old` to `new`.
    Update { coord: Coord, old: Cell, new: Cell },
}

/// Row-major cell storage. Indexing is unchecked; bounds are enforced by
/// [`Maze`](super::Maze).
pub struct Grid {
    pub data: Box<[Cell]>,
    rows: u16,
    cols: u16,
    sender: Option<SyncSender<GridEvent>>,
}

impl Grid {
    pub fn new(rows: u16, cols: u16, cell: Cell) -> Self {
        let data = vec![cell; rows as usize * cols as usize].into_boxed_slice();
        Grid {
            data,
            rows,
            cols,
            sender: None,
        }
    }

    pub fn from_data(rows: u16, cols: u16, data: Box<[Cell]>) -> Self {
        debug_assert_eq!(data.len(), rows as usize * cols as usize);
        Grid {
            data,
            rows,
            cols,
            sender: None,
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    fn ravel_index(&self, row: u16, col: u16) -> usize {
        // Overflow-safe since rows and cols are u16 (assuming usize is at least 32 bits)
        row as usize * self.cols as usize + col as usize
    }

    /// Start streaming changes to `sender`, beginning with a snapshot.
    pub fn attach(&mut self, sender: SyncSender<GridEvent>) {
        let _ = sender.send(GridEvent::Snapshot {
            rows: self.rows,
            cols: self.cols,
            cells: self.data.clone(),
        });
        self.sender = Some(sender);
    }

    pub fn detach(&mut self) {
        self.sender = None;
    }

    pub fn set(&mut self, coord: Coord, cell: Cell) {
        let idx = self.ravel_index(coord.0, coord.1);
        let old = self.data[idx];
        if old != cell {
            self.data[idx] = cell;
            if let Some(sender) = &self.sender {
                // The receiver may already be gone if rendering was cancelled
                let _ = sender.send(GridEvent::Update {
                    coord,
                    old,
                    new: cell,
                });
            }
        }
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.data[self.ravel_index(index.0, index.1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_only_on_change() {
        let (tx, rx) = std::sync::mpsc::sync_channel(16);
        let mut grid = Grid::new(2, 3, Cell::Wall);
        grid.attach(tx);
        grid.set((1, 2), Cell::Open);
        grid.set((1, 2), Cell::Open);
        grid.detach();

        let events = rx.iter().collect::<Vec<_>>();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            GridEvent::Snapshot {
                rows: 2,
                cols: 3,
                ..
            }
        ));
        assert_eq!(
            events[1],
            GridEvent::Update {
                coord: (1, 2),
                old: Cell::Wall,
                new: Cell::Open
            }
        );
    }
}
