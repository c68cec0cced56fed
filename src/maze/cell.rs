use crossterm::style::{Color, Stylize};

use std::fmt;

/// State code of a single grid cell.
///
/// The discriminants are the integer codes used by the maze CSV format.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cell {
    /// Impassable cell.
    #[default]
    Wall = 0,
    /// Carved passage.
    Open = 1,
    /// Where a search begins. Exactly one per maze.
    Start = 2,
    /// Where a search ends. Exactly one per maze.
    Goal = 3,
    /// Part of the solution route.
    FinalPath = 4,
    /// Expanded during a search.
    Visited = 5,
}

impl Cell {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    pub const ALL: [Cell; 6] = [
        Cell::Wall,
        Cell::Open,
        Cell::Start,
        Cell::Goal,
        Cell::FinalPath,
        Cell::Visited,
    ];

    /// Integer code of this state.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Cell::code`]. Returns `None` for unknown codes.
    pub fn from_code(code: u8) -> Option<Cell> {
        Cell::ALL.get(code as usize).copied()
    }

    /// Whether a search may step onto this cell.
    pub fn is_passable(self) -> bool {
        self != Cell::Wall
    }

    /// Search annotations that are cleared before re-solving a maze.
    pub fn is_annotation(self) -> bool {
        matches!(self, Cell::Visited | Cell::FinalPath)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            Cell::Wall => "██".with(Color::DarkGrey),
            Cell::Open => "  ".with(Color::Reset),
            Cell::Start => "S ".with(Color::Green),
            Cell::Goal => "G ".with(Color::Red),
            Cell::FinalPath => "**".with(Color::Blue),
            Cell::Visited => ". ".with(Color::Cyan),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Cell::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_csv_mapping() {
        assert_eq!(Cell::Wall.code(), 0);
        assert_eq!(Cell::Open.code(), 1);
        assert_eq!(Cell::Start.code(), 2);
        assert_eq!(Cell::Goal.code(), 3);
        assert_eq!(Cell::FinalPath.code(), 4);
        assert_eq!(Cell::Visited.code(), 5);
        for cell in Cell::ALL {
            assert_eq!(Cell::from_code(cell.code()), Some(cell));
        }
        assert_eq!(Cell::from_code(6), None);
    }

    #[test]
    fn test_display_width() {
        // The debug assertion inside Display checks the width
        for cell in Cell::ALL {
            let _ = cell.to_string();
        }
    }
}
