use std::{path::PathBuf, time::Duration};

use crate::maze::Cell;

/// Everything a generate or solve run needs, passed explicitly instead of
/// living in module-level constants.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub render: RenderConfig,
    pub store: StoreConfig,
    pub palette: Palette,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Grid rows. Odd values keep the carved passages on a 2-step lattice.
    pub rows: u16,
    /// Grid columns. Odd values keep the carved passages on a 2-step lattice.
    pub cols: u16,
    /// Fraction of total cells attempted during redundant-path injection
    pub density: f64,
    /// Fixed seed for reproducible mazes, OS entropy otherwise
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rows: 35,
            cols: 35,
            density: 0.15,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Time to wait after drawing each grid event
    pub step_delay: Duration,
    /// Lower bound when speeding the animation up
    pub min_step_delay: Duration,
    /// Upper bound when slowing the animation down
    pub max_step_delay: Duration,
    /// Timeout for polling input events in the input thread, a.k.a.
    /// how often to check for done/cancel flags
    pub input_poll_timeout: Duration,
    /// Timeout for receiving input events, a.k.a. how often to check for render done/cancel flags
    pub input_recv_timeout: Duration,
    /// Maximum number of grid events to buffer in the channel between compute and render threads
    pub event_buffer: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(20),
            min_step_delay: Duration::from_micros(100),
            max_step_delay: Duration::from_millis(500),
            input_poll_timeout: Duration::from_millis(100),
            input_recv_timeout: Duration::from_millis(100),
            event_buffer: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Where `maze_<N>.csv` files are written by the generator and read by the solvers
    pub input_dir: PathBuf,
    /// Root of per-algorithm solved CSV folders
    pub csv_output_dir: PathBuf,
    /// Root of per-algorithm solved PDF folders
    pub pdf_output_dir: PathBuf,
    /// Side of one cell in the PDF, in points
    pub pdf_cell_size: f64,
    /// Blank border around the PDF grid, in points
    pub pdf_margin: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("mazes_input"),
            csv_output_dir: PathBuf::from("mazes_output_csv"),
            pdf_output_dir: PathBuf::from("mazes_output_pdf"),
            pdf_cell_size: 10.0,
            pdf_margin: 5.0,
        }
    }
}

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colour of each cell state, shared by the terminal renderer and the PDF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub wall: Rgb,
    pub open: Rgb,
    pub start: Rgb,
    pub goal: Rgb,
    pub final_path: Rgb,
    pub visited: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: Rgb(0, 0, 0),
            open: Rgb(255, 255, 255),
            start: Rgb(0, 255, 0),
            goal: Rgb(255, 0, 0),
            final_path: Rgb(0, 0, 255),
            visited: Rgb(173, 216, 230),
        }
    }
}

impl Palette {
    pub fn color(&self, cell: Cell) -> Rgb {
        match cell {
            Cell::Wall => self.wall,
            Cell::Open => self.open,
            Cell::Start => self.start,
            Cell::Goal => self.goal,
            Cell::FinalPath => self.final_path,
            Cell::Visited => self.visited,
        }
    }
}

impl From<Rgb> for crossterm::style::Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        crossterm::style::Color::Rgb { r, g, b }
    }
}
