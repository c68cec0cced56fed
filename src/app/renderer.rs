use std::{
    io::{Stdout, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, RecvTimeoutError, TryRecvError},
    },
    time::Duration,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    app::UserActionEvent,
    config::{Palette, RenderConfig},
    maze::{Cell, grid::GridEvent},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererStatus {
    Completed,
    Cancelled,
}

pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    palette: Palette,
    /// Current grid dimensions (rows, cols)
    grid_dims: Option<(u16, u16)>,
    /// Last known state of every cell, used to redraw after a resize
    cells: Vec<Cell>,
    /// Whether the grid currently fits in the terminal
    fits: bool,
    /// Time to wait between rendering events
    step_delay: Duration,
    min_step_delay: Duration,
    max_step_delay: Duration,
}

impl Renderer {
    /// Rows reserved below the grid for status messages
    pub const NUM_STATUS_ROWS: u16 = 3;

    pub fn new(palette: Palette, config: &RenderConfig) -> Self {
        Self {
            stdout: std::io::stdout(),
            palette,
            grid_dims: None,
            cells: Vec::new(),
            fits: false,
            step_delay: config.step_delay,
            min_step_delay: config.min_step_delay,
            max_step_delay: config.max_step_delay,
        }
    }

    /// Terminal `(width, height)` needed to show a grid plus its status rows.
    /// Computed in `u32` since it can exceed `u16` for the largest grids.
    fn required_terminal_size(rows: u16, cols: u16) -> (u32, u32) {
        (
            cols as u32 * Cell::CELL_WIDTH as u32,
            rows as u32 + Renderer::NUM_STATUS_ROWS as u32,
        )
    }

    /// Whether a grid of the given dimensions fits in the current terminal.
    pub fn grid_fits(rows: u16, cols: u16) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        let (width, height) = Renderer::required_terminal_size(rows, cols);
        Ok(term_width as u32 >= width && term_height as u32 >= height)
    }

    fn draw_cell(&mut self, coord: (u16, u16), cell: Cell) -> std::io::Result<()> {
        let (row, col) = coord;
        queue!(
            self.stdout,
            cursor::MoveTo(col * Cell::CELL_WIDTH, row),
            style::PrintStyledContent("  ".on(self.palette.color(cell).into()))
        )?;
        Ok(())
    }

    /// Clear the screen and draw every cell, or a resize hint if the grid does not fit.
    fn redraw(&mut self) -> std::io::Result<()> {
        let Some((rows, cols)) = self.grid_dims else {
            return Ok(());
        };
        self.fits = Renderer::grid_fits(rows, cols)?;
        queue!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        if !self.fits {
            let (width, height) = Renderer::required_terminal_size(rows, cols);
            let msg = format!(
                "Terminal is too small for the {}x{} maze (needs {}x{}). Please resize the terminal, or press Esc to cancel.\r\n",
                rows, cols, width, height
            );
            self.stdout.queue(style::PrintStyledContent(
                msg.with(Color::Yellow).attribute(Attribute::Bold),
            ))?;
            self.stdout.flush()?;
            return Ok(());
        }
        for i in 0..self.cells.len() {
            let coord = ((i / cols as usize) as u16, (i % cols as usize) as u16);
            self.draw_cell(coord, self.cells[i])?;
        }
        queue!(
            self.stdout,
            cursor::MoveTo(0, rows),
            style::PrintStyledContent(
                "Controls: Enter pause/resume, ↑/↓ speed up/slow down, Esc cancel".with(Color::Cyan)
            )
        )?;
        self.stdout.flush()?;
        Ok(())
    }

    /// Render a single grid event to the terminal
    fn render_grid_event(&mut self, event: GridEvent) -> std::io::Result<()> {
        match event {
            GridEvent::Snapshot { rows, cols, cells } => {
                self.grid_dims = Some((rows, cols));
                self.cells = cells.into_vec();
                self.redraw()?;
            }
            GridEvent::Update { coord, new, .. } => {
                // Skip if the dimensions are not known yet
                let Some((_, cols)) = self.grid_dims else {
                    return Ok(());
                };
                self.cells[coord.0 as usize * cols as usize + coord.1 as usize] = new;
                if self.fits {
                    self.draw_cell(coord, new)?;
                    self.stdout.flush()?;
                }
            }
        }
        Ok(())
    }

    /// Apply a user action. Returns `Some(status)` if rendering should stop.
    fn handle_user_action(
        &mut self,
        event: UserActionEvent,
        user_action_event_rx: &Receiver<UserActionEvent>,
    ) -> std::io::Result<Option<RendererStatus>> {
        tracing::debug!("Received user action event: {:?}", event);
        match event {
            UserActionEvent::Pause => {
                // Block until the animation is resumed or cancelled
                loop {
                    match user_action_event_rx.recv() {
                        Err(_) | Ok(UserActionEvent::Resume) => break,
                        Ok(UserActionEvent::Cancel) => return Ok(Some(RendererStatus::Cancelled)),
                        Ok(UserActionEvent::Resize) => self.redraw()?,
                        Ok(other) => {
                            if let Some(status) = self.handle_user_action(other, user_action_event_rx)? {
                                return Ok(Some(status));
                            }
                        }
                    }
                }
            }
            UserActionEvent::Resume => {}
            UserActionEvent::SpeedUp => {
                self.step_delay = (self.step_delay / 2).max(self.min_step_delay);
            }
            UserActionEvent::SlowDown => {
                self.step_delay = (self.step_delay * 2).min(self.max_step_delay);
            }
            UserActionEvent::Resize => self.redraw()?,
            UserActionEvent::Cancel => return Ok(Some(RendererStatus::Cancelled)),
        }
        Ok(None)
    }

    /// Render loop that processes events from the user action and grid event channels.
    /// Returns once the grid event channel disconnects or rendering is cancelled.
    pub fn render(
        &mut self,
        grid_event_rx: Receiver<GridEvent>,
        user_action_event_rx: Receiver<UserActionEvent>,
        should_stop: &AtomicBool,
    ) -> std::io::Result<RendererStatus> {
        queue!(self.stdout, terminal::Clear(ClearType::All), cursor::Hide)?;
        self.stdout.flush()?;

        loop {
            // Try to receive user action events without blocking
            match user_action_event_rx.try_recv() {
                Ok(action_event) => {
                    if let Some(status) =
                        self.handle_user_action(action_event, &user_action_event_rx)?
                    {
                        return Ok(status);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }

            if should_stop.load(Ordering::Acquire) {
                return Ok(RendererStatus::Cancelled);
            }

            // Wait for the next grid event, waking up periodically to check for user actions
            match grid_event_rx.recv_timeout(self.max_step_delay) {
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
                Ok(event) => {
                    self.render_grid_event(event)?;
                    std::thread::sleep(self.step_delay);
                }
            }
        }

        // Move cursor below the maze and the controls line after exiting
        if let Some((rows, _)) = self.grid_dims {
            queue!(self.stdout, cursor::MoveTo(0, rows.saturating_add(1)), cursor::Show)?;
            self.stdout.flush()?;
        }
        Ok(RendererStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_terminal_size_does_not_overflow() {
        assert_eq!(Renderer::required_terminal_size(35, 35), (70, 38));
        assert_eq!(
            Renderer::required_terminal_size(u16::MAX, 33000),
            (66000, u16::MAX as u32 + 3)
        );
    }
}
