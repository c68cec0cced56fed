mod renderer;

use std::{
    io::{Stdout, Write},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, Sender, SyncSender},
    },
    time::Duration,
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

pub use renderer::{Renderer, RendererStatus};

use crate::{
    config::Config,
    error::Result,
    jobs,
    maze::{Cell, Coord, grid::GridEvent},
    solvers::{SearchOutcome, Solver},
};

#[derive(Debug, PartialEq, Eq)]
enum UserInputEvent {
    KeyPress(KeyCode),
    Resize,
}

impl UserInputEvent {
    /// Key presses and resizes; key releases, repeats, mouse and focus events are dropped
    fn from_terminal(event: event::Event) -> Option<Self> {
        match event {
            event::Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                Some(Self::KeyPress(key.code))
            }
            event::Event::Resize(..) => Some(Self::Resize),
            _ => None,
        }
    }

    /// Esc ends the animation, so the input thread stops reading after forwarding it
    fn ends_input(&self) -> bool {
        *self == Self::KeyPress(KeyCode::Esc)
    }
}

#[derive(Debug)]
pub enum UserActionEvent {
    /// Pause the animation
    Pause,
    /// Resume the animation
    Resume,
    /// Terminal resize
    Resize,
    /// Increase animation speed
    SpeedUp,
    /// Decrease animation speed
    SlowDown,
    /// Cancel rendering
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Generate,
    Solve(Solver),
    Quit,
}

impl std::fmt::Display for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuItem::Generate => write!(f, "Generate a new maze"),
            MenuItem::Solve(solver) => write!(f, "Solve latest maze with {}", solver),
            MenuItem::Quit => write!(f, "Quit"),
        }
    }
}

/// Terminal front end: menus, prompts and animated generate/solve runs.
pub struct App {
    config: Config,
}

impl App {
    const MENU: [MenuItem; 5] = [
        MenuItem::Generate,
        MenuItem::Solve(Solver::Dfs),
        MenuItem::Solve(Solver::AStar),
        MenuItem::Solve(Solver::Bfs),
        MenuItem::Quit,
    ];

    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Chain a panic hook that leaves raw mode and the alternate screen before the
    /// default report is printed, whichever thread panics (render and compute included)
    fn restore_terminal_on_panic() {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Err(err) = App::restore_terminal(&mut std::io::stdout()) {
                eprintln!("failed to restore terminal: {}", err);
            }
            previous(info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::restore_terminal_on_panic();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Main menu loop. A failing run is reported and the menu shown again.
    pub fn run_menu(&self, stdout: &mut Stdout) -> std::io::Result<()> {
        loop {
            queue!(
                stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                style::SetAttribute(Attribute::Reverse),
                style::PrintStyledContent("Maze Solver\r\n".with(Color::Yellow)),
                style::SetAttribute(Attribute::NoReverse),
            )?;
            stdout.flush()?;

            let item = App::select_from_menu(
                stdout,
                "Select an action (use arrow keys and Enter, or Esc to exit):",
                &App::MENU,
            )?;

            let result = match item {
                Some(MenuItem::Generate) => self.prompt_and_generate(stdout),
                Some(MenuItem::Solve(solver)) => self.solve(stdout, solver, None),
                Some(MenuItem::Quit) | None => return Ok(()),
            };
            if let (Err(e), Some(item)) = (result, item) {
                tracing::warn!("{} failed: {}", item, e);
                App::show_error(stdout, &e)?;
                App::wait_for_keypress(KeyCode::Esc)?;
            }
        }
    }

    fn show_error(stdout: &mut Stdout, error: &dyn std::fmt::Display) -> std::io::Result<()> {
        stdout.execute(style::PrintStyledContent(
            format!("Error: {}\r\nPress Esc to continue...\r\n", error)
                .with(Color::Red)
                .attribute(Attribute::Bold),
        ))?;
        Ok(())
    }

    /// Ask for dimensions and endpoints, then run an animated generation.
    fn prompt_and_generate(&self, stdout: &mut Stdout) -> Result<()> {
        let Some((rows, cols)) = App::ask_maze_dimensions(stdout, &self.config)? else {
            return Ok(());
        };
        let Some(start) = App::ask_coord(stdout, "Start", rows, cols, (0, 0))? else {
            return Ok(());
        };
        let Some(goal) = App::ask_coord(stdout, "Goal", rows, cols, (rows - 1, cols - 1))? else {
            return Ok(());
        };

        let mut config = self.config.clone();
        config.generation.rows = rows;
        config.generation.cols = cols;
        App::new(config).generate(stdout, start, goal)
    }

    /// Generate a maze with the configured dimensions, animating the carve.
    pub fn generate(&self, stdout: &mut Stdout, start: Coord, goal: Coord) -> Result<()> {
        let config = self.config.clone();
        let (status, generated) = self.animate(move |events, cancel| {
            jobs::generate(&config, start, goal, Some(events), cancel)
        })?;

        if status == RendererStatus::Cancelled {
            tracing::info!("Rendering was cancelled by user.");
        }
        match generated? {
            Some(generated) => {
                App::print_status(
                    stdout,
                    &format!(
                        "Maze {} saved to {} (start {:?}, goal {:?}). ",
                        generated.index,
                        generated.path.display(),
                        generated.start,
                        generated.goal
                    ),
                )?;
            }
            None => {
                tracing::info!("Generation was cancelled, nothing was saved.");
                return Ok(());
            }
        }
        App::wait_for_keypress(KeyCode::Esc)?;
        Ok(())
    }

    /// Solve the latest stored maze (or `input`), animating the search.
    pub fn solve(&self, stdout: &mut Stdout, solver: Solver, input: Option<PathBuf>) -> Result<()> {
        let config = self.config.clone();
        let (status, solved) = self.animate(move |events, cancel| {
            jobs::solve(&config, solver, input.as_deref(), Some(events), cancel)
        })?;
        let solved = solved?;

        if status == RendererStatus::Cancelled || matches!(solved.outcome, SearchOutcome::Cancelled) {
            tracing::info!("Rendering was cancelled by user.");
            return Ok(());
        }

        let msg = match (&solved.outcome, &solved.files) {
            (SearchOutcome::Found(path), Some((csv, pdf))) => format!(
                "Path of {} cells found! Saved to {} and {}. ",
                path.len(),
                csv.display(),
                pdf.display()
            ),
            _ => "No path found. ".to_string(),
        };
        App::print_status(stdout, &msg)?;
        App::wait_for_keypress(KeyCode::Esc)?;
        Ok(())
    }

    fn print_status(stdout: &mut Stdout, msg: &str) -> std::io::Result<()> {
        queue!(
            stdout,
            style::PrintStyledContent(msg.with(Color::Green).attribute(Attribute::Bold)),
            style::PrintStyledContent(
                "Press Esc to continue...\r\n"
                    .with(Color::Blue)
                    .attribute(Attribute::Bold)
            ),
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Run `job` on a compute thread while a render thread animates its grid events
    /// and the current thread forwards key presses.
    /// Returns the renderer's final status together with the job's result.
    fn animate<T, F>(&self, job: F) -> std::io::Result<(RendererStatus, T)>
    where
        T: Send + 'static,
        F: FnOnce(SyncSender<GridEvent>, &AtomicBool) -> T + Send + 'static,
    {
        // Flag to indicate other threads should stop. Set to true by the main thread on Esc key event.
        let should_stop = Arc::new(AtomicBool::new(false));
        let render_config = self.config.render.clone();

        let (user_input_event_tx, user_input_event_rx) =
            std::sync::mpsc::channel::<UserInputEvent>();
        let should_stop_for_input = should_stop.clone();
        let input_poll_timeout = render_config.input_poll_timeout;
        // Spawn a thread to listen for user input
        let input_thread_handle = std::thread::spawn(move || -> std::io::Result<()> {
            App::listen_to_user_input(
                user_input_event_tx,
                input_poll_timeout,
                &should_stop_for_input,
            )
        });

        let (grid_event_tx, grid_event_rx) =
            std::sync::mpsc::sync_channel::<GridEvent>(render_config.event_buffer);
        let (user_action_event_tx, user_action_event_rx) =
            std::sync::mpsc::channel::<UserActionEvent>();

        // Spawn a thread to listen for grid updates and render the maze
        let should_stop_for_render = should_stop.clone();
        let palette = self.config.palette.clone();
        let renderer_config = render_config.clone();
        let render_thread_handle = std::thread::spawn(move || {
            Renderer::new(palette, &renderer_config).render(
                grid_event_rx,
                user_action_event_rx,
                &should_stop_for_render,
            )
        });

        // Spawn a thread to run the job
        let should_stop_for_compute = should_stop.clone();
        let compute_thread_handle =
            std::thread::spawn(move || job(grid_event_tx, should_stop_for_compute.as_ref()));

        // Main thread loop to listen for user input events during rendering
        let status = App::app_loop(
            user_input_event_rx,
            user_action_event_tx,
            render_config.input_recv_timeout,
            render_thread_handle,
            should_stop,
        );

        // Wait for input thread to finish
        let input_result = input_thread_handle.join();
        // Wait for compute thread to finish
        let output = compute_thread_handle
            .join()
            .map_err(|_| std::io::Error::other("compute thread panicked"))?;

        let status = status?;
        input_result.map_err(|_| std::io::Error::other("input thread panicked"))??;
        Ok((status, output))
    }

    /// App loop after starting input and render threads
    fn app_loop(
        user_input_event_rx: Receiver<UserInputEvent>,
        user_action_event_tx: Sender<UserActionEvent>,
        input_recv_timeout: Duration,
        render_thread_handle: std::thread::JoinHandle<std::io::Result<RendererStatus>>,
        should_stop: Arc<AtomicBool>,
    ) -> std::io::Result<RendererStatus> {
        tracing::info!("Started main app loop");
        // Flag to indicate if the animation is currently paused
        let mut is_paused = false;
        loop {
            // Check if render is done
            if render_thread_handle.is_finished() {
                // Signal the input thread to stop
                should_stop.store(true, Ordering::Release);
                break;
            }

            let event = match user_input_event_rx.recv_timeout(input_recv_timeout) {
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    // Skip to next iteration to check render status again
                    continue;
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                    // Input thread has exited, break the loop
                    break;
                }
                Ok(UserInputEvent::KeyPress(code)) => match code {
                    // Cancel on Esc key
                    KeyCode::Esc => {
                        tracing::debug!("[app loop] Esc key pressed, notifying renderer");
                        // Error only happens if the render thread has exited already
                        user_action_event_tx.send(UserActionEvent::Cancel).ok();
                        should_stop.store(true, Ordering::Release);
                        break;
                    }
                    KeyCode::Enter => {
                        let event = if is_paused {
                            UserActionEvent::Resume
                        } else {
                            UserActionEvent::Pause
                        };
                        is_paused = !is_paused;
                        Some(event)
                    }
                    KeyCode::Up => Some(UserActionEvent::SpeedUp),
                    KeyCode::Down => Some(UserActionEvent::SlowDown),
                    _ => None, // Ignore other keys
                },
                Ok(UserInputEvent::Resize) => Some(UserActionEvent::Resize),
            };

            // Send the user action event to the render thread
            if let Some(event) = event
                && user_action_event_tx.send(event).is_err()
            {
                // Render thread has exited
                break;
            }
        }
        // The user_input_event_rx and user_action_event_tx are dropped here
        drop(user_action_event_tx);
        tracing::info!("Exiting main app loop");

        // Wait for render thread to finish and get its status
        render_thread_handle
            .join()
            .map_err(|_| std::io::Error::other("render thread panicked"))?
    }

    /// Listen for user input events (key presses and resize)
    /// This function runs in a separate thread, and is the only place where user input is read
    /// during an animation
    fn listen_to_user_input(
        user_input_event_tx: Sender<UserInputEvent>,
        event_poll_timeout: Duration,
        should_stop: &AtomicBool,
    ) -> std::io::Result<()> {
        while !should_stop.load(Ordering::Acquire) {
            // Polling keeps the stop flag checked between events
            if !event::poll(event_poll_timeout)? {
                continue;
            }
            let Some(input_event) = UserInputEvent::from_terminal(event::read()?) else {
                continue;
            };
            let ends_input = input_event.ends_input();
            if user_input_event_tx.send(input_event).is_err() || ends_input {
                tracing::debug!(ends_input, "[input loop] exiting");
                break;
            }
        }
        Ok(())
    }

    /// Block until a key is pressed and return it
    fn read_key_press() -> std::io::Result<KeyCode> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()?
                && kind == event::KeyEventKind::Press
            {
                return Ok(code);
            }
        }
    }

    /// Wait for the user to press the given key
    fn wait_for_keypress(key: KeyCode) -> std::io::Result<()> {
        while App::read_key_press()? != key {}
        Ok(())
    }

    /// Redraw-then-read loop shared by prompts and menus.
    /// `draw` renders the widget below the saved cursor position on every pass;
    /// `on_key` updates the widget until it yields a value or is dismissed.
    fn interact<W, T>(
        stdout: &mut Stdout,
        widget: &mut W,
        draw: impl Fn(&W, &mut Stdout) -> std::io::Result<()>,
        on_key: impl Fn(&mut W, KeyCode) -> KeyOutcome<T>,
    ) -> std::io::Result<Option<T>> {
        queue!(stdout, cursor::Hide, cursor::SavePosition)?;

        let value = loop {
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;
            draw(widget, stdout)?;
            stdout.flush()?;

            match on_key(widget, App::read_key_press()?) {
                KeyOutcome::Pending => {}
                KeyOutcome::Done(value) => break value,
            }
        };

        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;
        Ok(value)
    }

    /// Read a line with live validation: the input turns green once `validate`
    /// accepts it, and its error is shown underneath otherwise.
    /// Returns None if the user cancels with Esc.
    fn prompt_with_validation<F, T>(
        stdout: &mut Stdout,
        prompt: &str,
        validate: F,
    ) -> std::io::Result<Option<T>>
    where
        F: Fn(&str) -> std::result::Result<T, String>,
    {
        let draw = |input: &TextInput, stdout: &mut Stdout| -> std::io::Result<()> {
            let validation = validate(input.value());
            let color = if validation.is_ok() {
                Color::Green
            } else {
                Color::Red
            };
            queue!(
                stdout,
                style::PrintStyledContent(prompt.with(Color::Cyan).attribute(Attribute::Bold)),
                style::PrintStyledContent(input.value().with(color)),
                style::Print(" \r\n")
            )?;
            if let Err(msg) = validation {
                stdout.queue(style::PrintStyledContent(
                    msg.with(Color::DarkGrey).attribute(Attribute::Dim),
                ))?;
            }
            Ok(())
        };
        App::interact(stdout, &mut TextInput::default(), draw, |input, key| {
            input.on_key(key, &validate)
        })
    }

    /// Largest odd grid dimension (at least 3) that fits in `term_size` terminal cells
    fn get_max_grid_size(term_size: u16, cell_size: u16) -> u16 {
        let n = term_size / cell_size;
        let odd = if n % 2 == 0 && n > 0 { n - 1 } else { n };
        odd.max(3)
    }

    /// Ask user for grid dimensions. An empty answer keeps the configured value,
    /// capped by what the terminal can display.
    fn ask_maze_dimensions(stdout: &mut Stdout, config: &Config) -> std::io::Result<Option<(u16, u16)>> {
        stdout.execute(style::PrintStyledContent(
            "Enter grid dimensions (odd values keep passages aligned), or press Esc to go back. \
Maximum values are based on current terminal size.\r\n"
                .with(Color::Blue),
        ))?;

        let validate = |s: &str, is_rows: bool| {
            let (max_size, default) = match terminal::size() {
                Ok((_, term_height)) if is_rows => (
                    App::get_max_grid_size(term_height.saturating_sub(Renderer::NUM_STATUS_ROWS), 1),
                    config.generation.rows,
                ),
                Ok((term_width, _)) => (
                    App::get_max_grid_size(term_width, Cell::CELL_WIDTH),
                    config.generation.cols,
                ),
                // Fallback to max size if terminal size cannot be determined
                Err(_) if is_rows => (u16::MAX, config.generation.rows),
                Err(_) => (u16::MAX, config.generation.cols),
            };

            if s.is_empty() {
                return Ok(default.min(max_size));
            }

            let error_msg = format!("Please enter a valid number between 1 and {}.", max_size);
            s.parse::<u16>()
                .map_err(|_| error_msg.clone())
                .and_then(|n| {
                    if (1..=max_size).contains(&n) {
                        Ok(n)
                    } else {
                        Err(error_msg)
                    }
                })
        };

        let Some(rows) = App::prompt_with_validation(stdout, "Rows: ", |s| validate(s, true))? else {
            return Ok(None);
        };
        stdout.execute(style::PrintStyledContent(
            format!("Rows set to {}\r\n", rows)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;

        let Some(cols) = App::prompt_with_validation(stdout, "Columns: ", |s| validate(s, false))?
        else {
            return Ok(None);
        };
        stdout.execute(style::PrintStyledContent(
            format!("Columns set to {}\r\n", cols)
                .with(Color::Green)
                .attribute(Attribute::Bold),
        ))?;

        Ok(Some((rows, cols)))
    }

    /// Ask for a `row,col` coordinate inside the grid. An empty answer picks `default`.
    fn ask_coord(
        stdout: &mut Stdout,
        label: &str,
        rows: u16,
        cols: u16,
        default: Coord,
    ) -> std::io::Result<Option<Coord>> {
        let prompt = format!("{} as row,col (default {},{}): ", label, default.0, default.1);
        let coord = App::prompt_with_validation(stdout, &prompt, |s| {
            if s.is_empty() {
                return Ok(default);
            }
            let coord = parse_coord(s)?;
            if coord.0 < rows && coord.1 < cols {
                Ok(coord)
            } else {
                Err(format!(
                    "Coordinate must be within 0..{} rows and 0..{} columns.",
                    rows, cols
                ))
            }
        })?;
        if let Some(coord) = coord {
            stdout.execute(style::PrintStyledContent(
                format!("{} set to {},{}\r\n", label, coord.0, coord.1)
                    .with(Color::Green)
                    .attribute(Attribute::Bold),
            ))?;
        }
        Ok(coord)
    }

    /// Present `options` and let the user pick one with the arrow keys and Enter.
    /// Returns None if the user cancels with Esc.
    fn select_from_menu<T: std::fmt::Display + Copy>(
        stdout: &mut Stdout,
        prompt: &str,
        options: &[T],
    ) -> std::io::Result<Option<T>> {
        if options.is_empty() {
            return Ok(None);
        }
        let draw = |menu: &MenuCursor, stdout: &mut Stdout| -> std::io::Result<()> {
            stdout.queue(style::PrintStyledContent(prompt.with(Color::Yellow)))?;
            for (i, option) in options.iter().enumerate() {
                let line = format!("\r\n{}", option);
                if i == menu.selected {
                    stdout.queue(style::PrintStyledContent(line.attribute(Attribute::Reverse)))?;
                } else {
                    stdout.queue(style::Print(line))?;
                }
            }
            stdout.queue(style::Print("\r\n"))?;
            Ok(())
        };
        let chosen = App::interact(stdout, &mut MenuCursor::new(options.len()), draw, |menu, key| {
            menu.on_key(key)
        })?;
        Ok(chosen.map(|i| options[i]))
    }
}

/// Result of feeding one key press to an interactive widget.
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome<T> {
    /// Keep reading keys
    Pending,
    /// Finished; `None` when dismissed with Esc
    Done(Option<T>),
}

/// Line being typed into a prompt.
#[derive(Debug, Default)]
struct TextInput {
    buffer: String,
}

impl TextInput {
    fn value(&self) -> &str {
        self.buffer.trim()
    }

    fn on_key<T>(
        &mut self,
        key: KeyCode,
        validate: impl Fn(&str) -> std::result::Result<T, String>,
    ) -> KeyOutcome<T> {
        match key {
            // Enter only submits valid input
            KeyCode::Enter => {
                if let Ok(value) = validate(self.value()) {
                    return KeyOutcome::Done(Some(value));
                }
            }
            KeyCode::Char(c) if !c.is_whitespace() && !c.is_control() => self.buffer.push(c),
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Esc => return KeyOutcome::Done(None),
            _ => {}
        }
        KeyOutcome::Pending
    }
}

/// Highlighted row of a menu with `len` entries. Up and Down wrap around.
#[derive(Debug)]
struct MenuCursor {
    selected: usize,
    len: usize,
}

impl MenuCursor {
    fn new(len: usize) -> Self {
        Self { selected: 0, len }
    }

    fn on_key(&mut self, key: KeyCode) -> KeyOutcome<usize> {
        match key {
            KeyCode::Up => self.selected = (self.selected + self.len - 1) % self.len,
            KeyCode::Down => self.selected = (self.selected + 1) % self.len,
            KeyCode::Enter => return KeyOutcome::Done(Some(self.selected)),
            KeyCode::Esc => return KeyOutcome::Done(None),
            _ => {}
        }
        KeyOutcome::Pending
    }
}

/// Parse `row,col`.
pub fn parse_coord(s: &str) -> std::result::Result<Coord, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected row,col but got {:?}.", s))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u16>()
            .map_err(|_| format!("{:?} is not a valid index.", part.trim()))
    };
    Ok((parse(row)?, parse(col)?))
}
