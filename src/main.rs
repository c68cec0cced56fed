use std::{path::PathBuf, sync::atomic::AtomicBool};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mazerun::{
    app::{self, App},
    config::Config,
    jobs,
    maze::Coord,
    solvers::{SearchOutcome, Solver},
};

/// Generate mazes, solve them with A*, BFS or DFS, and keep CSV and PDF snapshots.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Print results instead of animating them in the terminal
    #[arg(long, global = true)]
    headless: bool,

    /// Directory holding maze_<N>.csv files
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Root directory for solved CSV files
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// Root directory for solved PDF files
    #[arg(long, global = true)]
    pdf_dir: Option<PathBuf>,

    /// Directory for the log file
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,
    /// Generate a maze and save it as the next maze_<N>.csv
    Generate {
        #[arg(long)]
        rows: Option<u16>,
        #[arg(long)]
        cols: Option<u16>,
        /// Start cell as row,col
        #[arg(long, value_parser = app::parse_coord, default_value = "0,0")]
        start: Coord,
        /// Goal cell as row,col, bottom-right corner by default
        #[arg(long, value_parser = app::parse_coord)]
        goal: Option<Coord>,
        /// Fraction of cells attempted when adding extra openings, between 0 and 1
        #[arg(long, value_parser = parse_density)]
        density: Option<f64>,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Solve the latest maze, or the given file
    Solve {
        #[arg(long, value_enum, default_value_t = Algorithm::Astar)]
        algorithm: Algorithm,
        /// Maze CSV to solve instead of the latest maze_<N>.csv
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Algorithm {
    Astar,
    Bfs,
    Dfs,
}

fn parse_density(s: &str) -> Result<f64, String> {
    let density = s
        .parse::<f64>()
        .map_err(|_| format!("{:?} is not a number", s))?;
    if (0.0..=1.0).contains(&density) {
        Ok(density)
    } else {
        Err(format!("{} is outside 0..=1", density))
    }
}

impl From<Algorithm> for Solver {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Astar => Solver::AStar,
            Algorithm::Bfs => Solver::Bfs,
            Algorithm::Dfs => Solver::Dfs,
        }
    }
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(dir) = &self.input_dir {
            config.store.input_dir = dir.clone();
        }
        if let Some(dir) = &self.csv_dir {
            config.store.csv_output_dir = dir.clone();
        }
        if let Some(dir) = &self.pdf_dir {
            config.store.pdf_output_dir = dir.clone();
        }
        if let Some(Command::Generate {
            rows,
            cols,
            density,
            seed,
            ..
        }) = &self.command
        {
            let generation = &mut config.generation;
            generation.rows = rows.unwrap_or(generation.rows);
            generation.cols = cols.unwrap_or(generation.cols);
            generation.density = density.unwrap_or(generation.density);
            generation.seed = seed.or(generation.seed);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    std::fs::create_dir_all(&cli.log_dir)
        .with_context(|| format!("creating log directory {}", cli.log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&cli.log_dir, "mazerun.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    if cli.headless {
        run_headless(&cli, &config)
    } else {
        run_interactive(&cli, config)
    }
}

fn goal_or_corner(goal: Option<Coord>, config: &Config) -> Coord {
    goal.unwrap_or((
        config.generation.rows.saturating_sub(1),
        config.generation.cols.saturating_sub(1),
    ))
}

fn run_headless(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    // Never set; headless runs go to completion
    let cancel = AtomicBool::new(false);
    match &cli.command {
        None | Some(Command::Menu) => {
            anyhow::bail!("the menu needs a terminal, pick generate or solve with --headless")
        }
        Some(Command::Generate { start, goal, .. }) => {
            let goal = goal_or_corner(*goal, config);
            let generated = jobs::generate(config, *start, goal, None, &cancel)
                .context("generating maze")?
                .context("generation was cancelled")?;
            println!("{}", generated.maze);
            println!(
                "Maze {} saved to {} (start {:?}, goal {:?})",
                generated.index,
                generated.path.display(),
                generated.start,
                generated.goal
            );
        }
        Some(Command::Solve { algorithm, input }) => {
            let solver = Solver::from(*algorithm);
            let solved = jobs::solve(config, solver, input.as_deref(), None, &cancel)
                .with_context(|| format!("solving with {}", solver))?;
            println!("{}", solved.maze);
            match (&solved.outcome, &solved.files) {
                (SearchOutcome::Found(path), Some((csv, pdf))) => println!(
                    "{} found a path of {} cells. Saved to {} and {}",
                    solver,
                    path.len(),
                    csv.display(),
                    pdf.display()
                ),
                _ => println!("No path found."),
            }
        }
    }
    Ok(())
}

fn run_interactive(cli: &Cli, config: Config) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout).context("setting up terminal")?;

    let result: anyhow::Result<()> = match &cli.command {
        None | Some(Command::Menu) => App::new(config).run_menu(&mut stdout).map_err(Into::into),
        Some(Command::Generate { start, goal, .. }) => {
            let goal = goal_or_corner(*goal, &config);
            App::new(config)
                .generate(&mut stdout, *start, goal)
                .map_err(Into::into)
        }
        Some(Command::Solve { algorithm, input }) => App::new(config)
            .solve(&mut stdout, Solver::from(*algorithm), input.clone())
            .map_err(Into::into),
    };

    App::restore_terminal(&mut stdout).context("restoring terminal")?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_flag_bounds() {
        assert_eq!(parse_density("0.15"), Ok(0.15));
        assert_eq!(parse_density("1"), Ok(1.0));
        assert!(parse_density("inf").is_err());
        assert!(parse_density("1e12").is_err());
        assert!(parse_density("-0.5").is_err());
        assert!(parse_density("NaN").is_err());
        assert!(Cli::try_parse_from(["mazerun", "generate", "--density", "2"]).is_err());
    }
}
