mod config;
mod edit_cmds;
mod export_cmd;
mod generate_cmd;
mod show_cmd;

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use ridecheck_core::orchestrator::GenerateConfig;
use ridecheck_core::solver::HttpSolver;
use ridecheck_core::store::Store;
use ridecheck_state::FileRepository;

use config::RidecheckConfig;
use edit_cmds::{DEFAULT_CHECK_MINUTES, DEFAULT_OPEN_MINUTES};

#[derive(Parser)]
#[command(name = "ridecheck", about = "Plan morning ride checks for an amusement park")]
struct Cli {
    /// State file path (overrides RIDECHECK_STATE_PATH env var)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Solver endpoint URL (overrides RIDECHECK_SOLVER_URL env var)
    #[arg(long, global = true)]
    solver_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a ridecheck config file from the current flags
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print one of the tables
    Show {
        #[arg(value_enum)]
        table: show_cmd::Table,
    },
    /// Ride management
    Ride {
        #[command(subcommand)]
        command: RideCommands,
    },
    /// Worker management
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
    /// Day restriction management
    Day {
        #[command(subcommand)]
        command: DayCommands,
    },
    /// Generate ridechecks for every day restriction
    Generate {
        /// Maximum number of concurrent solver requests
        #[arg(long)]
        max_in_flight: Option<usize>,
    },
    /// Export the ridecheck table as CSV
    Export {
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum RideCommands {
    /// Add a ride (named Ride<N> when no name is given)
    Add {
        name: Option<String>,
        /// Minutes it takes to check the ride
        #[arg(long, default_value_t = DEFAULT_CHECK_MINUTES)]
        minutes: u32,
    },
    /// Remove a ride and every reference to it
    Remove { name: String },
}

#[derive(Subcommand)]
enum WorkerCommands {
    /// Add a worker (named Worker<N> when no name is given)
    Add {
        name: Option<String>,
        /// Comma-separated rides the worker can check
        #[arg(long, value_delimiter = ',')]
        rides: Vec<String>,
    },
    /// Remove a worker and every absence that names them
    Remove { name: String },
}

#[derive(Subcommand)]
enum DayCommands {
    /// Add a day restriction (named Day<N> when no name is given)
    Add {
        name: Option<String>,
        /// Minutes until the park opens
        #[arg(long, default_value_t = DEFAULT_OPEN_MINUTES)]
        minutes: u32,
        /// Comma-separated rides closed that day
        #[arg(long, value_delimiter = ',')]
        closed: Vec<String>,
        /// Comma-separated workers absent that day
        #[arg(long, value_delimiter = ',')]
        absent: Vec<String>,
    },
    /// Remove a day restriction
    Remove { name: String },
}

/// Execute the `ridecheck init` command: write config file.
fn cmd_init(state: Option<&Path>, solver_url: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let resolved = RidecheckConfig::resolve(state, solver_url)?;
    let cfg = config::ConfigFile {
        solver: config::SolverSection {
            url: Some(resolved.solver_url.clone()),
            max_in_flight: resolved.max_in_flight,
        },
        storage: config::StorageSection {
            state_path: Some(resolved.storage.state_path.clone()),
        },
    };
    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  solver.url = {}", resolved.solver_url);
    println!("  storage.state_path = {}", resolved.storage.state_path.display());
    Ok(())
}

/// Open the state file, falling back to the default state when it cannot
/// be read. An unreadable file is moved to its backup path first.
fn open_store(resolved: &RidecheckConfig) -> Store<FileRepository> {
    let repo = FileRepository::new(&resolved.storage.state_path);
    let (store, err) = Store::open(repo);
    if let Some(err) = err {
        eprintln!("warning: could not load saved state, using defaults: {err}");
        let backup = store.repository().backup_path();
        if backup.exists() {
            eprintln!("warning: previous state file kept at {}", backup.display());
        }
    }
    store
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        state,
        solver_url,
        command,
    } = Cli::parse();
    let resolve = || RidecheckConfig::resolve(state.as_deref(), solver_url.as_deref());

    match command {
        Commands::Init { force } => {
            cmd_init(state.as_deref(), solver_url.as_deref(), force)?;
        }
        Commands::Show { table } => {
            let store = open_store(&resolve()?);
            print!("{}", show_cmd::render(&store.snapshot(), table));
        }
        Commands::Ride { command } => {
            let mut store = open_store(&resolve()?);
            let snapshot = store.snapshot();
            match command {
                RideCommands::Add { name, minutes } => {
                    let row = edit_cmds::add_ride(&snapshot, name, minutes)?;
                    edit_cmds::apply(&mut store, row, "Added ride");
                }
                RideCommands::Remove { name } => {
                    let row = edit_cmds::remove_ride(&snapshot, &name)?;
                    edit_cmds::apply(&mut store, row, "Removed ride");
                }
            }
        }
        Commands::Worker { command } => {
            let mut store = open_store(&resolve()?);
            let snapshot = store.snapshot();
            match command {
                WorkerCommands::Add { name, rides } => {
                    let row = edit_cmds::add_worker(&snapshot, name, &rides)?;
                    edit_cmds::apply(&mut store, row, "Added worker");
                }
                WorkerCommands::Remove { name } => {
                    let row = edit_cmds::remove_worker(&snapshot, &name)?;
                    edit_cmds::apply(&mut store, row, "Removed worker");
                }
            }
        }
        Commands::Day { command } => {
            let mut store = open_store(&resolve()?);
            let snapshot = store.snapshot();
            match command {
                DayCommands::Add {
                    name,
                    minutes,
                    closed,
                    absent,
                } => {
                    let row = edit_cmds::add_day(&snapshot, name, minutes, &closed, &absent)?;
                    edit_cmds::apply(&mut store, row, "Added day");
                }
                DayCommands::Remove { name } => {
                    let row = edit_cmds::remove_day(&snapshot, &name)?;
                    edit_cmds::apply(&mut store, row, "Removed day");
                }
            }
        }
        Commands::Generate { max_in_flight } => {
            let resolved = resolve()?;
            let mut store = open_store(&resolved);
            let solver = HttpSolver::new(&resolved.solver_url);
            let config = GenerateConfig {
                max_in_flight: max_in_flight.or(resolved.max_in_flight),
            };
            if let Some(report) = generate_cmd::run_generate(&mut store, &solver, &config).await? {
                eprint!("{report}");
                std::process::exit(1);
            }
        }
        Commands::Export { output } => {
            let store = open_store(&resolve()?);
            export_cmd::run_export(&store.snapshot(), output.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ridecheck", &mut std::io::stdout());
        }
    }

    Ok(())
}
