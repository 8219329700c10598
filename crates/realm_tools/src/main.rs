//! Realm Nexus - Development Tools

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use realm_core::clock::{Clock, ManualClock, SystemClock};
use realm_core::data::EconomyConfig;
use realm_core::persistence::{FileStorage, MemoryStorage, SaveStore};
use realm_core::session::GameSession;
use realm_tools::simulate::SimulationOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "realm-tools")]
#[command(about = "Development tools for Realm Nexus")]
struct Cli {
    /// Economy data file or directory (defaults to built-in values)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory or economy.ron
        #[arg(default_value = "assets/data")]
        path: PathBuf,
    },
    /// Print a save record's reconciliation report
    Inspect {
        /// Directory holding the save file
        save_dir: PathBuf,
        /// Write the reconciled record back when fields were defaulted
        #[arg(long)]
        repair: bool,
    },
    /// Run a headless session with a greedy strategy
    Simulate {
        /// Simulated seconds
        #[arg(long, default_value_t = 3600)]
        seconds: u64,
        /// Tap every N seconds (0 = never)
        #[arg(long, default_value_t = 1)]
        tap_every: u64,
        /// Resume from and save to this directory instead of memory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
}

fn load_config(data: Option<&Path>) -> EconomyConfig {
    let Some(path) = data else {
        return EconomyConfig::default();
    };
    match realm_tools::validate::validate_data_directory(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid economy data: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating data files in: {}", path.display());
            match realm_tools::validate::validate_data_directory(&path) {
                Ok(_) => tracing::info!("Validation passed"),
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Inspect { save_dir, repair } => {
            let config = load_config(cli.data.as_deref());
            let now = SystemClock.now_ms();
            match realm_tools::inspect::inspect_save(&save_dir, &config, now, repair) {
                Ok(inspection) => print!("{}", realm_tools::inspect::render(&inspection)),
                Err(e) => {
                    tracing::error!("Repair failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Simulate {
            seconds,
            tap_every,
            save_dir,
        } => {
            let config = load_config(cli.data.as_deref());
            let clock = ManualClock::new(SystemClock.now_ms());
            let store = match save_dir {
                Some(dir) => SaveStore::new(FileStorage::new(dir)),
                None => SaveStore::new(MemoryStorage::new()),
            };
            let (mut session, resume) = GameSession::resume(config, store, Box::new(clock.clone()));
            if !resume.load.missing {
                tracing::info!(
                    offline_secs = resume.offline.credited_secs,
                    "Resumed existing save"
                );
            }

            let options = SimulationOptions {
                seconds,
                tap_every,
                ..SimulationOptions::default()
            };
            let summary = realm_tools::simulate::run(&mut session, &clock, &options);
            println!("{summary}");
        }
    }
}
