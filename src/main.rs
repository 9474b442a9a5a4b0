//! Page Zones CLI
//!
//! Usage:
//!   page-zones [OPTIONS] <SCENE>
//!
//! Options:
//!   -c, --config <FILE>  Engine configuration (TOML format)
//!   -e, --effects        Print every effect emitted while running the scene
//!   -v, --verbose...     More logging on stderr (-v debug, -vv trace)
//!   -h, --help           Print help

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use page_zones::{run_with_config, EngineConfig, PageZonesError, RunConfig};

#[derive(Parser)]
#[command(name = "page-zones")]
#[command(about = "Run a page template scene through the zone constraint engine")]
struct Cli {
    /// Scene file (TOML format)
    scene: PathBuf,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print every effect emitted while running the scene
    #[arg(short, long)]
    effects: bool,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(match cli.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        })
        .init();

    let engine = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let source = match fs::read_to_string(&cli.scene) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", cli.scene.display(), e);
            std::process::exit(1);
        }
    };

    let config = RunConfig::new()
        .with_engine(engine)
        .with_trace_effects(cli.verbose > 0);
    match run_with_config(&source, config) {
        Ok(result) => {
            if cli.effects {
                print!("{}", result.effect_log());
            }
            print!("{}", result);
        }
        Err(PageZonesError::Scene(e)) => {
            let filename = cli.scene.display().to_string();
            eprint!("{}", e.format(&source, &filename));
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
