//! indexsmith migration CLI tool
//!
//! Renders migration SQL for the models described in a declaration file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use indexsmith::batch_extensions;
use indexsmith_migrate::config::{MigrateConfig, DEFAULT_CONFIG_FILE};
use indexsmith_migrate::loader::{read_declarations, Loader};

#[derive(Parser)]
#[command(name = "indexsmith-migrate")]
#[command(about = "Index synthesis and migration SQL for indexsmith models")]
#[command(version)]
struct Cli {
    /// Configuration file (default: config/indexsmith.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model declaration file (overrides `models_file`)
    #[arg(long, global = true)]
    models: Option<PathBuf>,

    /// Statement delimiter (overrides `statement_delimiter`)
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the migration SQL
    Print,

    /// List the database extensions the declared indexes need
    Extensions,

    /// Synthesize every model and report the first error
    Check,

    /// Print the projected schemas as JSON
    Project {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = MigrateConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(models) = cli.models.clone() {
        config.models_file = models;
    }
    if let Some(delimiter) = cli.delimiter.clone() {
        config.statement_delimiter = delimiter;
    }
    log::debug!("configuration: {:?}", config);

    let models_file = config.models_file.clone();
    let loader = Loader::new(config);
    let file = read_declarations(&models_file)?;

    match cli.command {
        Commands::Print => {
            print!("{}", loader.load(&file)?);
        }
        Commands::Extensions => {
            let syntheses = loader.synthesize_all(&file)?;
            for ext in batch_extensions(&syntheses) {
                println!("{ext}");
            }
        }
        Commands::Check => {
            let syntheses = loader.synthesize_all(&file)?;
            if !cli.quiet {
                for synthesis in &syntheses {
                    let status = if synthesis.projected {
                        "indexed".green()
                    } else {
                        "unchanged".dimmed()
                    };
                    println!("  {} {}", synthesis.schema.name.bold(), status);
                }
                println!(
                    "{} {} model(s) in {}",
                    "✅".green(),
                    syntheses.len(),
                    models_file.display()
                );
            }
        }
        Commands::Project { pretty } => {
            let syntheses = loader.synthesize_all(&file)?;
            let json = if pretty {
                serde_json::to_string_pretty(&syntheses)?
            } else {
                serde_json::to_string(&syntheses)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
