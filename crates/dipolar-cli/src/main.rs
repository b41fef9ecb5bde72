//! Dipolar command-line interface.
//!
//! Generate incident fields from TOML job files:
//! ```sh
//! dipolar run job.toml
//! dipolar validate job.toml
//! dipolar beams
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dipolar_core::BeamKind;

#[derive(Parser)]
#[command(name = "dipolar")]
#[command(about = "Dipolar: incident beams for discrete-dipole scattering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the incident field for a TOML job file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a job file: geometry, context and beam initialisation, no fields.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the available beam types.
    Beams,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Dipolar incident beam generator");
            println!("===============================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_job(&job)?;
            if let Some(text) = &result.description {
                println!("Incident beam: {text}");
            }
            println!("Symmetries: {}", result.symmetry);
            println!("Total dipoles: {}", result.dipoles.len());

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            runner::write_fields(&result, &out_dir)?;

            if job.output.save_json {
                runner::write_summary_json(&result, &out_dir.join("beam.json"))?;
            }

            println!("Done.");
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let prepared = runner::prepare(&job)?;
            println!(
                "Configuration is valid: {} ({} dipoles, beam '{}', symmetries {})",
                config.display(),
                prepared.dipoles.len(),
                prepared.beam.kind(),
                prepared.symmetry
            );
            Ok(())
        }
        Commands::Beams => {
            println!("Available beam types:");
            println!();
            for kind in BeamKind::all() {
                println!("  {:<8} {}", kind.name(), kind.usage());
            }
            Ok(())
        }
    }
}
