mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

use args::{InitArgs, RunArgs};
use commands::{genotypes, init, run};

/// Drivecage: a gene-drive cage simulator
///
/// This tool simulates a caged insect population after releases of
/// homing gene-drive males and anti-drive (antidote) males.
#[derive(Parser, Debug)]
#[command(name = "drivecage")]
#[command(author, version, about = "Simulates gene-drive releases in caged insect populations", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel repetitions
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "drivecage_sim=debug")
    #[arg(long, global = true, default_value = defaults::LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a configuration file with every default spelled out.
    ///
    /// Edit the file and pass it to `run --config`.
    Init(InitArgs),

    /// Run the repetitions of a configuration and write the time series.
    Run(Box<RunArgs>),

    /// List the genotype codes in report column order.
    Genotypes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_configuration(&args)?;
        }
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Genotypes => {
            genotypes::list_genotypes();
        }
    }

    Ok(())
}
