use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration path (.yaml/.yml or .json)
    #[arg(short, long, default_value = defaults::CONFIG_PATH)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    /// Number of repetitions
    #[arg(short = 'r', long, default_value_t = defaults::REPETITIONS)]
    pub repetitions: usize,

    /// Simulated days
    #[arg(short = 'e', long, default_value_t = defaults::END_TIME)]
    pub end_time: f64,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output TSV file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the number of repetitions
    #[arg(short = 'r', long)]
    pub repetitions: Option<usize>,

    /// Override the master random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the simulated days
    #[arg(short = 'e', long)]
    pub end_time: Option<f64>,

    /// Override the number of pupae promoted on each release day
    #[arg(long)]
    pub release_size: Option<usize>,

    /// File with one report time (in days) per line
    ///
    /// Rows are written only at these times instead of every whole day.
    #[arg(long)]
    pub time_points: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
