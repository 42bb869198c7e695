use anyhow::{Context, Result};
use drivecage_sim::simulation::{run_repetitions, write_results, Configuration};
use drivecage_sim::storage::TsvRecorder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::args::RunArgs;
use crate::defaults;
use crate::printing::print_parameters;

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    eprintln!("🦟 Drivecage - Running Simulation");
    eprintln!("============================================");

    let mut config = match &args.config {
        Some(path) => Configuration::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => Configuration::default(),
    };
    apply_overrides(&mut config, args)?;
    config.validate().context("Invalid configuration")?;
    print_parameters(&config);

    let repetitions = config.execution.repetitions;
    let pb = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new(repetitions as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(defaults::PROGRESS_TEMPLATE)
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let results = run_repetitions(&config, |result| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
        info!(
            round = result.round,
            rows = result.rows.len(),
            final_population = result.summary.final_population,
            "repetition finished"
        );
    })
    .context("Simulation failed")?;

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    let rows = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_tsv(&results, BufWriter::new(file))?
        }
        None => write_tsv(&results, std::io::stdout().lock())?,
    };

    eprintln!("\n✓ Simulation complete!");
    eprintln!("  Repetitions: {}", results.len());
    eprintln!("  Rows written: {rows}");
    if let Some(path) = &args.output {
        eprintln!("  Output: {}", path.display());
    }

    Ok(())
}

fn write_tsv<W: Write>(
    results: &[drivecage_sim::simulation::RepetitionResult],
    writer: W,
) -> Result<usize> {
    let mut recorder = TsvRecorder::new(writer);
    let rows = write_results(results, &mut recorder).context("Failed to write results")?;
    Ok(rows)
}

fn apply_overrides(config: &mut Configuration, args: &RunArgs) -> Result<()> {
    if let Some(repetitions) = args.repetitions {
        config.execution.repetitions = repetitions;
    }
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    if let Some(end_time) = args.end_time {
        config.parameters.end_time = end_time;
    }
    if let Some(size) = args.release_size {
        config.parameters.release = size;
    }
    if let Some(path) = &args.time_points {
        config.execution.report_times = Some(read_time_points(path)?);
    }
    Ok(())
}

/// One time per line; blank lines are skipped.
fn read_time_points(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read time points {}", path.display()))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.trim().parse::<f64>().with_context(|| {
                format!("{}:{}: invalid time point '{}'", path.display(), i + 1, line.trim())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn run_args() -> RunArgs {
        RunArgs {
            config: None,
            output: None,
            repetitions: None,
            seed: None,
            end_time: None,
            release_size: None,
            time_points: None,
            no_progress: true,
        }
    }

    #[test]
    fn test_overrides_replace_configured_values() {
        let mut config = Configuration::default();
        let args = RunArgs {
            repetitions: Some(2),
            seed: Some(5),
            end_time: Some(30.0),
            release_size: Some(120),
            ..run_args()
        };
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.execution.repetitions, 2);
        assert_eq!(config.execution.seed, Some(5));
        assert_eq!(config.parameters.end_time, 30.0);
        assert_eq!(config.parameters.release, 120);
    }

    #[test]
    fn test_read_time_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("times.txt");
        std::fs::write(&path, "0\n7.5\n\n14\n").unwrap();
        assert_eq!(read_time_points(&path).unwrap(), vec![0.0, 7.5, 14.0]);

        std::fs::write(&path, "1\nseven\n").unwrap();
        let err = read_time_points(&path).unwrap_err();
        assert!(err.to_string().contains(":2:"));
    }

    #[test]
    fn test_missing_time_points_file() {
        let args = RunArgs {
            time_points: Some(PathBuf::from("/nonexistent/times.txt")),
            ..run_args()
        };
        assert!(apply_overrides(&mut Configuration::default(), &args).is_err());
    }
}
