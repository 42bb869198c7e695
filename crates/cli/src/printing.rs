//! Human-readable configuration summaries.
//!
//! Everything here goes to stderr: `run` may be writing the time series to
//! stdout.

use drivecage_sim::simulation::{Configuration, LateReleaseConfig, LateTrigger};

pub fn print_parameters(config: &Configuration) {
    let execution = &config.execution;
    let params = &config.parameters;
    let releases = &config.releases;

    eprintln!("\n📋 Run Configuration");
    eprintln!("  • Repetitions: {} [-r, --repetitions]", execution.repetitions);
    match execution.seed {
        Some(seed) => eprintln!("  • Random Seed: {seed} [--seed]"),
        None => eprintln!("  • Random Seed: Random [--seed]"),
    }
    eprintln!("  • Days: {} [-e, --end-time]", params.end_time);
    eprintln!("  • Time Step: {} days", params.time_step);
    match &execution.report_times {
        Some(times) => eprintln!("  • Reports: {} time points [--time-points]", times.len()),
        None => eprintln!("  • Reports: every day [--time-points]"),
    }

    eprintln!("\n🦟 Cage");
    let days: Vec<String> = params.release_days.iter().map(u8::to_string).collect();
    eprintln!("  • Release Days (weekday): {}", days.join(", "));
    eprintln!("  • Pupae Promoted: {} per release day [--release-size]", params.release);
    for (day, size) in &params.special_releases {
        eprintln!("    - day {day}: {size}");
    }
    if let Some(filter) = &params.eggs_filter {
        eprintln!(
            "  • Eggs Filter: Normal(mean={}, std={})",
            filter.mean, filter.std
        );
    }
    if params.discard_unreleased_pupae {
        eprintln!("  • Unreleased pupae are discarded");
    }

    eprintln!("\n🧬 Releases");
    for (i, ((wild, drive), anti)) in releases
        .wild_type
        .iter()
        .zip(&releases.drive)
        .zip(&releases.antidote)
        .enumerate()
    {
        eprintln!("  • Cohort {}: {wild} wild-type, {drive} drive males, {anti} antidote males", i + 1);
    }
    let antidote = if releases.hom_antidote { "WWAA" } else { "WWAW" };
    eprintln!("  • Antidote Genotype: {antidote}");
    match &releases.late {
        Some(late) => print_late(late),
        None => eprintln!("  • Late Release: Disabled"),
    }
    eprintln!();
}

fn print_late(late: &LateReleaseConfig) {
    let trigger = match late.trigger {
        LateTrigger::StartTime { time } => format!("from day {time}"),
        LateTrigger::DriveFrequency { threshold } => {
            format!("once drive frequency > {threshold} for 7 reports")
        }
    };
    let repeats = if late.max_repeats == -1 {
        "unlimited".to_string()
    } else {
        late.max_repeats.to_string()
    };
    eprintln!("  • Late Release: {trigger}");
    eprintln!(
        "    - {} antidote males, {} wild-type males, repeats: {repeats}",
        late.antidote, late.wild_type
    );
}
