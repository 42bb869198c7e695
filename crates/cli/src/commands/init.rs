use anyhow::{Context, Result};
use drivecage_sim::simulation::Configuration;

use crate::args::InitArgs;
use crate::printing::print_parameters;

pub fn init_configuration(args: &InitArgs) -> Result<()> {
    let output = &args.output;
    if output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    println!("🦟 Drivecage - Gene Drive Cage Simulator");
    println!("============================================\n");

    let config = build_config(args);
    config.validate().context("Invalid configuration")?;
    print_parameters(&config);

    config
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✓ Configuration written: {}", output.display());
    println!("\n💡 Use 'drivecage run -c {}' to start the simulation", output.display());

    Ok(())
}

pub fn build_config(args: &InitArgs) -> Configuration {
    let mut config = Configuration::default();
    config.execution.repetitions = args.repetitions;
    config.execution.seed = args.seed;
    config.parameters.end_time = args.end_time;
    config
}
