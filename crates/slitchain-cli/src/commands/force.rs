use crate::cli::ForceArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use slitchain::{engine::progress::ProgressReporter, workflows};
use tracing::{info, warn};

pub fn run(args: ForceArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_force_args(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Measuring the force on {} unit(s) over {} conformation(s)...",
        config.tracked_units.len(),
        args.inputs.len()
    );
    let report = workflows::force::run_from_paths(args.inputs, &config, &reporter)?;

    if report.trials == 0 {
        warn!(
            begin_age = config.begin_age,
            "No conformation was old enough to be measured."
        );
        println!("Warning: no conformation reached the begin age; all counters are zero.");
    }
    for record in &report.records {
        println!(
            "  unit {:>6}: down {:>8}, up {:>8}, force {:.6}",
            record.unit_id, record.down_count, record.up_count, record.force
        );
    }
    if let Some(path) = &config.output_path {
        println!(
            "✓ Force table ({} measurement(s)) written to: {}",
            report.trials,
            path.display()
        );
    }
    Ok(())
}
