use crate::cli::CreateArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use slitchain::{
    core::io::{conformation::ConformationFile, traits::LatticeFile},
    engine::progress::ProgressReporter,
    workflows,
};
use tracing::info;

pub fn run(args: CreateArgs) -> Result<()> {
    if args.output.is_dir() {
        return Err(CliError::Argument(format!(
            "output path '{}' is a directory",
            args.output.display()
        )));
    }
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_with_create_args(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Building a chain of {} unit(s) in a slit of width {} ({}, seed {})...",
        settings.chain.chain_length,
        settings.chain.slit_size,
        settings.chain.fix_mode,
        settings.seed
    );
    let system = workflows::create::run(&settings.chain, settings.seed, &reporter)?;

    info!("Writing conformation to {:?}", &args.output);
    ConformationFile::write_to_path(&system, &args.output).map_err(|e| {
        CliError::FileParsing {
            path: args.output.clone(),
            source: e.into(),
        }
    })?;

    println!(
        "✓ Chain with {} unit(s) written to: {}",
        system.unit_count(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use slitchain::core::models::lattice::Axis;

    #[test]
    fn create_writes_a_readable_conformation() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chain.conf");
        let argv = [
            "slitchain",
            "create",
            "-o",
            output.to_str().unwrap(),
            "-n",
            "8",
            "--slit-size",
            "12",
            "--box-xy",
            "32",
            "--seed",
            "5",
        ];
        let Commands::Create(args) = Cli::parse_from(argv).command else {
            panic!("expected create command");
        };

        run(args).unwrap();

        let system = ConformationFile::read_from_path(&output).unwrap();
        assert_eq!(system.unit_count(), 8);
        assert_eq!(system.simulation_box().extent(Axis::Z), 16);
        assert!(!system.is_movable(0).unwrap());
    }

    #[test]
    fn directory_output_is_rejected_before_building() {
        let dir = tempfile::tempdir().unwrap();
        let argv = [
            "slitchain",
            "create",
            "-o",
            dir.path().to_str().unwrap(),
            "--slit-size",
            "8",
        ];
        let Commands::Create(args) = Cli::parse_from(argv).command else {
            panic!("expected create command");
        };
        assert!(matches!(run(args), Err(CliError::Argument(_))));
    }
}
