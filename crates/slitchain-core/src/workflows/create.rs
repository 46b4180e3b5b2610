use crate::core::models::system::MolecularSystem;
use crate::engine::config::ChainInSlitConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scheduler::TaskManager;
use crate::engine::tasks::chain_in_slit::ChainInSlitCreator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument};

/// Builds a chain inside a slit and returns the finished system.
///
/// The same `seed` always yields the same conformation.
#[instrument(skip_all, name = "create_workflow")]
pub fn run(
    config: &ChainInSlitConfig,
    seed: u64,
    reporter: &ProgressReporter,
) -> Result<MolecularSystem, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Chain Creation",
    });
    info!(
        chain_length = config.chain_length,
        slit_size = config.slit_size,
        fix_mode = %config.fix_mode,
        seed,
        "Building chain in slit."
    );

    let mut system = MolecularSystem::new();
    let mut creator = ChainInSlitCreator::new(config.clone(), StdRng::seed_from_u64(seed));

    {
        let mut manager = TaskManager::new();
        manager.add_updater(&mut creator, 0);
        manager.initialize(&mut system)?;
        manager.run(&mut system, 1, reporter)?;
        manager.cleanup(&mut system)?;
    }
    if !creator.is_executed() {
        return Err(EngineError::Internal(
            "chain builder finished without building a chain".to_string(),
        ));
    }

    reporter.report(Progress::PhaseFinish);
    info!(units = system.unit_count(), "Chain creation workflow complete.");
    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{ChainInSlitConfigBuilder, FixMode};

    fn config(length: usize) -> ChainInSlitConfig {
        ChainInSlitConfigBuilder::new()
            .chain_length(length)
            .slit_size(16)
            .box_xy(32)
            .fix_mode(FixMode::SingleFixpointBottom)
            .build()
            .unwrap()
    }

    #[test]
    fn same_seed_gives_the_same_chain() {
        let reporter = ProgressReporter::new();
        let a = run(&config(24), 9, &reporter).unwrap();
        let b = run(&config(24), 9, &reporter).unwrap();
        assert_eq!(a.unit_count(), 24);
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.bonds(), b.bonds());
    }

    #[test]
    fn infeasible_config_is_reported() {
        let config = ChainInSlitConfigBuilder::new()
            .chain_length(2)
            .slit_size(32)
            .box_xy(16)
            .fix_mode(FixMode::DoubleFixedAtWalls)
            .build()
            .unwrap();
        assert!(matches!(
            run(&config, 1, &ProgressReporter::new()),
            Err(EngineError::InfeasibleGeometry { .. })
        ));
    }
}
