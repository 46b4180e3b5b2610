use crate::core::models::force::ForceReport;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::ForceAnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scheduler::TaskManager;
use crate::engine::tasks::force::ForceAnalyzer;
use crate::engine::tasks::replay::TrajectoryReplay;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Measures the force over conformation files, one measurement per file.
#[instrument(skip_all, name = "force_workflow")]
pub fn run_from_paths(
    paths: Vec<PathBuf>,
    config: &ForceAnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<ForceReport, EngineError> {
    let frames = paths.len();
    measure(TrajectoryReplay::from_paths(paths), frames, config, reporter)
}

/// Measures the force over in-memory conformations, one measurement per frame.
#[instrument(skip_all, name = "force_workflow")]
pub fn run(
    frames: Vec<MolecularSystem>,
    config: &ForceAnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<ForceReport, EngineError> {
    let count = frames.len();
    measure(TrajectoryReplay::from_frames(frames), count, config, reporter)
}

fn measure(
    mut replay: TrajectoryReplay,
    frames: usize,
    config: &ForceAnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<ForceReport, EngineError> {
    if frames == 0 {
        return Err(EngineError::TrajectoryExhausted { frames: 0 });
    }
    reporter.report(Progress::PhaseStart {
        name: "Force Measurement",
    });
    info!(
        frames,
        tracked = config.tracked_units.len(),
        begin_age = config.begin_age,
        "Measuring local force."
    );

    let mut system = MolecularSystem::new();
    replay.initialize(&mut system)?;
    let mut analyzer = ForceAnalyzer::new(&system, config)?;

    {
        let mut manager = TaskManager::new();
        manager.add_updater(&mut replay, 1);
        manager.add_analyzer(&mut analyzer, 1);
        manager.initialize(&mut system)?;
        manager.run(&mut system, (frames - 1) as u64, reporter)?;
        manager.cleanup(&mut system)?;
    }

    reporter.report(Progress::PhaseFinish);
    let report = analyzer.report();
    info!(
        frames = replay.frames_loaded(),
        measured = report.trials,
        "Force measurement workflow complete."
    );
    Ok(report)
}
