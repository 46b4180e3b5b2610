use super::Task;
use crate::core::io::conformation::ConformationFile;
use crate::core::io::traits::LatticeFile;
use crate::core::models::system::MolecularSystem;
use crate::engine::error::EngineError;
use std::path::PathBuf;
use tracing::{debug, info};

const TASK_NAME: &str = "replay";

type FrameSource<'a> = Box<dyn Iterator<Item = Result<MolecularSystem, EngineError>> + 'a>;

/// Feeds a sequence of recorded conformations into the live system.
///
/// The first frame replaces the live system entirely (box, walls, bonds, age). Every
/// later frame only updates unit positions and the age, so the unit count must stay the
/// same across the trajectory.
pub struct TrajectoryReplay<'a> {
    frames: FrameSource<'a>,
    frames_loaded: usize,
}

impl<'a> TrajectoryReplay<'a> {
    /// Replays conformations that are already in memory.
    pub fn from_frames(frames: Vec<MolecularSystem>) -> Self {
        Self {
            frames: Box::new(frames.into_iter().map(Ok)),
            frames_loaded: 0,
        }
    }

    /// Replays conformation files, reading each one when it is reached.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            frames: Box::new(paths.into_iter().map(|path| {
                debug!(path = %path.display(), "Reading conformation frame.");
                ConformationFile::read_from_path(&path).map_err(EngineError::from)
            })),
            frames_loaded: 0,
        }
    }

    pub fn frames_loaded(&self) -> usize {
        self.frames_loaded
    }

    fn next_frame(&mut self) -> Result<MolecularSystem, EngineError> {
        let frame = self
            .frames
            .next()
            .ok_or(EngineError::TrajectoryExhausted {
                frames: self.frames_loaded,
            })??;
        self.frames_loaded += 1;
        Ok(frame)
    }

    /// Loads the first frame unless one has been loaded already.
    pub fn initialize(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError> {
        if self.frames_loaded > 0 {
            return Ok(());
        }
        *system = self.next_frame()?;
        info!(
            units = system.unit_count(),
            age = system.age(),
            "Loaded initial conformation."
        );
        Ok(())
    }

    /// Loads the next frame's positions and age into `system`.
    pub fn execute(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError> {
        if self.frames_loaded == 0 {
            return Err(EngineError::NotInitialized(TASK_NAME));
        }
        let frame = self.next_frame()?;
        if frame.unit_count() != system.unit_count() {
            return Err(EngineError::TopologyChanged {
                expected: system.unit_count(),
                found: frame.unit_count(),
            });
        }
        system
            .set_positions_from(frame.positions())
            .ok_or_else(|| EngineError::Internal("frame positions rejected".to_string()))?;
        system.set_age(frame.age());
        system.synchronize();
        debug!(frame = self.frames_loaded, age = frame.age(), "Loaded frame.");
        Ok(())
    }
}

impl Task<MolecularSystem> for TrajectoryReplay<'_> {
    fn name(&self) -> &'static str {
        TASK_NAME
    }

    fn initialize(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError> {
        TrajectoryReplay::initialize(self, system)
    }

    fn execute(&mut self, system: &mut MolecularSystem) -> Result<(), EngineError> {
        TrajectoryReplay::execute(self, system)
    }

    fn cleanup(&mut self, _system: &mut MolecularSystem) -> Result<(), EngineError> {
        info!(frames = self.frames_loaded, "Trajectory replay finished.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn frame(top_z: i32, age: u64) -> MolecularSystem {
        let mut system = MolecularSystem::new();
        system.set_box_extent(crate::core::models::lattice::Axis::Z, 16);
        let a = system.add_unit_at(Point3::new(0, 0, 0));
        let b = system.add_unit_at(Point3::new(0, 0, top_z));
        system.connect(a, b).unwrap();
        system.set_age(age);
        system
    }

    #[test]
    fn first_frame_replaces_the_system_and_later_frames_update_positions() {
        let mut replay = TrajectoryReplay::from_frames(vec![frame(2, 0), frame(3, 10)]);
        let mut system = MolecularSystem::new();

        replay.initialize(&mut system).unwrap();
        assert_eq!(system.unit_count(), 2);
        assert!(system.are_connected(0, 1));
        assert_eq!(system.age(), 0);

        replay.initialize(&mut system).unwrap();
        assert_eq!(replay.frames_loaded(), 1);

        replay.execute(&mut system).unwrap();
        assert_eq!(system.position(1), Some(Point3::new(0, 0, 3)));
        assert_eq!(system.age(), 10);
        assert!(system.is_synchronized());
    }

    #[test]
    fn running_past_the_last_frame_is_an_error() {
        let mut replay = TrajectoryReplay::from_frames(vec![frame(2, 0)]);
        let mut system = MolecularSystem::new();
        replay.initialize(&mut system).unwrap();
        assert!(matches!(
            replay.execute(&mut system),
            Err(EngineError::TrajectoryExhausted { frames: 1 })
        ));
    }

    #[test]
    fn execute_before_initialize_is_rejected() {
        let mut replay = TrajectoryReplay::from_frames(vec![frame(2, 0)]);
        let mut system = MolecularSystem::new();
        assert!(matches!(
            replay.execute(&mut system),
            Err(EngineError::NotInitialized(TASK_NAME))
        ));
    }

    #[test]
    fn frames_with_a_different_unit_count_are_rejected() {
        let mut grown = frame(2, 5);
        grown.add_unit_at(Point3::new(0, 0, 4));
        let mut replay = TrajectoryReplay::from_frames(vec![frame(2, 0), grown]);
        let mut system = MolecularSystem::new();
        replay.initialize(&mut system).unwrap();
        assert!(matches!(
            replay.execute(&mut system),
            Err(EngineError::TopologyChanged {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn missing_file_surfaces_as_a_conformation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut replay = TrajectoryReplay::from_paths(vec![dir.path().join("absent.conf")]);
        let mut system = MolecularSystem::new();
        assert!(matches!(
            replay.initialize(&mut system),
            Err(EngineError::Conformation(_))
        ));
    }
}
