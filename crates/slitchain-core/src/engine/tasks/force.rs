use super::Task;
use crate::core::io::force_table::ForceTable;
use crate::core::models::bondset::BondVectorSet;
use crate::core::models::force::{ForceRecord, ForceReport};
use crate::core::models::ids::UnitId;
use crate::core::models::lattice::Axis;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::ForceAnalysisConfig;
use crate::engine::context::ProvidesConformation;
use crate::engine::error::EngineError;
use nalgebra::Vector3;
use std::path::PathBuf;
use tracing::{debug, info};

const TASK_NAME: &str = "force";

/// Estimates the local force on tracked units from trial-move acceptance.
///
/// Each measurement copies the live positions into a private shadow system that is
/// periodic along all three axes and has no walls, then checks whether every tracked
/// unit could step one site up or down along Z. Over many measurements the ratio of
/// feasible down to up steps gives the force as `ln(n_down / n_up)`.
///
/// The live system is only ever read.
pub struct ForceAnalyzer {
    tracked_units: Vec<UnitId>,
    begin_age: u64,
    output_path: Option<PathBuf>,
    shadow: Option<MolecularSystem>,
    counter_up: Vec<u64>,
    counter_down: Vec<u64>,
    trial_count: u64,
}

impl ForceAnalyzer {
    /// Creates an analyzer for the units named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptySelection`] if no unit is tracked and
    /// [`EngineError::UnitNotFound`] if a tracked id does not exist in `system`.
    pub fn new<S>(system: &S, config: &ForceAnalysisConfig) -> Result<Self, EngineError>
    where
        S: ProvidesConformation + ?Sized,
    {
        if config.tracked_units.is_empty() {
            return Err(EngineError::EmptySelection);
        }
        if let Some(&missing) = config
            .tracked_units
            .iter()
            .find(|&&id| id >= system.unit_count())
        {
            return Err(EngineError::UnitNotFound(missing));
        }

        let tracked = config.tracked_units.len();
        Ok(Self {
            tracked_units: config.tracked_units.clone(),
            begin_age: config.begin_age,
            output_path: config.output_path.clone(),
            shadow: None,
            counter_up: vec![0; tracked],
            counter_down: vec![0; tracked],
            trial_count: 0,
        })
    }

    pub fn tracked_units(&self) -> &[UnitId] {
        &self.tracked_units
    }

    pub fn is_initialized(&self) -> bool {
        self.shadow.is_some()
    }

    pub fn counter_up(&self) -> &[u64] {
        &self.counter_up
    }

    pub fn counter_down(&self) -> &[u64] {
        &self.counter_down
    }

    pub fn trial_count(&self) -> u64 {
        self.trial_count
    }

    /// Builds the shadow system on the first call, then measures once.
    pub fn initialize<S>(&mut self, system: &S) -> Result<(), EngineError>
    where
        S: ProvidesConformation + ?Sized,
    {
        if self.shadow.is_none() {
            self.shadow = Some(build_shadow(system)?);
            info!(
                tracked = self.tracked_units.len(),
                begin_age = self.begin_age,
                "Force analyzer initialized."
            );
        }
        self.execute(system)
    }

    /// Performs one measurement unless the system is younger than the begin age.
    pub fn execute<S>(&mut self, system: &S) -> Result<(), EngineError>
    where
        S: ProvidesConformation + ?Sized,
    {
        let Some(shadow) = self.shadow.as_mut() else {
            return Err(EngineError::NotInitialized(TASK_NAME));
        };

        let age = system.age();
        if age < self.begin_age {
            debug!(age, begin_age = self.begin_age, "Skipping force measurement.");
            return Ok(());
        }

        let expected = shadow.unit_count();
        let found = system.unit_count();
        if expected != found {
            return Err(EngineError::TopologyChanged { expected, found });
        }
        let positions = (0..found)
            .map(|id| system.position_of(id).ok_or(EngineError::UnitNotFound(id)))
            .collect::<Result<Vec<_>, _>>()?;
        shadow.set_positions_from(positions).ok_or_else(|| {
            EngineError::Internal("shadow rejected the live positions".to_string())
        })?;
        shadow.set_age(age);
        shadow.synchronize();

        let up: Vector3<i32> = Vector3::z();
        let down = -up;
        for (slot, &unit) in self.tracked_units.iter().enumerate() {
            shadow
                .set_movable(unit, true)
                .ok_or(EngineError::UnitNotFound(unit))?;
            if shadow.check_trial_displacement(unit, &up) {
                self.counter_up[slot] += 1;
            }
            if shadow.check_trial_displacement(unit, &down) {
                self.counter_down[slot] += 1;
            }
        }
        self.trial_count += 1;
        debug!(age, trials = self.trial_count, "Force measurement recorded.");
        Ok(())
    }

    pub fn report(&self) -> ForceReport {
        let records = self
            .tracked_units
            .iter()
            .zip(self.counter_down.iter().zip(&self.counter_up))
            .map(|(&unit, (&down, &up))| ForceRecord::from_counts(unit, down, up))
            .collect();
        ForceReport {
            trials: self.trial_count,
            records,
        }
    }

    /// Produces the final report and writes it if an output path is configured.
    pub fn cleanup(&self) -> Result<ForceReport, EngineError> {
        let report = self.report();
        if let Some(path) = &self.output_path {
            ForceTable::write_to_path(&report, path)?;
            info!(path = %path.display(), "Force table written.");
        }
        info!(trials = report.trials, "Force analysis finished.");
        Ok(report)
    }
}

/// A fully periodic, wall-free copy of the live chain with the classic bond set.
/// Every shadow unit stays movable for good; the shadow never outlives the analyzer.
fn build_shadow<S>(system: &S) -> Result<MolecularSystem, EngineError>
where
    S: ProvidesConformation + ?Sized,
{
    let mut shadow = MolecularSystem::new();
    let extents = system.box_extents();
    for axis in Axis::ALL {
        shadow.set_box_extent(axis, extents[axis.index()]);
        shadow.set_periodic(axis, true);
    }

    let count = system.unit_count();
    for id in 0..count {
        let position = system.position_of(id).ok_or(EngineError::UnitNotFound(id))?;
        shadow.add_unit_at(position);
    }
    for id in 0..count {
        let neighbors = system.neighbors_of(id).ok_or(EngineError::UnitNotFound(id))?;
        for &n in neighbors.iter().filter(|&&n| n > id) {
            shadow.connect(id, n).ok_or(EngineError::UnitNotFound(n))?;
        }
    }

    shadow.register_bond_set(&BondVectorSet::classic());
    shadow.set_age(system.age());
    shadow.synchronize();
    Ok(shadow)
}

impl<S> Task<S> for ForceAnalyzer
where
    S: ProvidesConformation + ?Sized,
{
    fn name(&self) -> &'static str {
        TASK_NAME
    }

    fn initialize(&mut self, system: &mut S) -> Result<(), EngineError> {
        ForceAnalyzer::initialize(self, &*system)
    }

    fn execute(&mut self, system: &mut S) -> Result<(), EngineError> {
        ForceAnalyzer::execute(self, &*system)
    }

    fn cleanup(&mut self, _system: &mut S) -> Result<(), EngineError> {
        ForceAnalyzer::cleanup(self).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::lattice::Wall;
    use crate::engine::config::ForceAnalysisConfigBuilder;
    use nalgebra::Point3;

    fn grafted_unit() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        for (axis, extent) in Axis::ALL.into_iter().zip([16, 16, 8]) {
            system.set_box_extent(axis, extent);
            system.set_periodic(axis, axis != Axis::Z);
        }
        system.register_bond_set(&BondVectorSet::classic());
        let id = system.add_unit_at(Point3::origin());
        system.set_movable(id, false);
        system.synchronize();
        system
    }

    fn tracking(units: Vec<UnitId>, begin_age: u64) -> ForceAnalysisConfig {
        ForceAnalysisConfigBuilder::new()
            .tracked_units(units)
            .begin_age(begin_age)
            .build()
            .unwrap()
    }

    #[test]
    fn construction_validates_the_selection() {
        let system = grafted_unit();
        let empty = ForceAnalysisConfig {
            tracked_units: vec![],
            begin_age: 0,
            output_path: None,
        };
        assert!(matches!(
            ForceAnalyzer::new(&system, &empty),
            Err(EngineError::EmptySelection)
        ));
        assert!(matches!(
            ForceAnalyzer::new(&system, &tracking(vec![0, 3], 0)),
            Err(EngineError::UnitNotFound(3))
        ));

        let analyzer = ForceAnalyzer::new(&system, &tracking(vec![0, 0, 0, 0], 1234)).unwrap();
        assert_eq!(analyzer.counter_up().len(), 4);
        assert_eq!(analyzer.counter_down().len(), 4);
        assert_eq!(analyzer.trial_count(), 0);
    }

    #[test]
    fn free_unit_can_step_both_ways_and_ignores_walls() {
        let mut system = grafted_unit();
        system.add_wall(Wall::new(Point3::new(0, 0, 2), Vector3::new(0, 0, 1)));
        let mut analyzer = ForceAnalyzer::new(&system, &tracking(vec![0], 0)).unwrap();

        analyzer.initialize(&system).unwrap();
        assert_eq!(analyzer.counter_up(), &[1]);
        assert_eq!(analyzer.counter_down(), &[1]);
        assert_eq!(analyzer.trial_count(), 1);

        analyzer.execute(&system).unwrap();
        assert_eq!(analyzer.counter_up(), &[2]);
        assert_eq!(analyzer.counter_down(), &[2]);
        assert_eq!(analyzer.trial_count(), 2);
    }

    #[test]
    fn bonded_neighbor_above_blocks_the_up_step() {
        let mut system = grafted_unit();
        let top = system.add_unit_at(Point3::new(0, 0, 2));
        system.connect(0, top).unwrap();

        let mut analyzer = ForceAnalyzer::new(&system, &tracking(vec![0], 0)).unwrap();
        analyzer.initialize(&system).unwrap();
        assert_eq!(analyzer.counter_up(), &[0]);
        assert_eq!(analyzer.counter_down(), &[1]);

        system.set_position(top, Point3::new(0, 0, 3)).unwrap();
        analyzer.execute(&system).unwrap();
        assert_eq!(analyzer.counter_up(), &[1]);
        assert_eq!(analyzer.counter_down(), &[1]);
        assert_eq!(analyzer.trial_count(), 2);
    }

    #[test]
    fn measurements_before_begin_age_are_skipped() {
        let mut system = grafted_unit();
        let mut analyzer = ForceAnalyzer::new(&system, &tracking(vec![0], 100)).unwrap();
        analyzer.initialize(&system).unwrap();
        analyzer.execute(&system).unwrap();
        assert_eq!(analyzer.trial_count(), 0);
        assert_eq!(analyzer.counter_up(), &[0]);

        system.set_age(100);
        analyzer.execute(&system).unwrap();
        assert_eq!(analyzer.trial_count(), 1);
    }

    #[test]
    fn execute_before_initialize_is_rejected() {
        let system = grafted_unit();
        let mut analyzer = ForceAnalyzer::new(&system, &tracking(vec![0], 0)).unwrap();
        assert!(matches!(
            analyzer.execute(&system),
            Err(EngineError::NotInitialized(TASK_NAME))
        ));
    }

    #[test]
    fn unit_count_change_is_a_topology_error() {
        let mut system = grafted_unit();
        let mut analyzer = ForceAnalyzer::new(&system, &tracking(vec![0], 0)).unwrap();
        analyzer.initialize(&system).unwrap();
        system.add_unit_at(Point3::new(6, 6, 4));
        assert!(matches!(
            analyzer.execute(&system),
            Err(EngineError::TopologyChanged {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn report_carries_counts_and_log_ratio() {
        let mut system = grafted_unit();
        let top = system.add_unit_at(Point3::new(0, 0, 2));
        system.connect(0, top).unwrap();
        let mut analyzer = ForceAnalyzer::new(&system, &tracking(vec![0, 1], 0)).unwrap();
        analyzer.initialize(&system).unwrap();

        let report = analyzer.cleanup().unwrap();
        assert_eq!(report.trials, 1);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].unit_id, 0);
        assert_eq!(report.records[0].up_count, 0);
        assert_eq!(report.records[0].force, f64::INFINITY);
    }

    #[test]
    fn cleanup_writes_the_force_table() {
        let system = grafted_unit();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("force.dat");
        let config = ForceAnalysisConfigBuilder::new()
            .tracked_units(vec![0])
            .output_path(path.clone())
            .build()
            .unwrap();
        let mut analyzer = ForceAnalyzer::new(&system, &config).unwrap();
        analyzer.initialize(&system).unwrap();
        analyzer.cleanup().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().nth(2), Some("0\t1\t1\t0"));
    }
}
