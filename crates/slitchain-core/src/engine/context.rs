use super::error::EngineError;
use crate::core::models::bondset::BondVectorSet;
use crate::core::models::ids::UnitId;
use crate::core::models::lattice::{Axis, Wall};
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;

/// Read access to a lattice conformation.
///
/// This is everything the force analyzer needs from the system it observes.
pub trait ProvidesConformation {
    fn unit_count(&self) -> usize;
    fn position_of(&self, id: UnitId) -> Option<Point3<i32>>;
    fn neighbors_of(&self, id: UnitId) -> Option<&[UnitId]>;
    fn box_extents(&self) -> [u32; 3];
    fn age(&self) -> u64;
}

/// Mutating operations used while embedding a chain.
pub trait ProvidesChainCreation: ProvidesConformation {
    fn configure_box(&mut self, extents: [u32; 3], periodic: [bool; 3]);
    fn add_wall(&mut self, wall: Wall);
    fn register_bond_set(&mut self, set: &BondVectorSet);
    fn bond_set(&self) -> &BondVectorSet;

    fn add_unit_at(&mut self, position: Point3<i32>) -> UnitId;
    fn connect(&mut self, a: UnitId, b: UnitId) -> Result<(), EngineError>;
    fn disconnect(&mut self, a: UnitId, b: UnitId) -> Result<(), EngineError>;
    fn are_connected(&self, a: UnitId, b: UnitId) -> bool;
    fn set_movable(&mut self, id: UnitId, movable: bool) -> Result<(), EngineError>;

    /// Bounds, walls and excluded volume for a prospective unit at `position`.
    fn is_site_free(&self, position: &Point3<i32>) -> bool;

    /// Renumbers units so that old unit `order[i]` becomes unit `i`.
    fn renumber(&mut self, order: &[UnitId]) -> Result<(), EngineError>;
    fn synchronize(&mut self);
}

impl ProvidesConformation for MolecularSystem {
    fn unit_count(&self) -> usize {
        MolecularSystem::unit_count(self)
    }

    fn position_of(&self, id: UnitId) -> Option<Point3<i32>> {
        self.position(id)
    }

    fn neighbors_of(&self, id: UnitId) -> Option<&[UnitId]> {
        self.bonded_neighbors(id)
    }

    fn box_extents(&self) -> [u32; 3] {
        self.simulation_box().extents
    }

    fn age(&self) -> u64 {
        MolecularSystem::age(self)
    }
}

impl ProvidesChainCreation for MolecularSystem {
    fn configure_box(&mut self, extents: [u32; 3], periodic: [bool; 3]) {
        for axis in Axis::ALL {
            self.set_box_extent(axis, extents[axis.index()]);
            self.set_periodic(axis, periodic[axis.index()]);
        }
    }

    fn add_wall(&mut self, wall: Wall) {
        MolecularSystem::add_wall(self, wall);
    }

    fn register_bond_set(&mut self, set: &BondVectorSet) {
        MolecularSystem::register_bond_set(self, set);
    }

    fn bond_set(&self) -> &BondVectorSet {
        MolecularSystem::bond_set(self)
    }

    fn add_unit_at(&mut self, position: Point3<i32>) -> UnitId {
        MolecularSystem::add_unit_at(self, position)
    }

    fn connect(&mut self, a: UnitId, b: UnitId) -> Result<(), EngineError> {
        MolecularSystem::connect(self, a, b).ok_or_else(|| missing_unit(self, a, b))
    }

    fn disconnect(&mut self, a: UnitId, b: UnitId) -> Result<(), EngineError> {
        MolecularSystem::disconnect(self, a, b).ok_or_else(|| missing_unit(self, a, b))
    }

    fn are_connected(&self, a: UnitId, b: UnitId) -> bool {
        MolecularSystem::are_connected(self, a, b)
    }

    fn set_movable(&mut self, id: UnitId, movable: bool) -> Result<(), EngineError> {
        MolecularSystem::set_movable(self, id, movable).ok_or(EngineError::UnitNotFound(id))
    }

    fn is_site_free(&self, position: &Point3<i32>) -> bool {
        MolecularSystem::is_site_free(self, position, None)
    }

    fn renumber(&mut self, order: &[UnitId]) -> Result<(), EngineError> {
        MolecularSystem::renumber(self, order).ok_or_else(|| {
            EngineError::Internal(format!(
                "renumbering order of length {} is not a permutation of {} units",
                order.len(),
                MolecularSystem::unit_count(self)
            ))
        })
    }

    fn synchronize(&mut self) {
        MolecularSystem::synchronize(self);
    }
}

fn missing_unit(system: &MolecularSystem, a: UnitId, b: UnitId) -> EngineError {
    if a == b {
        EngineError::Internal(format!("cannot bond unit {} to itself", a))
    } else if system.unit(a).is_none() {
        EngineError::UnitNotFound(a)
    } else {
        EngineError::UnitNotFound(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_box_sets_extents_and_periodicity() {
        let mut system = MolecularSystem::new();
        system.configure_box([8, 8, 16], [true, true, false]);
        assert_eq!(system.box_extents(), [8, 8, 16]);
        assert!(!system.simulation_box().is_periodic(Axis::Z));
        assert!(!system.is_synchronized());
    }

    #[test]
    fn connect_reports_the_missing_unit() {
        let mut system = MolecularSystem::new();
        let a = ProvidesChainCreation::add_unit_at(&mut system, Point3::origin());
        assert!(matches!(
            ProvidesChainCreation::connect(&mut system, a, 4),
            Err(EngineError::UnitNotFound(4))
        ));
        assert!(matches!(
            ProvidesChainCreation::connect(&mut system, a, a),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn renumber_rejects_invalid_orders() {
        let mut system = MolecularSystem::new();
        ProvidesChainCreation::add_unit_at(&mut system, Point3::origin());
        assert!(ProvidesChainCreation::renumber(&mut system, &[1]).is_err());
        assert!(ProvidesChainCreation::renumber(&mut system, &[0]).is_ok());
    }
}
