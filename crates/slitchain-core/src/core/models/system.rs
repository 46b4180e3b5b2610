use super::bondset::BondVectorSet;
use super::ids::UnitId;
use super::lattice::{Axis, SimulationBox, Wall};
use super::topology::Bond;
use super::unit::Unit;
use crate::core::utils::lattice::cube_sites;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// A complete lattice polymer system: units, bonds, box, walls and bond-vector set.
///
/// Besides the primary data the system keeps an occupancy map from (folded) lattice
/// sites to the unit covering them. The map is derived state: operations that
/// invalidate it wholesale (box changes, renumbering, bulk position loads) mark the
/// system as unsynchronized, and [`MolecularSystem::synchronize`] rebuilds it.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Units indexed by their id.
    units: Vec<Unit>,
    /// Bonded neighbors per unit, in the order the bonds were created.
    bond_adjacency: Vec<Vec<UnitId>>,
    simulation_box: SimulationBox,
    walls: Vec<Wall>,
    bond_set: BondVectorSet,
    /// Number of elapsed Monte-Carlo steps.
    age: u64,
    /// Folded lattice site -> covering unit.
    occupancy: HashMap<[i32; 3], UnitId>,
    needs_sync: bool,
}

impl MolecularSystem {
    /// Creates a new, empty system with a zero-sized, non-periodic box.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Returns an iterator over all units in id order.
    ///
    /// # Return
    ///
    /// An iterator yielding `(UnitId, &Unit)` pairs.
    pub fn units_iter(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units.iter().enumerate()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn position(&self, id: UnitId) -> Option<Point3<i32>> {
        self.units.get(id).map(|unit| unit.position)
    }

    pub fn positions(&self) -> Vec<Point3<i32>> {
        self.units.iter().map(|unit| unit.position).collect()
    }

    pub fn is_movable(&self, id: UnitId) -> Option<bool> {
        self.units.get(id).map(|unit| unit.movable)
    }

    pub fn simulation_box(&self) -> &SimulationBox {
        &self.simulation_box
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn bond_set(&self) -> &BondVectorSet {
        &self.bond_set
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn set_age(&mut self, age: u64) {
        self.age = age;
    }

    pub fn is_synchronized(&self) -> bool {
        !self.needs_sync
    }

    /// Adds a movable unit at `position` and returns its id.
    ///
    /// No excluded-volume check is performed here; callers that need one use
    /// [`MolecularSystem::is_site_free`] first.
    pub fn add_unit_at(&mut self, position: Point3<i32>) -> UnitId {
        let id = self.units.len();
        self.units.push(Unit::new(position));
        self.bond_adjacency.push(Vec::new());
        self.occupy(id, &position);
        id
    }

    /// Moves a single unit, keeping the occupancy map current.
    ///
    /// # Return
    ///
    /// Returns `None` if the unit does not exist.
    pub fn set_position(&mut self, id: UnitId, position: Point3<i32>) -> Option<()> {
        let old = self.units.get(id)?.position;
        self.vacate(id, &old);
        self.units[id].position = position;
        self.occupy(id, &position);
        Some(())
    }

    /// Replaces all unit positions at once and marks the system unsynchronized.
    ///
    /// # Return
    ///
    /// Returns `None` (leaving the system untouched) if the number of positions does not
    /// match the number of units.
    pub fn set_positions_from<I>(&mut self, positions: I) -> Option<()>
    where
        I: IntoIterator<Item = Point3<i32>>,
    {
        let positions: Vec<Point3<i32>> = positions.into_iter().collect();
        if positions.len() != self.units.len() {
            return None;
        }
        for (unit, position) in self.units.iter_mut().zip(positions) {
            unit.position = position;
        }
        self.needs_sync = true;
        Some(())
    }

    pub fn set_movable(&mut self, id: UnitId, movable: bool) -> Option<()> {
        self.units.get_mut(id)?.movable = movable;
        Some(())
    }

    /// Adds a bond between two distinct units. Adding an existing bond succeeds
    /// without creating a duplicate.
    ///
    /// # Return
    ///
    /// Returns `None` if either unit does not exist or both ids are equal.
    pub fn connect(&mut self, a: UnitId, b: UnitId) -> Option<()> {
        if a == b || a >= self.units.len() || b >= self.units.len() {
            return None;
        }
        if !self.bond_adjacency[a].contains(&b) {
            self.bond_adjacency[a].push(b);
            self.bond_adjacency[b].push(a);
        }
        Some(())
    }

    /// Removes the bond between two units if present.
    ///
    /// # Return
    ///
    /// Returns `None` if either unit does not exist.
    pub fn disconnect(&mut self, a: UnitId, b: UnitId) -> Option<()> {
        if a >= self.units.len() || b >= self.units.len() {
            return None;
        }
        self.bond_adjacency[a].retain(|&n| n != b);
        self.bond_adjacency[b].retain(|&n| n != a);
        Some(())
    }

    pub fn are_connected(&self, a: UnitId, b: UnitId) -> bool {
        self.bond_adjacency
            .get(a)
            .is_some_and(|neighbors| neighbors.contains(&b))
    }

    pub fn bonded_neighbors(&self, id: UnitId) -> Option<&[UnitId]> {
        self.bond_adjacency.get(id).map(Vec::as_slice)
    }

    /// Returns every bond once, ordered by `(unit1_id, unit2_id)`.
    pub fn bonds(&self) -> Vec<Bond> {
        let mut bonds: Vec<Bond> = self
            .bond_adjacency
            .iter()
            .enumerate()
            .flat_map(|(id, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |&&n| n > id)
                    .map(move |&n| Bond::new(id, n))
            })
            .collect();
        bonds.sort_unstable();
        bonds
    }

    pub fn set_box_extent(&mut self, axis: Axis, extent: u32) {
        self.simulation_box.extents[axis.index()] = extent;
        self.needs_sync = true;
    }

    pub fn set_periodic(&mut self, axis: Axis, periodic: bool) {
        self.simulation_box.periodic[axis.index()] = periodic;
        self.needs_sync = true;
    }

    pub fn add_wall(&mut self, wall: Wall) {
        self.walls.push(wall);
    }

    /// Merges `set` into the registered bond vectors. Registering the same set twice
    /// has no further effect.
    pub fn register_bond_set(&mut self, set: &BondVectorSet) {
        self.bond_set.extend_from(set);
    }

    /// Checks whether a unit could sit at `position`: inside the box on non-periodic
    /// axes, clear of every wall, and without sharing a lattice site with any unit
    /// other than `ignore`.
    pub fn is_site_free(&self, position: &Point3<i32>, ignore: Option<UnitId>) -> bool {
        if !self.simulation_box.contains(position) {
            return false;
        }
        if self.walls.iter().any(|wall| wall.is_touched_by(position)) {
            return false;
        }
        cube_sites(position).all(|site| {
            match self.occupancy.get(&self.simulation_box.fold(site)) {
                Some(&occupant) => Some(occupant) == ignore,
                None => true,
            }
        })
    }

    /// The trial-move feasibility predicate.
    ///
    /// A displacement of unit `id` by `delta` is feasible when the unit is movable, the
    /// target site is free (box, walls, excluded volume) and every bond of the unit
    /// stays inside the registered bond-vector set. Nothing is committed.
    pub fn check_trial_displacement(&self, id: UnitId, delta: &Vector3<i32>) -> bool {
        let Some(unit) = self.units.get(id) else {
            return false;
        };
        if !unit.movable {
            return false;
        }
        let target = unit.position + delta;
        let bonds_valid = self.bond_adjacency[id].iter().all(|&n| {
            let bond = self.units[n].position - target;
            self.bond_set.contains(&bond)
        });
        bonds_valid && self.is_site_free(&target, Some(id))
    }

    /// Renumbers the units so that old unit `order[i]` becomes unit `i`.
    ///
    /// The occupancy map is left stale and the system is marked unsynchronized.
    ///
    /// # Return
    ///
    /// Returns `None` (leaving the system untouched) if `order` is not a permutation of
    /// the current ids.
    pub fn renumber(&mut self, order: &[UnitId]) -> Option<()> {
        let count = self.units.len();
        if order.len() != count {
            return None;
        }
        let mut new_id = vec![usize::MAX; count];
        for (new, &old) in order.iter().enumerate() {
            if old >= count || new_id[old] != usize::MAX {
                return None;
            }
            new_id[old] = new;
        }

        let units = order.iter().map(|&old| self.units[old].clone()).collect();
        let adjacency = order
            .iter()
            .map(|&old| {
                self.bond_adjacency[old]
                    .iter()
                    .map(|&n| new_id[n])
                    .collect()
            })
            .collect();

        self.units = units;
        self.bond_adjacency = adjacency;
        self.needs_sync = true;
        Some(())
    }

    /// Rebuilds the occupancy map from the current positions and box.
    pub fn synchronize(&mut self) {
        self.occupancy.clear();
        for id in 0..self.units.len() {
            let position = self.units[id].position;
            self.occupy(id, &position);
        }
        self.needs_sync = false;
    }

    fn occupy(&mut self, id: UnitId, position: &Point3<i32>) {
        for site in cube_sites(position) {
            self.occupancy.insert(self.simulation_box.fold(site), id);
        }
    }

    fn vacate(&mut self, id: UnitId, position: &Point3<i32>) {
        for site in cube_sites(position) {
            let key = self.simulation_box.fold(site);
            if self.occupancy.get(&key) == Some(&id) {
                self.occupancy.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slit_system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        system.set_box_extent(Axis::X, 16);
        system.set_box_extent(Axis::Y, 16);
        system.set_box_extent(Axis::Z, 16);
        system.set_periodic(Axis::X, true);
        system.set_periodic(Axis::Y, true);
        system.set_periodic(Axis::Z, false);
        system.register_bond_set(&BondVectorSet::classic());
        system.synchronize();
        system
    }

    fn dimer() -> MolecularSystem {
        let mut system = slit_system();
        let a = system.add_unit_at(Point3::new(0, 0, 0));
        let b = system.add_unit_at(Point3::new(0, 0, 2));
        system.connect(a, b).unwrap();
        system
    }

    #[test]
    fn new_system_is_empty_and_synchronized() {
        let system = MolecularSystem::new();
        assert!(system.is_empty());
        assert!(system.is_synchronized());
        assert!(system.bonds().is_empty());
        assert_eq!(system.age(), 0);
    }

    #[test]
    fn add_and_connect_units() {
        let system = dimer();
        assert_eq!(system.unit_count(), 2);
        assert!(system.are_connected(0, 1));
        assert!(system.are_connected(1, 0));
        assert_eq!(system.bonds(), vec![Bond::new(0, 1)]);
        assert_eq!(system.bonded_neighbors(1), Some(&[0][..]));
    }

    #[test]
    fn connect_is_idempotent_and_rejects_invalid_ids() {
        let mut system = dimer();
        assert!(system.connect(0, 1).is_some());
        assert_eq!(system.bonded_neighbors(0).unwrap().len(), 1);
        assert!(system.connect(0, 0).is_none());
        assert!(system.connect(0, 9).is_none());
    }

    #[test]
    fn disconnect_removes_both_directions() {
        let mut system = dimer();
        system.disconnect(1, 0).unwrap();
        assert!(!system.are_connected(0, 1));
        assert!(system.bonded_neighbors(1).unwrap().is_empty());
    }

    #[test]
    fn excluded_volume_blocks_overlapping_sites() {
        let system = dimer();
        assert!(!system.is_site_free(&Point3::new(1, 1, 1), None));
        assert!(!system.is_site_free(&Point3::new(-1, 0, 3), None));
        assert!(system.is_site_free(&Point3::new(2, 0, 0), None));
        assert!(system.is_site_free(&Point3::new(0, 0, 0), Some(0)));
    }

    #[test]
    fn excluded_volume_uses_periodic_images() {
        let system = dimer();
        assert!(!system.is_site_free(&Point3::new(15, 0, 0), None));
        assert!(!system.is_site_free(&Point3::new(-16, 0, 0), None));
        assert!(system.is_site_free(&Point3::new(14, 0, 0), None));
    }

    #[test]
    fn walls_and_box_bounds_block_sites() {
        let mut system = slit_system();
        system.add_wall(Wall::new(Point3::new(0, 0, 9), Vector3::new(0, 0, 1)));
        assert!(system.is_site_free(&Point3::new(4, 4, 7), None));
        assert!(!system.is_site_free(&Point3::new(4, 4, 8), None));
        assert!(!system.is_site_free(&Point3::new(4, 4, -1), None));
    }

    #[test]
    fn trial_displacement_respects_bonds_and_movable_flag() {
        let mut system = dimer();
        // (0,0,1) is not a bond vector and the unit cubes would overlap.
        assert!(!system.check_trial_displacement(1, &Vector3::new(0, 0, -1)));
        assert!(system.check_trial_displacement(1, &Vector3::new(0, 0, 1)));
        assert!(system.check_trial_displacement(1, &Vector3::new(1, 0, 0)));

        system.set_movable(1, false).unwrap();
        assert!(!system.check_trial_displacement(1, &Vector3::new(0, 0, 1)));
        assert!(!system.check_trial_displacement(5, &Vector3::new(0, 0, 1)));
    }

    #[test]
    fn trial_displacement_rejects_bond_stretching_beyond_set() {
        let mut system = slit_system();
        let a = system.add_unit_at(Point3::new(0, 0, 0));
        let b = system.add_unit_at(Point3::new(0, 0, 3));
        system.connect(a, b).unwrap();
        assert!(!system.check_trial_displacement(b, &Vector3::new(0, 0, 1)));
        assert!(system.check_trial_displacement(b, &Vector3::new(0, 0, -1)));
    }

    #[test]
    fn set_position_updates_occupancy() {
        let mut system = dimer();
        system.set_position(1, Point3::new(0, 0, 3)).unwrap();
        assert!(system.is_site_free(&Point3::new(2, 0, 1), None));
        assert!(!system.is_site_free(&Point3::new(0, 0, 4), None));
        assert!(system.set_position(7, Point3::origin()).is_none());
    }

    #[test]
    fn set_positions_from_requires_matching_length() {
        let mut system = dimer();
        assert!(system.set_positions_from(vec![Point3::origin()]).is_none());
        assert!(system.is_synchronized());

        system
            .set_positions_from(vec![Point3::new(4, 4, 0), Point3::new(4, 4, 2)])
            .unwrap();
        assert!(!system.is_synchronized());
        system.synchronize();
        assert!(system.is_site_free(&Point3::new(0, 0, 0), None));
        assert!(!system.is_site_free(&Point3::new(4, 4, 1), None));
    }

    #[test]
    fn renumber_permutes_units_and_bonds() {
        let mut system = slit_system();
        let a = system.add_unit_at(Point3::new(0, 0, 0));
        let b = system.add_unit_at(Point3::new(0, 0, 4));
        let c = system.add_unit_at(Point3::new(0, 0, 2));
        system.connect(a, c).unwrap();
        system.connect(c, b).unwrap();

        system.renumber(&[0, 2, 1]).unwrap();
        assert!(!system.is_synchronized());
        assert_eq!(system.position(1), Some(Point3::new(0, 0, 2)));
        assert_eq!(system.position(2), Some(Point3::new(0, 0, 4)));
        assert_eq!(system.bonds(), vec![Bond::new(0, 1), Bond::new(1, 2)]);

        system.synchronize();
        assert!(system.is_synchronized());
        assert!(system.check_trial_displacement(2, &Vector3::new(0, 0, 1)));
    }

    #[test]
    fn renumber_rejects_non_permutations() {
        let mut system = dimer();
        assert!(system.renumber(&[0, 0]).is_none());
        assert!(system.renumber(&[0]).is_none());
        assert!(system.renumber(&[0, 2]).is_none());
        assert!(system.is_synchronized());
    }
}
