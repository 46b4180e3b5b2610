use nalgebra::{Point3, Vector3};
use std::fmt;

/// A Cartesian lattice axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Axis::X => "x",
                Axis::Y => "y",
                Axis::Z => "z",
            }
        )
    }
}

/// Box extents and per-axis periodicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulationBox {
    pub extents: [u32; 3],
    pub periodic: [bool; 3],
}

impl SimulationBox {
    pub fn new(extents: [u32; 3], periodic: [bool; 3]) -> Self {
        Self { extents, periodic }
    }

    pub fn extent(&self, axis: Axis) -> u32 {
        self.extents[axis.index()]
    }

    pub fn is_periodic(&self, axis: Axis) -> bool {
        self.periodic[axis.index()]
    }

    /// Checks that a unit cube with lower corner `position` fits on every non-periodic
    /// axis, i.e. `0 <= c` and `c + 1 <= extent - 1`.
    pub fn contains(&self, position: &Point3<i32>) -> bool {
        Axis::ALL.iter().all(|&axis| {
            if self.is_periodic(axis) {
                return true;
            }
            let c = i64::from(position[axis.index()]);
            c >= 0 && c + 1 < i64::from(self.extent(axis))
        })
    }

    /// Maps a lattice site onto its periodic image inside the box.
    pub fn fold(&self, site: [i32; 3]) -> [i32; 3] {
        let mut folded = site;
        for axis in Axis::ALL {
            let i = axis.index();
            let extent = self.extents[i];
            if self.periodic[i] && extent > 0 {
                folded[i] = (i64::from(site[i]).rem_euclid(i64::from(extent))) as i32;
            }
        }
        folded
    }
}

/// A hard, one-sided lattice plane.
///
/// Only axis-aligned normals take part in the excluded-volume check. A unit touches the
/// wall when one of its two layers along the normal axis lies in the wall plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wall {
    pub base: Point3<i32>,
    pub normal: Vector3<i32>,
}

impl Wall {
    pub fn new(base: Point3<i32>, normal: Vector3<i32>) -> Self {
        Self { base, normal }
    }

    /// The axis of an axis-aligned normal, or `None` for oblique or zero normals.
    pub fn axis(&self) -> Option<Axis> {
        let non_zero: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|axis| self.normal[axis.index()] != 0)
            .collect();
        match non_zero.as_slice() {
            [axis] => Some(*axis),
            _ => None,
        }
    }

    pub fn is_touched_by(&self, position: &Point3<i32>) -> bool {
        match self.axis() {
            Some(axis) => {
                let plane = self.base[axis.index()];
                let c = position[axis.index()];
                c == plane || c + 1 == plane
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slit_box() -> SimulationBox {
        SimulationBox::new([16, 16, 16], [true, true, false])
    }

    #[test]
    fn contains_respects_non_periodic_bounds_only() {
        let sim_box = slit_box();
        assert!(sim_box.contains(&Point3::new(-40, 99, 0)));
        assert!(sim_box.contains(&Point3::new(0, 0, 14)));
        assert!(!sim_box.contains(&Point3::new(0, 0, 15)));
        assert!(!sim_box.contains(&Point3::new(0, 0, -1)));
    }

    #[test]
    fn fold_wraps_periodic_axes() {
        let sim_box = slit_box();
        assert_eq!(sim_box.fold([-1, 17, -1]), [15, 1, -1]);
        assert_eq!(sim_box.fold([3, 4, 5]), [3, 4, 5]);
    }

    #[test]
    fn fold_leaves_zero_extent_axes_untouched() {
        let sim_box = SimulationBox::new([0, 0, 0], [true, true, true]);
        assert_eq!(sim_box.fold([-5, 7, 9]), [-5, 7, 9]);
    }

    #[test]
    fn wall_is_touched_by_both_cube_layers() {
        let wall = Wall::new(Point3::new(0, 0, 14), Vector3::new(0, 0, 1));
        assert_eq!(wall.axis(), Some(Axis::Z));
        assert!(wall.is_touched_by(&Point3::new(3, 3, 14)));
        assert!(wall.is_touched_by(&Point3::new(3, 3, 13)));
        assert!(!wall.is_touched_by(&Point3::new(3, 3, 12)));
        assert!(!wall.is_touched_by(&Point3::new(3, 3, 15)));
    }

    #[test]
    fn oblique_wall_has_no_axis() {
        let wall = Wall::new(Point3::origin(), Vector3::new(1, 1, 0));
        assert_eq!(wall.axis(), None);
        assert!(!wall.is_touched_by(&Point3::origin()));
    }
}
