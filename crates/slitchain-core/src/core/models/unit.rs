use nalgebra::Point3;

/// A single chain unit of the bond-fluctuation model.
///
/// The unit occupies the 2x2x2 cube of lattice sites whose lower corner is `position`.
/// Positions are stored unfolded; periodic images are only resolved when sites are
/// looked up in the occupancy map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Lower corner of the occupied cube.
    pub position: Point3<i32>,
    /// Whether trial moves may displace this unit.
    pub movable: bool,
}

impl Unit {
    pub fn new(position: Point3<i32>) -> Self {
        Self {
            position,
            movable: true,
        }
    }

    pub fn pinned(position: Point3<i32>) -> Self {
        Self {
            position,
            movable: false,
        }
    }
}
