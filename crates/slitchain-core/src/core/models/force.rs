use super::ids::UnitId;

/// Force estimate for one tracked unit.
///
/// `force` is `ln(down_count / up_count)` in units of the thermal energy per lattice
/// step. It is non-finite whenever `up_count` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceRecord {
    pub unit_id: UnitId,
    pub down_count: u64,
    pub up_count: u64,
    pub force: f64,
}

impl ForceRecord {
    pub fn from_counts(unit_id: UnitId, down_count: u64, up_count: u64) -> Self {
        Self {
            unit_id,
            down_count,
            up_count,
            force: (down_count as f64 / up_count as f64).ln(),
        }
    }
}

/// The result of a force analysis: one record per tracked unit plus the number of
/// measurements that contributed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceReport {
    pub trials: u64,
    pub records: Vec<ForceRecord>,
}
