use super::ids::UnitId;

/// An undirected bond between two units, stored with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond {
    pub unit1_id: UnitId,
    pub unit2_id: UnitId,
}

impl Bond {
    pub fn new(a: UnitId, b: UnitId) -> Self {
        Self {
            unit1_id: a.min(b),
            unit2_id: a.max(b),
        }
    }

    pub fn contains(&self, unit_id: UnitId) -> bool {
        self.unit1_id == unit_id || self.unit2_id == unit_id
    }

    /// Returns the other end of the bond, or `None` if `unit_id` is not part of it.
    pub fn partner_of(&self, unit_id: UnitId) -> Option<UnitId> {
        if self.unit1_id == unit_id {
            Some(self.unit2_id)
        } else if self.unit2_id == unit_id {
            Some(self.unit1_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_new_orders_ids() {
        let bond = Bond::new(7, 3);
        assert_eq!(bond.unit1_id, 3);
        assert_eq!(bond.unit2_id, 7);
        assert_eq!(bond, Bond::new(3, 7));
    }

    #[test]
    fn bond_contains_returns_true_for_both_units() {
        let bond = Bond::new(10, 20);
        assert!(bond.contains(10));
        assert!(bond.contains(20));
        assert!(!bond.contains(30));
    }

    #[test]
    fn partner_of_resolves_the_other_end() {
        let bond = Bond::new(4, 5);
        assert_eq!(bond.partner_of(4), Some(5));
        assert_eq!(bond.partner_of(5), Some(4));
        assert_eq!(bond.partner_of(6), None);
    }
}
