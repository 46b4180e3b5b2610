use itertools::Itertools;
use nalgebra::Vector3;
use std::collections::HashSet;

/// Representative vectors of the classic BFM bond set. The full set contains every
/// permutation and sign variant of these, 108 vectors in total.
const CLASSIC_BASE_VECTORS: [[i32; 3]; 6] = [
    [2, 0, 0],
    [2, 1, 0],
    [2, 1, 1],
    [2, 2, 1],
    [3, 0, 0],
    [3, 1, 0],
];

/// The finite set of relative offsets allowed between two bonded units.
///
/// Vectors keep their insertion order for iteration, while membership tests go through
/// a hash set.
#[derive(Debug, Clone, Default)]
pub struct BondVectorSet {
    vectors: Vec<Vector3<i32>>,
    lookup: HashSet<[i32; 3]>,
}

impl BondVectorSet {
    /// Creates an empty bond-vector set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the classic bond-fluctuation-model bond set.
    ///
    /// With this set, single-site moves can never make two bonds cross.
    pub fn classic() -> Self {
        let mut set = Self::new();
        for base in CLASSIC_BASE_VECTORS {
            for perm in base.iter().copied().permutations(3) {
                for signs in 0u8..8 {
                    let component = |axis: usize| {
                        if signs & (1 << axis) != 0 {
                            -perm[axis]
                        } else {
                            perm[axis]
                        }
                    };
                    set.insert(Vector3::new(component(0), component(1), component(2)));
                }
            }
        }
        set
    }

    /// Adds a vector, returning `false` if it was already present.
    pub fn insert(&mut self, vector: Vector3<i32>) -> bool {
        if self.lookup.insert([vector.x, vector.y, vector.z]) {
            self.vectors.push(vector);
            true
        } else {
            false
        }
    }

    /// Adds every vector of `other` that is not present yet.
    pub fn extend_from(&mut self, other: &BondVectorSet) {
        for vector in other.iter() {
            self.insert(*vector);
        }
    }

    pub fn contains(&self, vector: &Vector3<i32>) -> bool {
        self.lookup.contains(&[vector.x, vector.y, vector.z])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector3<i32>> {
        self.vectors.iter()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl PartialEq for BondVectorSet {
    fn eq(&self, other: &Self) -> bool {
        self.lookup == other.lookup
    }
}

impl Eq for BondVectorSet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_set_has_108_vectors() {
        assert_eq!(BondVectorSet::classic().len(), 108);
    }

    #[test]
    fn classic_set_contains_axis_and_diagonal_vectors() {
        let set = BondVectorSet::classic();
        assert!(set.contains(&Vector3::new(0, 0, 2)));
        assert!(set.contains(&Vector3::new(0, 0, -3)));
        assert!(set.contains(&Vector3::new(1, 0, 3)));
        assert!(set.contains(&Vector3::new(-2, 2, 1)));
        assert!(set.contains(&Vector3::new(1, -1, 2)));
    }

    #[test]
    fn classic_set_rejects_forbidden_vectors() {
        let set = BondVectorSet::classic();
        assert!(!set.contains(&Vector3::new(0, 0, 0)));
        assert!(!set.contains(&Vector3::new(0, 0, 1)));
        assert!(!set.contains(&Vector3::new(1, 1, 1)));
        assert!(!set.contains(&Vector3::new(2, 2, 0)));
        assert!(!set.contains(&Vector3::new(3, 1, 1)));
        assert!(!set.contains(&Vector3::new(0, 0, 4)));
    }

    #[test]
    fn classic_set_squared_lengths_are_in_allowed_range() {
        let allowed = [4, 5, 6, 9, 10];
        for v in BondVectorSet::classic().iter() {
            assert!(allowed.contains(&v.dot(v)), "unexpected vector {:?}", v);
        }
    }

    #[test]
    fn insert_is_idempotent_and_extend_merges() {
        let mut set = BondVectorSet::new();
        assert!(set.is_empty());
        assert!(set.insert(Vector3::new(2, 0, 0)));
        assert!(!set.insert(Vector3::new(2, 0, 0)));
        assert_eq!(set.len(), 1);

        set.extend_from(&BondVectorSet::classic());
        assert_eq!(set.len(), 108);
        assert_eq!(set, BondVectorSet::classic());
    }
}
