/// Index of a unit inside a `MolecularSystem`. Ids are 0-based and contiguous.
pub type UnitId = usize;
