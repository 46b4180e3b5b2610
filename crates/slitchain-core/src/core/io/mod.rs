//! Plain-text input/output for lattice polymer systems.
//!
//! Two tab-separated formats are supported: conformation files, which carry a complete
//! [`MolecularSystem`](crate::core::models::system::MolecularSystem) (box, walls, age,
//! units and bonds), and force tables, which carry the per-unit acceptance counts and
//! the derived force of a measurement run.

pub mod conformation;
pub mod force_table;
pub mod traits;
