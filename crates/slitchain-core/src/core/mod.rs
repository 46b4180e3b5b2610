//! # Core Module
//!
//! Fundamental building blocks for lattice polymer systems in the bond-fluctuation model.
//!
//! ## Architecture
//!
//! - **Lattice Representation** ([`models`]) - Units, bonds, bond-vector sets, walls, the
//!   simulation box and the `MolecularSystem` that ties them together
//! - **Lattice Helpers** ([`utils`]) - Power-of-two box rounding and cube-site enumeration
//! - **File I/O** ([`io`]) - Conformation files and force tables
//!
//! Every unit occupies the eight lattice sites of a 2x2x2 cube whose lower corner is the
//! unit position. Two units may not share a site, and a bond between two units must be
//! one of the vectors of the registered bond-vector set.

pub mod io;
pub mod models;
pub mod utils;
