//! # Core Models Module
//!
//! Data structures describing a lattice polymer system.
//!
//! ## Key Components
//!
//! - [`unit`] - A single chain unit with its lattice position and movable flag
//! - [`topology`] - Undirected bonds between units
//! - [`bondset`] - The set of allowed bond vectors (classic BFM set)
//! - [`lattice`] - Axes, the simulation box and hard walls
//! - [`force`] - Force records derived from directional acceptance counts
//! - [`system`] - The complete system with occupancy bookkeeping and trial-move checks
//! - [`ids`] - Unit identifiers
//!
//! ## Usage
//!
//! ```ignore
//! use slitchain::core::models::system::MolecularSystem;
//! use nalgebra::Point3;
//!
//! let mut system = MolecularSystem::new();
//! let a = system.add_unit_at(Point3::new(0, 0, 0));
//! let b = system.add_unit_at(Point3::new(0, 0, 2));
//! system.connect(a, b);
//! ```

pub mod bondset;
pub mod force;
pub mod ids;
pub mod lattice;
pub mod system;
pub mod topology;
pub mod unit;
