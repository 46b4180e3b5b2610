//! # slitchain Core Library
//!
//! Lattice-chain tooling for the bond-fluctuation model (BFM): embedding a linear chain
//! inside a slit and estimating the local force on selected chain units from the
//! acceptance statistics of elementary trial displacements.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Lattice data models (`MolecularSystem`, bond-vector
//!   sets, walls, the simulation box), lattice helpers and plain-text I/O.
//!
//! - **[`engine`]: The Logic Core.** The chain-in-slit builder, the midpoint insertion
//!   strategy, the force analyzer, the trajectory replay task and the `TaskManager` that
//!   sequences their `initialize`/`execute`/`cleanup` lifecycle.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures (build a chain, measure the
//!   force over a trajectory) used by the command-line front end.

pub mod core;
pub mod engine;
pub mod workflows;
