//! # Workflows Module
//!
//! High-level entry points that wire tasks, the scheduler and progress reporting into
//! complete procedures.
//!
//! - **Chain Creation** ([`create`]) - Builds a linear chain inside a slit from a
//!   [`ChainInSlitConfig`](crate::engine::config::ChainInSlitConfig) and a seed.
//! - **Force Measurement** ([`force`]) - Replays a trajectory and estimates the local force
//!   on the tracked units.

pub mod create;
pub mod force;
