//! # Engine Module
//!
//! The algorithmic layer: growing a chain inside a slit, inserting units into bonds,
//! measuring local forces from trial-move acceptance, and scheduling these tasks over a
//! lattice system.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated builder configs and the fix mode
//! - **Capabilities** ([`context`]) - The read and mutate interfaces tasks work against
//! - **Insertion** ([`insertion`]) - Splitting a bond by placing a new unit between its ends
//! - **Tasks** ([`tasks`]) - The chain builder, the force analyzer and trajectory replay
//! - **Scheduling** ([`scheduler`]) - The `TaskManager` lifecycle driver
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Tasks receive the system as an argument on every lifecycle call and never hold on to
//! it, so a single `&mut` system can be threaded through any number of tasks.

pub mod config;
pub mod context;
pub mod error;
pub mod insertion;
pub mod progress;
pub mod scheduler;
pub mod tasks;
