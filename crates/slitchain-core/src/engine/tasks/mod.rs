//! Lifecycle tasks that act on a lattice system.
//!
//! Every task follows the same three-phase lifecycle: `initialize` once before the run,
//! `execute` on every scheduled cycle, and `cleanup` once afterwards. The
//! [`TaskManager`](crate::engine::scheduler::TaskManager) drives these calls; tasks never
//! keep a reference to the system between them.
//!
//! - [`chain_in_slit`] - Grows a linear chain inside a slit (an updater)
//! - [`force`] - Counts directional trial-move acceptance of tracked units (an analyzer)
//! - [`replay`] - Loads successive conformation frames into the system (an updater)

pub mod chain_in_slit;
pub mod force;
pub mod replay;

use super::error::EngineError;

pub trait Task<S: ?Sized> {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, system: &mut S) -> Result<(), EngineError>;

    fn execute(&mut self, system: &mut S) -> Result<(), EngineError>;

    fn cleanup(&mut self, system: &mut S) -> Result<(), EngineError>;
}

impl<S: ?Sized, T: Task<S> + ?Sized> Task<S> for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn initialize(&mut self, system: &mut S) -> Result<(), EngineError> {
        (**self).initialize(system)
    }

    fn execute(&mut self, system: &mut S) -> Result<(), EngineError> {
        (**self).execute(system)
    }

    fn cleanup(&mut self, system: &mut S) -> Result<(), EngineError> {
        (**self).cleanup(system)
    }
}
