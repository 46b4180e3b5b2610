use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::tasks::Task;
use tracing::{debug, info};

struct ScheduledTask<'t, S: ?Sized> {
    task: Box<dyn Task<S> + 't>,
    /// Execute every `period` cycles; `0` means initialize and clean up only.
    period: u64,
}

impl<S: ?Sized> ScheduledTask<'_, S> {
    fn is_due(&self, cycle: u64) -> bool {
        self.period > 0 && cycle % self.period == 0
    }
}

/// Sequences the lifecycle of updaters and analyzers over a shared system.
///
/// Updaters change the system, analyzers observe it. Within every phase updaters run
/// before analyzers, each group in registration order. The first error aborts the
/// current phase and is returned to the caller.
pub struct TaskManager<'t, S: ?Sized> {
    updaters: Vec<ScheduledTask<'t, S>>,
    analyzers: Vec<ScheduledTask<'t, S>>,
    is_initialized: bool,
    cycles_run: u64,
}

impl<'t, S: ?Sized> Default for TaskManager<'t, S> {
    fn default() -> Self {
        Self {
            updaters: Vec::new(),
            analyzers: Vec::new(),
            is_initialized: false,
            cycles_run: 0,
        }
    }
}

impl<'t, S: ?Sized> TaskManager<'t, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_updater(&mut self, task: impl Task<S> + 't, period: u64) {
        self.updaters.push(ScheduledTask {
            task: Box::new(task),
            period,
        });
    }

    pub fn add_analyzer(&mut self, task: impl Task<S> + 't, period: u64) {
        self.analyzers.push(ScheduledTask {
            task: Box::new(task),
            period,
        });
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    fn all_tasks(&mut self) -> impl Iterator<Item = &mut ScheduledTask<'t, S>> {
        self.updaters.iter_mut().chain(self.analyzers.iter_mut())
    }

    pub fn initialize(&mut self, system: &mut S) -> Result<(), EngineError> {
        for scheduled in self.all_tasks() {
            debug!(task = scheduled.task.name(), "Initializing task.");
            scheduled.task.initialize(system)?;
        }
        self.is_initialized = true;
        Ok(())
    }

    /// Runs `cycles` scheduling cycles, executing every task whose period divides the
    /// cycle number.
    pub fn run(
        &mut self,
        system: &mut S,
        cycles: u64,
        reporter: &ProgressReporter,
    ) -> Result<(), EngineError> {
        if !self.is_initialized {
            return Err(EngineError::NotInitialized("task_manager"));
        }

        reporter.report(Progress::CyclesStart { total: cycles });
        for _ in 0..cycles {
            let cycle = self.cycles_run + 1;
            for scheduled in self.all_tasks().filter(|s| s.is_due(cycle)) {
                scheduled.task.execute(system)?;
            }
            self.cycles_run = cycle;
            reporter.report(Progress::CycleDone);
        }
        reporter.report(Progress::CyclesFinish);
        info!(cycles, total = self.cycles_run, "Task cycles complete.");
        Ok(())
    }

    pub fn cleanup(&mut self, system: &mut S) -> Result<(), EngineError> {
        for scheduled in self.all_tasks() {
            debug!(task = scheduled.task.name(), "Cleaning up task.");
            scheduled.task.cleanup(system)?;
        }
        Ok(())
    }
}
