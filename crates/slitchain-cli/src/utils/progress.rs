use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use slitchain::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress on stderr.
///
/// A phase shows as a spinner labelled with the phase name. While the scheduler runs
/// cycles (one frame each during force measurement) the spinner turns into a cycle bar.
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        bar.finish_and_clear();
        Self { bar }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                bar.reset();
                bar.set_length(0);
                bar.set_style(phase_style());
                bar.set_prefix(name);
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::CyclesStart { total } => {
                bar.disable_steady_tick();
                bar.set_length(total);
                bar.set_position(0);
                bar.set_style(cycle_style());
            }
            Progress::CycleDone => bar.inc(1),
            Progress::CyclesFinish => {
                if let Some(total) = bar.length() {
                    bar.set_position(total);
                }
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.set_style(done_style());
                bar.finish();
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn phase_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn cycle_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<18} [{bar:40.cyan/blue}] {pos}/{len} cycles ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

fn done_style() -> ProgressStyle {
    ProgressStyle::with_template("✓ {prefix} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_handler() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn handler_starts_idle() {
        let handler = hidden_handler();
        assert_eq!(handler.bar.length(), Some(0));
        assert!(handler.bar.is_finished());
    }

    #[test]
    fn measurement_phase_counts_frames_as_cycles() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Force Measurement",
        });
        assert_eq!(handler.bar.prefix(), "Force Measurement");
        assert!(!handler.bar.is_finished());

        callback(Progress::CyclesStart { total: 4 });
        callback(Progress::CycleDone);
        callback(Progress::CycleDone);
        assert_eq!(handler.bar.length(), Some(4));
        assert_eq!(handler.bar.position(), 2);

        callback(Progress::CyclesFinish);
        assert_eq!(handler.bar.position(), 4);

        callback(Progress::PhaseFinish);
        assert!(handler.bar.is_finished());
    }

    #[test]
    fn single_frame_run_finishes_without_cycles() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Force Measurement",
        });
        callback(Progress::CyclesStart { total: 0 });
        callback(Progress::CyclesFinish);
        callback(Progress::PhaseFinish);

        assert_eq!(handler.bar.position(), 0);
        assert!(handler.bar.is_finished());
    }

    #[test]
    fn new_phase_resets_the_previous_one() {
        let handler = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Chain Creation",
        });
        callback(Progress::CyclesStart { total: 1 });
        callback(Progress::CycleDone);
        callback(Progress::PhaseFinish);

        callback(Progress::PhaseStart {
            name: "Force Measurement",
        });
        assert_eq!(handler.bar.position(), 0);
        assert_eq!(handler.bar.prefix(), "Force Measurement");
        assert!(!handler.bar.is_finished());
    }
}
