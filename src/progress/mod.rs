//! Progress reporting for transfer runs.
//!
//! A run emits three kinds of notifications: `start` once at the beginning,
//! `report` per unit (collection or file) at begin and end, and `end` once at
//! completion. The reporter is an optional capability; absence is modeled by
//! [`NoopReporter`] so call sites never branch on presence.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Consumer of run progress notifications.
///
/// Implementations must be safe to call from multiple worker tasks at once.
pub trait ProgressReporter: Send + Sync {
    /// Called once when a run begins.
    fn start(&self, message: &str);

    /// Called per unit, before and after its processing.
    fn report(&self, message: &str);

    /// Called once when a run completes.
    fn end(&self, message: &str);
}

/// Reporter that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&self, _message: &str) {}
    fn report(&self, _message: &str) {}
    fn end(&self, _message: &str) {}
}

/// Reporter writing one line per notification to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for ConsoleReporter {
    fn start(&self, message: &str) {
        println!("Start: {}", message);
    }

    fn report(&self, message: &str) {
        println!("Report: {}", message);
    }

    fn end(&self, message: &str) {
        println!("End: {}", message);
    }
}

/// Reporter driving an indicatif spinner with per-unit messages.
///
/// The spinner is created on `start`, updated on each `report`, and cleared
/// on `end` with the final message printed above it.
pub struct SpinnerReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerReporter {
    /// Create a new spinner reporter.
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner() -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} units {msg}")
                .expect("static spinner template"),
        );
        bar
    }
}

impl Default for SpinnerReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for SpinnerReporter {
    fn start(&self, message: &str) {
        let bar = Self::spinner();
        bar.set_message(message.to_string());
        *self.bar.lock().expect("spinner lock") = Some(bar);
    }

    fn report(&self, message: &str) {
        if let Some(bar) = self.bar.lock().expect("spinner lock").as_ref() {
            bar.inc(1);
            bar.set_message(message.to_string());
        }
    }

    fn end(&self, message: &str) {
        if let Some(bar) = self.bar.lock().expect("spinner lock").take() {
            bar.finish_and_clear();
        }
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_reporter_accepts_all_notifications() {
        let reporter = NoopReporter;
        reporter.start("start");
        reporter.report("unit");
        reporter.end("end");
    }

    #[test]
    fn test_spinner_report_before_start_is_ignored() {
        let reporter = SpinnerReporter::new();
        // No spinner exists yet; report must not panic.
        reporter.report("early");
        reporter.end("done");
    }

    #[test]
    fn test_reporter_is_object_safe() {
        fn _accepts(_r: &dyn ProgressReporter) {}
        _accepts(&NoopReporter);
        _accepts(&ConsoleReporter::new());
    }
}
