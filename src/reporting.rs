//! Callbacks through which a presentation layer observes batch passes.
//!
//! Both callbacks run synchronously on the walk's thread, once per file, so
//! implementations should return quickly.

/// Receives one human-readable line per processed file or duplicate finding.
pub trait Logger {
    fn log(&self, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str),
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Receives the completion percentage (0.0 to 100.0) after each file.
pub trait ProgressReporter {
    fn report(&self, percent: f64);
}

impl<F> ProgressReporter for F
where
    F: Fn(f64),
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

/// Optional callbacks handed to a batch pass.
#[derive(Clone, Copy, Default)]
pub struct Hooks<'a> {
    pub logger: Option<&'a dyn Logger>,
    pub progress: Option<&'a dyn ProgressReporter>,
}

impl<'a> Hooks<'a> {
    /// No logging, no progress.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: &'a dyn Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    pub(crate) fn log(&self, message: &str) {
        if let Some(logger) = self.logger {
            logger.log(message);
        }
    }

    pub(crate) fn progress(&self, done: usize, total: usize) {
        if let Some(progress) = self.progress
            && total > 0
        {
            progress.report(done as f64 / total as f64 * 100.0);
        }
    }
}
