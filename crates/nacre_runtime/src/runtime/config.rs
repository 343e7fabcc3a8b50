//! Runtime configuration and lifecycle result types.

/// Runtime configuration options.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Run a collection automatically when allocation thresholds are crossed.
    pub auto_gc: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { auto_gc: true }
    }
}

/// What teardown actually did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub finalizers_run: usize,
    pub streams_closed: usize,
}
