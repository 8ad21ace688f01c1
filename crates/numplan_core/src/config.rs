//! Planner configuration.

use crate::digits::NumberLayout;

/// What to do when the cardinality self-check disagrees with a row's
/// declared capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Record the mismatch in the report and keep going.
    #[default]
    Warn,
    /// Abort the build with [`crate::CoreError::CompactionMismatch`].
    Fail,
}

/// Configuration for a routing build.
///
/// Passed explicitly to [`crate::RoutingPlanner`]; nothing in this crate
/// reads process-wide settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Digit widths shared by every row.
    pub layout: NumberLayout,

    /// Handling of cardinality mismatches.
    pub mismatch_policy: MismatchPolicy,

    /// Number of worker threads used to compact rows (1 = sequential).
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: NumberLayout::default(),
            mismatch_policy: MismatchPolicy::Warn,
            workers: 1,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number layout.
    #[must_use]
    pub const fn layout(mut self, layout: NumberLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the mismatch policy.
    #[must_use]
    pub const fn mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    /// Shorthand for [`MismatchPolicy::Fail`] when `strict` is true.
    #[must_use]
    pub const fn strict(self, strict: bool) -> Self {
        if strict {
            self.mismatch_policy(MismatchPolicy::Fail)
        } else {
            self.mismatch_policy(MismatchPolicy::Warn)
        }
    }

    /// Sets the worker count. Zero is treated as one.
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { 1 } else { workers };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.mismatch_policy, MismatchPolicy::Warn);
        assert_eq!(config.workers, 1);
        assert_eq!(config.layout.number_width(), 10);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().strict(true).workers(0);
        assert_eq!(config.mismatch_policy, MismatchPolicy::Fail);
        assert_eq!(config.workers, 1);

        let config = Config::new().workers(4).strict(false);
        assert_eq!(config.workers, 4);
        assert_eq!(config.mismatch_policy, MismatchPolicy::Warn);
    }
}
