use chrono::Duration;
use std::fmt;

/// Where the session sits relative to its idle deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardState {
    /// More than the warning threshold left.
    Active,
    /// Inside the warning threshold, deadline not yet reached.
    Warning,
    /// Deadline reached; the session has been torn down.
    Expired,
}

impl GuardState {
    /// Classify an idle window against the warning threshold.
    ///
    /// The three ranges are disjoint: `window <= 0` is expired,
    /// `0 < window <= threshold` is warning, anything larger is active.
    pub fn classify(window: Duration, warning_threshold: Duration) -> Self {
        if window <= Duration::zero() {
            GuardState::Expired
        } else if window <= warning_threshold {
            GuardState::Warning
        } else {
            GuardState::Active
        }
    }
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GuardState::Active => "active",
            GuardState::Warning => "warning",
            GuardState::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// Whole seconds left for display: clamped at zero, rounded down.
pub fn remaining_seconds(window: Duration) -> u64 {
    window.num_seconds().max(0) as u64
}
