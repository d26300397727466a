//! Last-interaction tracking.
//!
//! Every pointer, key or scroll event overwrites a single shared timestamp.
//! The session guard reads it on each check to derive the idle window.

use crate::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Interaction kinds that count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerMove,
    PointerDown,
    KeyDown,
    Scroll,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityKind::PointerMove => "pointer_move",
            ActivityKind::PointerDown => "pointer_down",
            ActivityKind::KeyDown => "key_down",
            ActivityKind::Scroll => "scroll",
        };
        f.write_str(name)
    }
}

/// Shared handle to the last-activity timestamp. Clones observe and update
/// the same value.
#[derive(Clone)]
pub struct ActivityTracker {
    clock: Arc<dyn Clock>,
    last_activity: Arc<Mutex<DateTime<Utc>>>,
}

impl ActivityTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            clock,
            last_activity: Arc::new(Mutex::new(now)),
        }
    }

    pub fn record(&self, kind: ActivityKind) {
        trace!(%kind, "activity");
        self.record_activity();
    }

    pub fn record_activity(&self) {
        let now = self.clock.now();
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl fmt::Debug for ActivityTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityTracker")
            .field("last_activity", &self.last_activity())
            .finish()
    }
}
