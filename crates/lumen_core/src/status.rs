//! Render status and the shared handle used to observe and cancel a render.
//!
//! A render moves through
//! `Pending -> Starting -> Running -> (Stopping -> Stopped) | Completed | Error`.
//! The scheduler checks the handle between rounds only, so a stop request
//! takes effect within one round.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Lifecycle state of a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RenderStatus {
    Pending = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
    Stopped = 4,
    Completed = 5,
    Error = 6,
}

impl RenderStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RenderStatus::Pending,
            1 => RenderStatus::Starting,
            2 => RenderStatus::Running,
            3 => RenderStatus::Stopping,
            4 => RenderStatus::Stopped,
            5 => RenderStatus::Completed,
            _ => RenderStatus::Error,
        }
    }

    /// True once the render can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RenderStatus::Stopped | RenderStatus::Completed | RenderStatus::Error
        )
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: RenderStatus) -> bool {
        use RenderStatus::*;
        match (self, next) {
            (Pending, Starting) => true,
            (Starting, Running) => true,
            (Running, Stopping) | (Running, Completed) => true,
            (Stopping, Stopped) => true,
            // Any live state may fail
            (current, Error) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStatus::Pending => "Pending",
            RenderStatus::Starting => "Starting",
            RenderStatus::Running => "Running",
            RenderStatus::Stopping => "Stopping",
            RenderStatus::Stopped => "Stopped",
            RenderStatus::Completed => "Completed",
            RenderStatus::Error => "Error",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct Shared {
    status: AtomicU8,
    stop_requested: AtomicBool,
    rounds_completed: AtomicU32,
    total_rounds: AtomicU32,
    error: Mutex<Option<String>>,
}

/// Cheaply cloneable handle shared between the scheduler and whoever
/// started the render.
#[derive(Debug, Clone)]
pub struct RenderHandle {
    shared: Arc<Shared>,
}

impl RenderHandle {
    /// Create a handle for a render that has not started yet.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                status: AtomicU8::new(RenderStatus::Pending as u8),
                stop_requested: AtomicBool::new(false),
                rounds_completed: AtomicU32::new(0),
                total_rounds: AtomicU32::new(0),
                error: Mutex::new(None),
            }),
        }
    }

    /// Current status.
    pub fn status(&self) -> RenderStatus {
        RenderStatus::from_u8(self.shared.status.load(Ordering::Acquire))
    }

    /// Move to `next` if the transition is legal. Returns whether it happened.
    pub fn transition(&self, next: RenderStatus) -> bool {
        let mut current = self.shared.status.load(Ordering::Acquire);
        loop {
            if !RenderStatus::from_u8(current).can_transition_to(next) {
                log::warn!(
                    "Ignoring render status change {} -> {}",
                    RenderStatus::from_u8(current),
                    next
                );
                return false;
            }
            match self.shared.status.compare_exchange(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    log::debug!("Render status {} -> {}", RenderStatus::from_u8(current), next);
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Ask the scheduler to stop after the round in progress.
    pub fn request_stop(&self) {
        self.shared.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.shared.stop_requested.load(Ordering::Acquire)
    }

    /// Record the failure message and move to `Error`.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        log::error!("Render failed: {}", message);
        if let Ok(mut error) = self.shared.error.lock() {
            *error = Some(message);
        }
        self.transition(RenderStatus::Error);
    }

    /// Message recorded by [`RenderHandle::fail`], if any.
    pub fn error(&self) -> Option<String> {
        self.shared.error.lock().ok().and_then(|e| e.clone())
    }

    /// Set the number of rounds the render will run.
    pub fn set_total_rounds(&self, total: u32) {
        self.shared.total_rounds.store(total, Ordering::Release);
    }

    /// Record that another round has been accumulated.
    pub fn round_completed(&self) -> u32 {
        self.shared.rounds_completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Rounds accumulated so far.
    pub fn rounds_completed(&self) -> u32 {
        self.shared.rounds_completed.load(Ordering::Acquire)
    }

    /// Fraction of rounds done, in [0, 1].
    pub fn progress(&self) -> f64 {
        let total = self.shared.total_rounds.load(Ordering::Acquire);
        if total == 0 {
            return 0.0;
        }
        (self.rounds_completed() as f64 / total as f64).min(1.0)
    }
}

impl Default for RenderHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let handle = RenderHandle::new();
        assert_eq!(handle.status(), RenderStatus::Pending);

        assert!(handle.transition(RenderStatus::Starting));
        assert!(handle.transition(RenderStatus::Running));
        assert!(handle.transition(RenderStatus::Completed));
        assert!(handle.status().is_terminal());
    }

    #[test]
    fn test_illegal_transitions_are_ignored() {
        let handle = RenderHandle::new();
        assert!(!handle.transition(RenderStatus::Running));
        assert_eq!(handle.status(), RenderStatus::Pending);

        handle.transition(RenderStatus::Starting);
        handle.transition(RenderStatus::Running);
        handle.transition(RenderStatus::Completed);
        assert!(!handle.transition(RenderStatus::Error));
        assert_eq!(handle.status(), RenderStatus::Completed);
    }

    #[test]
    fn test_stop_sequence() {
        let handle = RenderHandle::new();
        handle.transition(RenderStatus::Starting);
        handle.transition(RenderStatus::Running);

        let observer = handle.clone();
        observer.request_stop();
        assert!(handle.is_stop_requested());

        assert!(handle.transition(RenderStatus::Stopping));
        assert!(handle.transition(RenderStatus::Stopped));
        assert_eq!(observer.status(), RenderStatus::Stopped);
    }

    #[test]
    fn test_fail_records_message() {
        let handle = RenderHandle::new();
        handle.transition(RenderStatus::Starting);
        handle.fail("no primitives");

        assert_eq!(handle.status(), RenderStatus::Error);
        assert_eq!(handle.error().as_deref(), Some("no primitives"));
    }

    #[test]
    fn test_progress() {
        let handle = RenderHandle::new();
        assert_eq!(handle.progress(), 0.0);

        handle.set_total_rounds(4);
        handle.round_completed();
        assert_eq!(handle.round_completed(), 2);
        assert!((handle.progress() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&RenderStatus::Stopping).unwrap();
        assert_eq!(json, "\"Stopping\"");
    }
}
