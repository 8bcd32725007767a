//! Deferred hiding of stats panels shown after an attack.

use std::time::Duration;

use fog_tactics_core::UnitId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingHide {
    unit: UnitId,
    remaining: Duration,
}

/// Per-unit countdowns after which an auto-shown stats panel hides again.
///
/// At most one countdown exists per unit; scheduling again supersedes the
/// earlier one.
#[derive(Clone, Debug, Default)]
pub struct StatsDisplayTimers {
    pending: Vec<PendingHide>,
}

impl StatsDisplayTimers {
    /// Starts (or restarts) the countdown for `unit`.
    pub fn schedule(&mut self, unit: UnitId, delay: Duration) {
        if let Some(existing) = self.pending.iter_mut().find(|entry| entry.unit == unit) {
            existing.remaining = delay;
        } else {
            self.pending.push(PendingHide {
                unit,
                remaining: delay,
            });
        }
    }

    /// Cancels the countdown for `unit`. Returns whether one was pending.
    pub fn cancel(&mut self, unit: UnitId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.unit != unit);
        self.pending.len() != before
    }

    /// Reports whether a countdown is running for `unit`.
    #[must_use]
    pub fn is_pending(&self, unit: UnitId) -> bool {
        self.pending.iter().any(|entry| entry.unit == unit)
    }

    /// Advances every countdown by `dt`.
    ///
    /// Returns the units whose countdown elapsed and that `is_alive` still
    /// accepts; elapsed countdowns of dead units are dropped silently.
    pub fn advance<F>(&mut self, dt: Duration, mut is_alive: F) -> Vec<UnitId>
    where
        F: FnMut(UnitId) -> bool,
    {
        let mut fired = Vec::new();
        self.pending.retain_mut(|entry| {
            entry.remaining = entry.remaining.saturating_sub(dt);
            if !entry.remaining.is_zero() {
                return true;
            }
            if is_alive(entry.unit) {
                fired.push(entry.unit);
            }
            false
        });
        fired
    }

    /// Number of running countdowns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no countdown is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
