//! Countdown used by short-lived entities such as scent markers.

use serde::{Deserialize, Serialize};

/// One-shot countdown measured in world ticks.
///
/// The timer fires once `now - created_at` reaches the current lifespan.
/// The current lifespan can be shortened or extended but never exceeds
/// `max_lifespan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayTimer {
    created_at: u64,
    lifespan: u64,
    max_lifespan: u64,
    fired: bool,
}

impl DecayTimer {
    #[must_use]
    pub fn new(now: u64, lifespan: u64, max_lifespan: u64) -> Self {
        Self {
            created_at: now,
            lifespan: lifespan.min(max_lifespan),
            max_lifespan,
            fired: false,
        }
    }

    /// A timer whose lifespan starts at its maximum.
    #[must_use]
    pub fn full(now: u64, max_lifespan: u64) -> Self {
        Self::new(now, max_lifespan, max_lifespan)
    }

    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    #[must_use]
    pub fn lifespan(&self) -> u64 {
        self.lifespan
    }

    #[must_use]
    pub fn max_lifespan(&self) -> u64 {
        self.max_lifespan
    }

    pub fn set_lifespan(&mut self, lifespan: u64) {
        self.lifespan = lifespan.min(self.max_lifespan);
    }

    #[must_use]
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Fraction of life left in `[0, 1]`.
    #[must_use]
    pub fn remaining_fraction(&self, now: u64) -> f64 {
        if self.lifespan == 0 {
            return 0.0;
        }
        1.0 - (self.elapsed(now) as f64 / self.lifespan as f64).min(1.0)
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Returns `true` exactly once: on the first poll at or past the limit.
    pub fn poll(&mut self, now: u64) -> bool {
        if self.fired || self.elapsed(now) < self.lifespan {
            return false;
        }
        self.fired = true;
        true
    }

    /// Restarts the countdown at `now` with the full lifespan.
    pub fn refresh(&mut self, now: u64) {
        self.created_at = now;
        self.lifespan = self.max_lifespan;
        self.fired = false;
    }
}
