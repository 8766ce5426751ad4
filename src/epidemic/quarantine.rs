//! Population-wide quarantine, engaged when the share of ill and dead
//! citizens exceeds a threshold.
use crate::epidemic::stats::SimulationStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineChange {
    Engaged,
    Lifted,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuarantineController {
    active: bool,
}

impl QuarantineController {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Recomputes the flag from today's counters. Returns the change, if the
    /// flag flipped.
    pub fn update(&mut self, stats: &SimulationStats, threshold: u32) -> Option<QuarantineChange> {
        let active = stats.ill_or_dead_percent() > threshold as usize;
        if active == self.active {
            return None;
        }
        self.active = active;
        Some(if active {
            QuarantineChange::Engaged
        } else {
            QuarantineChange::Lifted
        })
    }
}
