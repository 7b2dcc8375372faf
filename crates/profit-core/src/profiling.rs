//! Phase timings of a simulation run.
//!
//! Only compiled with the `profiling` feature.

use std::time::Duration;

/// Accumulated time spent in each phase of the last completed run.
#[derive(Debug, Clone, Default)]
pub struct RunProfile {
    /// Reset and re-derivation before the first turn.
    pub derive: Duration,
    pub commit: Duration,
    pub transfer: Duration,
    pub production: Duration,
    pub total: Duration,
    pub turns: u32,
}

impl RunProfile {
    /// Add one turn's phase timings.
    pub fn record_turn(&mut self, commit: Duration, transfer: Duration, production: Duration) {
        self.commit += commit;
        self.transfer += transfer;
        self.production += production;
        self.turns += 1;
    }

    /// Returns the name and duration of the slowest phase.
    pub fn bottleneck_phase(&self) -> (&'static str, Duration) {
        [
            ("derive", self.derive),
            ("commit", self.commit),
            ("transfer", self.transfer),
            ("production", self.production),
        ]
        .into_iter()
        .fold(("derive", Duration::ZERO), |slowest, phase| {
            if phase.1 > slowest.1 { phase } else { slowest }
        })
    }

    /// Mean wall time per turn, excluding re-derivation.
    pub fn per_turn(&self) -> Duration {
        match self.turns {
            0 => Duration::ZERO,
            n => (self.commit + self.transfer + self.production) / n,
        }
    }
}
