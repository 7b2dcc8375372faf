//! Turn simulation.
//!
//! Every turn runs two phases over the structures in insertion order:
//!
//! 1. **Start** (commit): mines, conveyors, combiners and factories merge
//!    their incoming buffer into storage.
//! 2. **End** (transfer and produce): deposits hand up to three units to
//!    each sink while stock lasts, relays flush their whole storage into
//!    their first sink's incoming buffer, then every factory fires its
//!    recipes until none is covered.
//!
//! Units moved in the end phase become usable at the next start phase.

use crate::document::SimulationOutput;
use crate::entity::{Entity, EntityKind, Structure};
use crate::error::SimulationError;
use crate::event::{EventLog, SimEvent};
use crate::id::{EntityId, PRODUCT_TYPES};
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::time::Instant;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Where a world is in its run lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimStatus {
    #[default]
    Unsimulated,
    Running,
    Completed,
}

/// Counters of the current or last run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    /// Turn about to run. `turns + 1` once a run completes.
    pub turn: u32,
    pub score: i64,
    /// Last turn in which anything was produced; 1 when nothing was.
    pub score_at_turn: u32,
    /// Products made, per product subtype.
    pub yields: [i64; PRODUCT_TYPES],
    /// Wall-clock length of the last run.
    pub duration_ms: f64,
    pub status: SimStatus,
}

impl SimState {
    pub fn new() -> Self {
        Self {
            turn: 1,
            score: 0,
            score_at_turn: 1,
            yields: [0; PRODUCT_TYPES],
            duration_ms: 0.0,
            status: SimStatus::Unsimulated,
        }
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Running
// ---------------------------------------------------------------------------

impl World {
    /// Re-derive the world and clear every run counter, buffer and log line.
    pub fn reset_simulation(&mut self) {
        self.update();
        self.log.clear();
        self.sim = SimState::new();
        for entity in self.entities.values_mut() {
            entity.clear_buffers();
        }
    }

    /// Reset, then run every turn.
    ///
    /// Refuses to run while the world has any error. Summary lines are
    /// appended to the log after the last turn.
    pub fn simulate(&mut self) -> Result<&SimState, SimulationError> {
        let started = Instant::now();
        self.reset_simulation();
        if !self.is_valid() {
            let count = self.error_count();
            tracing::warn!(errors = count, "simulation refused");
            return Err(SimulationError::InvalidWorld { count });
        }

        #[cfg(feature = "profiling")]
        let mut profile = crate::profiling::RunProfile {
            derive: started.elapsed(),
            ..Default::default()
        };

        self.sim.status = SimStatus::Running;
        let turns = self.turns;
        while i64::from(self.sim.turn) <= turns {
            #[cfg(feature = "profiling")]
            let phase_start = Instant::now();
            self.start_of_turn();
            #[cfg(feature = "profiling")]
            let commit_dur = phase_start.elapsed();

            #[cfg(feature = "profiling")]
            let phase_start = Instant::now();
            self.transfer();
            #[cfg(feature = "profiling")]
            let transfer_dur = phase_start.elapsed();

            #[cfg(feature = "profiling")]
            let phase_start = Instant::now();
            self.produce();
            #[cfg(feature = "profiling")]
            let production_dur = phase_start.elapsed();

            #[cfg(feature = "profiling")]
            profile.record_turn(commit_dur, transfer_dur, production_dur);

            self.sim.turn += 1;
        }

        let elapsed = started.elapsed();
        self.sim.duration_ms = elapsed.as_secs_f64() * 1000.0;
        self.sim.status = SimStatus::Completed;

        #[cfg(feature = "profiling")]
        self.finish_profile(profile, elapsed);

        self.log.push(SimEvent::YieldSummary {
            yields: self.sim.yields,
        });
        self.log.push(SimEvent::ScoreSummary {
            score: self.sim.score,
            score_at_turn: self.sim.score_at_turn,
        });
        self.log.push(SimEvent::DurationSummary {
            duration_ms: self.sim.duration_ms,
        });

        tracing::debug!(
            turns,
            score = self.sim.score,
            score_at_turn = self.sim.score_at_turn,
            duration_ms = self.sim.duration_ms,
            "simulation completed"
        );
        Ok(&self.sim)
    }

    #[cfg(feature = "profiling")]
    fn finish_profile(&mut self, mut profile: crate::profiling::RunProfile, total: std::time::Duration) {
        profile.total = total;
        self.last_profile = Some(profile);
    }

    /// Commit phase.
    fn start_of_turn(&mut self) {
        let turn = self.sim.turn;
        for &id in &self.order {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            if !entity.kind().holds_resources() || entity.incoming.is_empty() {
                continue;
            }
            let accepted = entity.incoming.take();
            entity.storage.merge(&accepted);
            let holds = entity.storage;
            let position = entity.position();
            self.log.push_with(move || SimEvent::Accepted {
                turn,
                position,
                accepted,
                holds,
            });
        }
    }

    /// Transfer half of the end phase: extraction and relays.
    fn transfer(&mut self) {
        let turn = self.sim.turn;
        for &id in &self.order {
            let Some(kind) = self.entities.get(id).map(Entity::kind) else {
                continue;
            };
            if kind == EntityKind::Deposit {
                for edge in self.graph.sinks(id) {
                    let Some(deposit) = self.entities.get_mut(id) else {
                        break;
                    };
                    let position = deposit.position();
                    let Some((resource, quantity, available)) = deposit.extract() else {
                        break;
                    };
                    if let Some(sink) = self.entities.get_mut(edge.to) {
                        sink.incoming.add(resource, quantity);
                    }
                    self.log.push_with(move || SimEvent::Extracted {
                        turn,
                        position,
                        resource,
                        quantity,
                        available,
                    });
                }
            } else if kind.is_relay() {
                let Some(sink) = self.graph.first_sink(id) else {
                    continue;
                };
                let moved = match self.entities.get_mut(id) {
                    Some(relay) => relay.storage.take(),
                    None => continue,
                };
                if let Some(target) = self.entities.get_mut(sink) {
                    target.incoming.merge(&moved);
                }
            }
        }
    }

    /// Production half of the end phase.
    fn produce(&mut self) {
        let turn = self.sim.turn;
        for &id in &self.order {
            let Some(factory) = self.entities.get_mut(id) else {
                continue;
            };
            let Structure::Factory { product } = *factory.structure() else {
                continue;
            };
            let position = factory.position();
            loop {
                let mut produced = false;
                for recipe in self.recipes.iter().filter(|r| r.product == product) {
                    if !factory.storage.covers(&recipe.cost) {
                        continue;
                    }
                    factory.storage.deduct(&recipe.cost);
                    self.sim.yields[product.index()] += 1;
                    self.sim.score += recipe.points;
                    self.sim.score_at_turn = turn;
                    produced = true;
                    self.log.push_with(move || SimEvent::Produced {
                        turn,
                        position,
                        product,
                        points: recipe.points,
                    });
                }
                if !produced {
                    break;
                }
            }
        }
    }

    // -- Results --

    pub fn sim_state(&self) -> &SimState {
        &self.sim
    }

    pub fn turn(&self) -> u32 {
        self.sim.turn
    }

    pub fn score(&self) -> i64 {
        self.sim.score
    }

    pub fn score_at_turn(&self) -> u32 {
        self.sim.score_at_turn
    }

    pub fn yields(&self) -> &[i64; PRODUCT_TYPES] {
        &self.sim.yields
    }

    pub fn duration_ms(&self) -> f64 {
        self.sim.duration_ms
    }

    pub fn status(&self) -> SimStatus {
        self.sim.status
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Rendered log lines of the last run.
    pub fn log_lines(&self) -> Vec<String> {
        self.log.lines()
    }

    /// The output document of the last run.
    pub fn output(&self) -> SimulationOutput {
        SimulationOutput {
            yields: self.sim.yields,
            score: self.sim.score,
            score_at_turn: self.sim.score_at_turn,
            duration: self.sim.duration_ms,
            log: self.log.lines(),
        }
    }

    /// Phase timings of the last completed run.
    #[cfg(feature = "profiling")]
    pub fn last_profile(&self) -> Option<&crate::profiling::RunProfile> {
        self.last_profile.as_ref()
    }

    /// Storage of one structure, for inspection between runs.
    pub fn storage_of(&self, id: EntityId) -> Option<&crate::resource::ResourceVector> {
        self.entities.get(id).map(Entity::storage)
    }
}
