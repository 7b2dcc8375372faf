//! Flow graph between structures and the port-adjacency resolver that
//! builds it.

use crate::entity::{Entity, EntityKind};
use crate::error::WorldError;
use crate::footprint::CellRole;
use crate::grid::{Grid, GridPosition};
use crate::id::{EdgeId, EntityId};
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// A directed link from an outbound port of one structure to an adjacent
/// inbound port of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Sending structure.
    pub from: EntityId,
    /// Receiving structure.
    pub to: EntityId,
    /// The sender's outbound cell.
    pub outbound: GridPosition,
    /// The receiver's inbound cell.
    pub inbound: GridPosition,
}

/// Adjacency lists for a single structure, in discovery order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Adjacency {
    /// Edges whose receiver is this structure.
    sources: Vec<EdgeId>,
    /// Edges whose sender is this structure.
    sinks: Vec<EdgeId>,
}

/// Every source-to-sink link of the world.
///
/// Adjacency lives in a `SecondaryMap` keyed by `EntityId`; structures
/// without links have no entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    edges: SlotMap<EdgeId, Edge>,
    adjacency: SecondaryMap<EntityId, Adjacency>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a link and return its id.
    pub fn connect(
        &mut self,
        from: EntityId,
        to: EntityId,
        outbound: GridPosition,
        inbound: GridPosition,
    ) -> EdgeId {
        let edge = self.edges.insert(Edge {
            from,
            to,
            outbound,
            inbound,
        });
        self.adjacency_mut(from).sinks.push(edge);
        self.adjacency_mut(to).sources.push(edge);
        edge
    }

    fn adjacency_mut(&mut self, entity: EntityId) -> &mut Adjacency {
        if !self.adjacency.contains_key(entity) {
            self.adjacency.insert(entity, Adjacency::default());
        }
        // Inserted above when missing.
        &mut self.adjacency[entity]
    }

    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Links feeding `entity`, in discovery order.
    pub fn sources(&self, entity: EntityId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get(entity)
            .into_iter()
            .flat_map(|a| a.sources.iter())
            .filter_map(|e| self.edges.get(*e))
    }

    /// Links `entity` feeds, in discovery order.
    pub fn sinks(&self, entity: EntityId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get(entity)
            .into_iter()
            .flat_map(|a| a.sinks.iter())
            .filter_map(|e| self.edges.get(*e))
    }

    /// The receiver of `entity`'s earliest link.
    pub fn first_sink(&self, entity: EntityId) -> Option<EntityId> {
        self.sinks(entity).next().map(|e| e.to)
    }

    /// The link leaving `entity` through the given outbound cell.
    pub fn sink_from(&self, entity: EntityId, outbound: GridPosition) -> Option<&Edge> {
        self.sinks(entity).find(|e| e.outbound == outbound)
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.adjacency.clear();
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Link every inbound port to the adjacent outbound ports of other
/// structures.
///
/// Receivers are visited in `order`, their inbound cells row-major, and the
/// neighbours of each cell west, north, east, south. Compatibility and
/// fan-out violations are reported and the offending link is skipped.
pub fn resolve(
    entities: &SlotMap<EntityId, Entity>,
    order: &[EntityId],
    grid: &Grid,
) -> (FlowGraph, Vec<WorldError>) {
    let mut graph = FlowGraph::new();
    let mut errors = Vec::new();

    for &receiver_id in order {
        let Some(receiver) = entities.get(receiver_id) else {
            continue;
        };
        let receiver_kind = receiver.kind();
        let inbound_cells = receiver
            .placed_cells()
            .iter()
            .filter(|(_, role)| *role == CellRole::Inbound)
            .map(|(pos, _)| *pos);

        for inbound in inbound_cells {
            for outbound in grid.neighbors(inbound) {
                if grid.role_at(outbound) != CellRole::Outbound {
                    continue;
                }
                for occupant in grid.occupants(outbound) {
                    if occupant.entity == receiver_id {
                        continue;
                    }
                    match occupant.kind {
                        EntityKind::Deposit if receiver_kind != EntityKind::Mine => {
                            errors.push(WorldError::DepositFeedsNonMine { at: inbound });
                            continue;
                        }
                        EntityKind::Mine
                            if !matches!(
                                receiver_kind,
                                EntityKind::Conveyor | EntityKind::Combiner | EntityKind::Factory
                            ) =>
                        {
                            errors.push(WorldError::MineFeedsInvalid { at: outbound });
                            continue;
                        }
                        _ => {}
                    }
                    if let Some(existing) = graph.sink_from(occupant.entity, outbound) {
                        errors.push(WorldError::EgressAlreadyConnected {
                            at: existing.outbound,
                        });
                        continue;
                    }
                    graph.connect(occupant.entity, receiver_id, outbound, inbound);
                }
            }
        }
    }

    (graph, errors)
}
