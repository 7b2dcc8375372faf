//! Typed simulation events and the run log.
//!
//! Events are recorded as values while a run is in progress and rendered
//! into log lines on demand. Recording can be switched off; the run
//! itself is unaffected.

use crate::grid::GridPosition;
use crate::id::{PRODUCT_TYPES, ProductType, ResourceType};
use crate::resource::ResourceVector;
use std::fmt;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Something that happened during a run. Per-turn events carry the turn
/// and the anchor position of the structure involved.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A structure merged its incoming buffer into storage.
    Accepted {
        turn: u32,
        position: GridPosition,
        accepted: ResourceVector,
        holds: ResourceVector,
    },
    /// A deposit handed units to one of its sinks.
    Extracted {
        turn: u32,
        position: GridPosition,
        resource: ResourceType,
        quantity: i64,
        available: i64,
    },
    /// A factory completed one product.
    Produced {
        turn: u32,
        position: GridPosition,
        product: ProductType,
        points: i64,
    },

    // -- Summary, appended once the last turn is done --
    YieldSummary {
        yields: [i64; PRODUCT_TYPES],
    },
    ScoreSummary {
        score: i64,
        score_at_turn: u32,
    },
    DurationSummary {
        duration_ms: f64,
    },
}

/// Discriminant tag for event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Accepted,
    Extracted,
    Produced,
    Summary,
}

impl SimEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SimEvent::Accepted { .. } => EventKind::Accepted,
            SimEvent::Extracted { .. } => EventKind::Extracted,
            SimEvent::Produced { .. } => EventKind::Produced,
            SimEvent::YieldSummary { .. }
            | SimEvent::ScoreSummary { .. }
            | SimEvent::DurationSummary { .. } => EventKind::Summary,
        }
    }

    /// Turn the event happened in; `None` for summary lines.
    pub fn turn(&self) -> Option<u32> {
        match self {
            SimEvent::Accepted { turn, .. }
            | SimEvent::Extracted { turn, .. }
            | SimEvent::Produced { turn, .. } => Some(*turn),
            _ => None,
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::Accepted {
                turn,
                position,
                accepted,
                holds,
            } => write!(f, "{turn} (start): {position} accepts {accepted}, holds {holds}"),
            SimEvent::Extracted {
                turn,
                position,
                resource,
                quantity,
                available,
            } => write!(
                f,
                "{turn} (end): {position} takes [{quantity}x{r}], [{available}x{r}] available",
                r = resource.0
            ),
            SimEvent::Produced {
                turn,
                position,
                product,
                points,
            } => write!(
                f,
                "{turn} (end): {position} produces {} ({points} points)",
                product.0
            ),
            SimEvent::YieldSummary { yields } => {
                f.write_str("Yield: [")?;
                let mut first = true;
                for (subtype, &q) in yields.iter().enumerate() {
                    if q > 0 {
                        if !first {
                            f.write_str(", ")?;
                        }
                        write!(f, "{subtype}:{q}")?;
                        first = false;
                    }
                }
                f.write_str("]")
            }
            SimEvent::ScoreSummary {
                score,
                score_at_turn,
            } => write!(f, "Score: {score} at turn {score_at_turn}"),
            SimEvent::DurationSummary { duration_ms } => write!(f, "Duration: {duration_ms} ms"),
        }
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Ordered record of a run's events.
#[derive(Debug, Clone)]
pub struct EventLog {
    enabled: bool,
    events: Vec<SimEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// An empty, enabled log.
    pub fn new() -> Self {
        Self {
            enabled: true,
            events: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Record an event. No-op when disabled.
    pub fn push(&mut self, event: SimEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    /// Record the event built by `make`, skipping construction when disabled.
    pub fn push_with(&mut self, make: impl FnOnce() -> SimEvent) {
        if self.enabled {
            self.events.push(make());
        }
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Count of recorded events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Render every event as a log line.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
