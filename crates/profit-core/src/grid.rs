//! Bounded world grid, cell occupancy and the placement validator.
//!
//! The grid is rebuilt from scratch on every re-derivation. Each cell keeps
//! the role written by its most recent occupant plus the full list of
//! occupants, so conveyor crossings can be told apart from real overlaps.

use crate::entity::EntityKind;
use crate::error::WorldError;
use crate::footprint::CellRole;
use crate::id::EntityId;
use serde::{Deserialize, Serialize};

/// Largest width or height of the grid and of any deposit or obstacle.
pub const MAX_DIMENSION: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A position on the 2D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position one step in `direction`.
    pub fn step(&self, direction: Direction) -> GridPosition {
        let (dx, dy) = direction.offset();
        GridPosition::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    West,
    North,
    East,
    South,
}

impl Direction {
    /// All four cardinal directions, in port scan order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::West,
            Direction::North,
            Direction::East,
            Direction::South,
        ]
    }

    /// Offset for this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
        }
    }
}

/// One structure's claim on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub role: CellRole,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Cell {
    /// Role written by the most recent occupant.
    role: CellRole,
    occupants: Vec<Occupant>,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Dense occupancy map of the world, indexed by `y * width + x`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: GridPosition) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Role of the cell; `Empty` when unoccupied or outside the grid.
    pub fn role_at(&self, pos: GridPosition) -> CellRole {
        self.index(pos)
            .map(|i| self.cells[i].role)
            .unwrap_or_default()
    }

    /// Every structure claiming the cell, in placement order.
    pub fn occupants(&self, pos: GridPosition) -> &[Occupant] {
        match self.index(pos) {
            Some(i) => &self.cells[i].occupants,
            None => &[],
        }
    }

    /// In-bounds 4-neighbours of `pos`: west, north, east, south.
    pub fn neighbors(&self, pos: GridPosition) -> impl Iterator<Item = GridPosition> + '_ {
        Direction::all()
            .into_iter()
            .map(move |d| pos.step(d))
            .filter(|p| self.contains(*p))
    }

    // -- Placement --

    /// Lay one entity's cells onto the grid.
    ///
    /// Out-of-bounds cells are reported and skipped. Colliding cells are
    /// reported and still laid, so later entities see them. Returns the
    /// cells actually laid, row-major, along with any errors.
    pub fn place(
        &mut self,
        entity: EntityId,
        kind: EntityKind,
        cells: impl IntoIterator<Item = (GridPosition, CellRole)>,
    ) -> (Vec<(GridPosition, CellRole)>, Vec<WorldError>) {
        let mut laid = Vec::new();
        let mut errors = Vec::new();
        for (pos, role) in cells {
            let Some(i) = self.index(pos) else {
                errors.push(WorldError::OutOfBounds { at: pos });
                continue;
            };
            let cell = &mut self.cells[i];
            if cell.role.is_occupied() && !may_cross(kind, role, &cell.occupants) {
                errors.push(WorldError::Conflict { at: pos });
            }
            cell.role = role;
            cell.occupants.push(Occupant { entity, kind, role });
            laid.push((pos, role));
        }
        (laid, errors)
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.role.is_occupied()).count()
    }
}

/// Conveyors may cross each other at body cells, and only there.
fn may_cross(kind: EntityKind, role: CellRole, present: &[Occupant]) -> bool {
    kind == EntityKind::Conveyor
        && role == CellRole::Body
        && present
            .iter()
            .all(|o| o.kind == EntityKind::Conveyor && o.role == CellRole::Body)
}
