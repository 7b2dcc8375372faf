//! Placed structures and their per-kind data.

use crate::error::EntityError;
use crate::footprint::{self, CellRole, Footprint};
use crate::grid::{GridPosition, MAX_DIMENSION};
use crate::id::{ProductType, ResourceType};
use crate::resource::ResourceVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Units of stock a deposit holds per covered cell.
pub const DEPOSIT_UNITS_PER_CELL: i64 = 5;

/// Most units a deposit hands to each sink per turn.
pub const DEPOSIT_EXTRACTION_CAP: i64 = 3;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Discriminant of [`Structure`], also the `type` string of raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Deposit,
    Obstacle,
    Mine,
    Conveyor,
    Combiner,
    Factory,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Deposit,
        EntityKind::Obstacle,
        EntityKind::Mine,
        EntityKind::Conveyor,
        EntityKind::Combiner,
        EntityKind::Factory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Deposit => "deposit",
            EntityKind::Obstacle => "obstacle",
            EntityKind::Mine => "mine",
            EntityKind::Conveyor => "conveyor",
            EntityKind::Combiner => "combiner",
            EntityKind::Factory => "factory",
        }
    }

    pub fn variant_count(self) -> usize {
        footprint::variant_count(self)
    }

    /// Deposits and obstacles: the fixed terrain of a task.
    pub fn is_terrain(self) -> bool {
        matches!(self, EntityKind::Deposit | EntityKind::Obstacle)
    }

    /// Kinds that pass their whole storage on to a single sink each turn.
    pub fn is_relay(self) -> bool {
        matches!(
            self,
            EntityKind::Mine | EntityKind::Conveyor | EntityKind::Combiner
        )
    }

    /// Kinds with storage and incoming buffers.
    pub fn holds_resources(self) -> bool {
        self.is_relay() || self == EntityKind::Factory
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EntityError::UnknownKind(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// Kind-specific data of a placed entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    Deposit {
        resource: ResourceType,
        width: u32,
        height: u32,
        /// Stock left. Restored on every re-derivation.
        available: i64,
    },
    Obstacle {
        width: u32,
        height: u32,
    },
    Mine {
        variant: u8,
    },
    Conveyor {
        variant: u8,
    },
    Combiner {
        variant: u8,
    },
    Factory {
        product: ProductType,
    },
}

impl Structure {
    pub fn kind(&self) -> EntityKind {
        match self {
            Structure::Deposit { .. } => EntityKind::Deposit,
            Structure::Obstacle { .. } => EntityKind::Obstacle,
            Structure::Mine { .. } => EntityKind::Mine,
            Structure::Conveyor { .. } => EntityKind::Conveyor,
            Structure::Combiner { .. } => EntityKind::Combiner,
            Structure::Factory { .. } => EntityKind::Factory,
        }
    }

    /// The `subtype` of the raw record. Obstacles have none.
    pub fn subtype(&self) -> Option<u8> {
        match self {
            Structure::Deposit { resource, .. } => Some(resource.0),
            Structure::Obstacle { .. } => None,
            Structure::Mine { variant }
            | Structure::Conveyor { variant }
            | Structure::Combiner { variant } => Some(*variant),
            Structure::Factory { product } => Some(product.0),
        }
    }

    /// Caller-chosen size of deposits and obstacles.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Structure::Deposit { width, height, .. } | Structure::Obstacle { width, height } => {
                Some((*width, *height))
            }
            _ => None,
        }
    }

    fn footprint(&self) -> Result<Footprint, EntityError> {
        match self {
            Structure::Deposit { width, height, .. } => Ok(Footprint::hollow(*width, *height)),
            Structure::Obstacle { width, height } => Ok(Footprint::solid(*width, *height)),
            _ => footprint::lookup(self.kind(), i64::from(self.subtype().unwrap_or(0))),
        }
    }
}

/// Validate a caller-chosen deposit or obstacle size.
pub fn check_dimensions(width: i64, height: i64) -> Result<(u32, u32), EntityError> {
    if width < 1 {
        return Err(EntityError::WidthTooSmall);
    }
    if width > i64::from(MAX_DIMENSION) {
        return Err(EntityError::WidthTooLarge { max: MAX_DIMENSION });
    }
    if height < 1 {
        return Err(EntityError::HeightTooSmall);
    }
    if height > i64::from(MAX_DIMENSION) {
        return Err(EntityError::HeightTooLarge { max: MAX_DIMENSION });
    }
    Ok((width as u32, height as u32))
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A structure placed in the world.
///
/// The footprint is resolved once at construction and regenerated only by
/// [`World::resize_entity`](crate::world::World::resize_entity). `placed`,
/// `storage` and `incoming` are derived state owned by the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    structure: Structure,
    position: GridPosition,
    footprint: Footprint,
    /// Cells laid on the grid by the last re-derivation, row-major.
    pub(crate) placed: Vec<(GridPosition, CellRole)>,
    pub(crate) storage: ResourceVector,
    pub(crate) incoming: ResourceVector,
}

impl Entity {
    /// Build an entity, resolving its footprint through the catalog.
    pub fn new(structure: Structure, position: GridPosition) -> Result<Self, EntityError> {
        let footprint = structure.footprint()?;
        Ok(Self {
            structure,
            position,
            footprint,
            placed: Vec::new(),
            storage: ResourceVector::ZERO,
            incoming: ResourceVector::ZERO,
        })
    }

    /// Build an entity of `kind` from loosely typed fields, validating the
    /// subtype range and, for deposits and obstacles, the size.
    pub fn from_parts(
        kind: EntityKind,
        subtype: i64,
        position: GridPosition,
        width: i64,
        height: i64,
    ) -> Result<Self, EntityError> {
        let structure = match kind {
            EntityKind::Deposit => {
                let (width, height) = check_dimensions(width, height)?;
                let resource = ResourceType(footprint::check_variant(kind, subtype)?);
                Structure::Deposit {
                    resource,
                    width,
                    height,
                    available: stock_for(width, height),
                }
            }
            EntityKind::Obstacle => {
                let (width, height) = check_dimensions(width, height)?;
                Structure::Obstacle { width, height }
            }
            EntityKind::Mine => Structure::Mine {
                variant: footprint::check_variant(kind, subtype)?,
            },
            EntityKind::Conveyor => Structure::Conveyor {
                variant: footprint::check_variant(kind, subtype)?,
            },
            EntityKind::Combiner => Structure::Combiner {
                variant: footprint::check_variant(kind, subtype)?,
            },
            EntityKind::Factory => Structure::Factory {
                product: ProductType(footprint::check_variant(kind, subtype)?),
            },
        };
        Self::new(structure, position)
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn kind(&self) -> EntityKind {
        self.structure.kind()
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    /// Cells this entity claimed on the grid during the last re-derivation.
    pub fn placed_cells(&self) -> &[(GridPosition, CellRole)] {
        &self.placed
    }

    /// This entity's role at a world cell, as last placed.
    pub fn role_at(&self, pos: GridPosition) -> CellRole {
        self.placed
            .iter()
            .find(|(p, _)| *p == pos)
            .map(|(_, role)| *role)
            .unwrap_or_default()
    }

    pub fn storage(&self) -> &ResourceVector {
        &self.storage
    }

    pub fn incoming(&self) -> &ResourceVector {
        &self.incoming
    }

    /// Remaining stock of a deposit.
    pub fn available(&self) -> Option<i64> {
        match self.structure {
            Structure::Deposit { available, .. } => Some(available),
            _ => None,
        }
    }

    pub(crate) fn set_position(&mut self, position: GridPosition) {
        self.position = position;
    }

    /// Change the size of a deposit or obstacle and regenerate its footprint.
    pub(crate) fn set_dimensions(&mut self, width: i64, height: i64) -> Result<(), EntityError> {
        let (w, h) = check_dimensions(width, height)?;
        match &mut self.structure {
            Structure::Deposit { width, height, .. } | Structure::Obstacle { width, height } => {
                *width = w;
                *height = h;
            }
            other => return Err(EntityError::NotResizable(other.kind())),
        }
        self.footprint = self.structure.footprint()?;
        self.restock();
        Ok(())
    }

    /// Refill a deposit to `width * height * 5` units.
    pub(crate) fn restock(&mut self) {
        if let Structure::Deposit {
            width,
            height,
            available,
            ..
        } = &mut self.structure
        {
            *available = stock_for(*width, *height);
        }
    }

    /// Take up to [`DEPOSIT_EXTRACTION_CAP`] units from a deposit's stock.
    /// Returns the resource and quantity taken, `None` when exhausted or
    /// not a deposit.
    pub(crate) fn extract(&mut self) -> Option<(ResourceType, i64, i64)> {
        match &mut self.structure {
            Structure::Deposit {
                resource,
                available,
                ..
            } if *available > 0 => {
                let quantity = DEPOSIT_EXTRACTION_CAP.min(*available);
                *available -= quantity;
                Some((*resource, quantity, *available))
            }
            _ => None,
        }
    }

    pub(crate) fn clear_buffers(&mut self) {
        self.storage.clear();
        self.incoming.clear();
    }
}

fn stock_for(width: u32, height: u32) -> i64 {
    i64::from(width) * i64::from(height) * DEPOSIT_UNITS_PER_CELL
}
