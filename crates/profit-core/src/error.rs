//! Error types for document parsing, world validation and simulation.
//!
//! Every validation failure is a [`WorldError`], classified as either
//! [`ErrorType::Input`] (the raw document is malformed) or
//! [`ErrorType::State`] (the assembled world is geometrically or logically
//! invalid). [`ErrorDocument`] is the serialized form handed to callers.

use crate::entity::EntityKind;
use crate::grid::GridPosition;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entity and recipe construction
// ---------------------------------------------------------------------------

/// Errors raised while building a single entity from its raw record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    #[error("Unknown object type: {0}")]
    UnknownKind(String),
    #[error("Subtype must be between 0 and {max}")]
    SubtypeOutOfRange { max: usize },
    #[error("Width must be > 0")]
    WidthTooSmall,
    #[error("Width must be <= {max}")]
    WidthTooLarge { max: u32 },
    #[error("Height must be > 0")]
    HeightTooSmall,
    #[error("Height must be <= {max}")]
    HeightTooLarge { max: u32 },
    #[error("{0:?} footprints are generated from width and height")]
    GeneratedFootprint(EntityKind),
    #[error("{0:?} has a fixed footprint and cannot be resized")]
    NotResizable(EntityKind),
    #[error("Deposits and obstacles may not be added here")]
    TerrainNotAllowed,
    #[error("entity not found")]
    NotFound,
}

/// Errors raised while building a recipe from its raw record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    #[error("Subtype must be between 0 and {max}")]
    SubtypeOutOfRange { max: usize },
    #[error("Resources must be an array")]
    ResourcesNotArray,
    #[error("Resources must not have more than {max} entries")]
    TooManyResources { max: usize },
}

// ---------------------------------------------------------------------------
// World errors
// ---------------------------------------------------------------------------

/// Classification carried in the error document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Input,
    State,
}

/// A validation failure of the world or its source document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    // -- input --
    #[error("Raw object must not be falsy")]
    MissingDocument,
    #[error("Width must be > 0")]
    WidthTooSmall,
    #[error("Width must be <= {max}")]
    WidthTooLarge { max: u32 },
    #[error("Height must be > 0")]
    HeightTooSmall,
    #[error("Height must be <= {max}")]
    HeightTooLarge { max: u32 },
    #[error("Objects must be an array")]
    ObjectsNotArray,
    #[error("Products must be an array")]
    ProductsNotArray,
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    // -- state: placement --
    #[error("Placement out of bounds")]
    OutOfBounds { at: GridPosition },
    #[error("Placement conflict: objects intersect")]
    Conflict { at: GridPosition },

    // -- state: connectivity --
    #[error("Egress of deposit may only feed a mine")]
    DepositFeedsNonMine { at: GridPosition },
    #[error("Egress of mine may only feed conveyor/combiner/factory")]
    MineFeedsInvalid { at: GridPosition },
    #[error("Egress may only feed a single ingress")]
    EgressAlreadyConnected { at: GridPosition },

    // -- state: global invariants --
    #[error("Number of turns < 1")]
    NoTurns,
    #[error("List of products is empty")]
    NoProducts,
    #[error("Resource requirements of product {product} are invalid")]
    InvalidRecipeCost { product: u8 },
}

impl WorldError {
    pub fn kind(&self) -> ErrorType {
        match self {
            WorldError::MissingDocument
            | WorldError::WidthTooSmall
            | WorldError::WidthTooLarge { .. }
            | WorldError::HeightTooSmall
            | WorldError::HeightTooLarge { .. }
            | WorldError::ObjectsNotArray
            | WorldError::ProductsNotArray
            | WorldError::Entity(_)
            | WorldError::Recipe(_) => ErrorType::Input,
            WorldError::OutOfBounds { .. }
            | WorldError::Conflict { .. }
            | WorldError::DepositFeedsNonMine { .. }
            | WorldError::MineFeedsInvalid { .. }
            | WorldError::EgressAlreadyConnected { .. }
            | WorldError::NoTurns
            | WorldError::NoProducts
            | WorldError::InvalidRecipeCost { .. } => ErrorType::State,
        }
    }

    /// The grid cell the error refers to, if any.
    pub fn coordinates(&self) -> Option<GridPosition> {
        match self {
            WorldError::OutOfBounds { at }
            | WorldError::Conflict { at }
            | WorldError::DepositFeedsNonMine { at }
            | WorldError::MineFeedsInvalid { at }
            | WorldError::EgressAlreadyConnected { at } => Some(*at),
            _ => None,
        }
    }
}

/// Returned by [`World::simulate`](crate::world::World::simulate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("world has {count} validation error(s) and cannot be simulated")]
    InvalidWorld { count: usize },
}

// ---------------------------------------------------------------------------
// Error document
// ---------------------------------------------------------------------------

/// One entry of the error document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub kind: ErrorType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GridPosition>,
}

impl From<&WorldError> for ErrorRecord {
    fn from(error: &WorldError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            coordinates: error.coordinates(),
        }
    }
}

/// `{ "errors": [...] }`, produced on any validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorRecord>,
}

impl<'a> FromIterator<&'a WorldError> for ErrorDocument {
    fn from_iter<I: IntoIterator<Item = &'a WorldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().map(ErrorRecord::from).collect(),
        }
    }
}
