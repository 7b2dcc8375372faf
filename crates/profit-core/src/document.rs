//! Raw documents: the loosely typed input, the export records and the
//! simulation output.
//!
//! Input fields are coerced the lenient way callers expect: numbers
//! truncate, strings contribute their leading integer (`"-1"`, `"12px"`),
//! and anything else counts as zero.

use crate::entity::{Entity, EntityKind};
use crate::error::{EntityError, RecipeError};
use crate::grid::GridPosition;
use crate::id::{PRODUCT_TYPES, ProductType, RESOURCE_TYPES};
use crate::recipe::Recipe;
use crate::resource::ResourceVector;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Integer value of a raw field, or `None` when it has no integer reading.
pub fn coerce_opt_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

/// Integer value of a raw field; zero when missing or unreadable.
pub fn coerce_int(value: Option<&Value>) -> i64 {
    coerce_opt_int(value).unwrap_or(0)
}

fn coerce_coordinate(value: Option<&Value>) -> i32 {
    coerce_int(value).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Whether a raw document counts as absent.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Export records
// ---------------------------------------------------------------------------

/// Flat record of one structure.
///
/// `subtype` is absent for obstacles; `width`/`height` are present only for
/// deposits and obstacles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Tag carried by every product record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeTag {
    #[default]
    Product,
}

/// Flat record of one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecipe {
    #[serde(rename = "type", default)]
    pub tag: RecipeTag,
    pub subtype: u8,
    pub resources: ResourceVector,
    pub points: i64,
}

/// A whole world as a flat document. Re-parsing it reproduces the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWorld {
    pub width: u32,
    pub height: u32,
    pub objects: Vec<RawEntity>,
    pub products: Vec<RawRecipe>,
    pub turns: i64,
    pub time: Option<i64>,
}

/// What [`World::to_raw`](crate::world::World::to_raw) includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Every structure.
    #[default]
    Complete,
    /// Deposits and obstacles only: the puzzle without a solution.
    Task,
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(ExportMode::Complete),
            "task" => Ok(ExportMode::Task),
            other => Err(format!("unknown export mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Result document of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    #[serde(rename = "yield")]
    pub yields: [i64; PRODUCT_TYPES],
    pub score: i64,
    pub score_at_turn: u32,
    /// Wall-clock milliseconds.
    pub duration: f64,
    pub log: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl Entity {
    /// Build an entity from a loosely typed record.
    pub fn from_value(raw: &Value) -> Result<Self, EntityError> {
        let kind = match raw.get("type") {
            Some(Value::String(name)) => name.parse::<EntityKind>()?,
            Some(other) => return Err(EntityError::UnknownKind(other.to_string())),
            None => return Err(EntityError::UnknownKind("undefined".to_string())),
        };
        let position = GridPosition::new(
            coerce_coordinate(raw.get("x")),
            coerce_coordinate(raw.get("y")),
        );
        Entity::from_parts(
            kind,
            coerce_int(raw.get("subtype")),
            position,
            coerce_int(raw.get("width")),
            coerce_int(raw.get("height")),
        )
    }

    /// Build an entity from an export record.
    pub fn from_raw(raw: &RawEntity) -> Result<Self, EntityError> {
        Entity::from_parts(
            raw.kind,
            raw.subtype.map(i64::from).unwrap_or(0),
            GridPosition::new(raw.x, raw.y),
            raw.width.map(i64::from).unwrap_or(0),
            raw.height.map(i64::from).unwrap_or(0),
        )
    }

    pub fn to_raw(&self) -> RawEntity {
        let dimensions = self.structure().dimensions();
        let position = self.position();
        RawEntity {
            kind: self.kind(),
            x: position.x,
            y: position.y,
            subtype: self.structure().subtype(),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
        }
    }
}

impl Recipe {
    /// Build a recipe from a loosely typed record. Short resource lists are
    /// padded with zeros.
    pub fn from_value(raw: &Value) -> Result<Self, RecipeError> {
        let Some(Value::Array(entries)) = raw.get("resources") else {
            return Err(RecipeError::ResourcesNotArray);
        };
        if entries.len() > RESOURCE_TYPES {
            return Err(RecipeError::TooManyResources {
                max: RESOURCE_TYPES,
            });
        }
        let mut slots = [0; RESOURCE_TYPES];
        for (slot, entry) in slots.iter_mut().zip(entries) {
            *slot = coerce_int(Some(entry));
        }
        let subtype = coerce_int(raw.get("subtype"));
        let product = u8::try_from(subtype)
            .ok()
            .filter(|s| (*s as usize) < PRODUCT_TYPES)
            .ok_or(RecipeError::SubtypeOutOfRange {
                max: PRODUCT_TYPES - 1,
            })?;
        Ok(Recipe::new(
            ProductType(product),
            ResourceVector::new(slots),
            coerce_int(raw.get("points")),
        ))
    }

    pub fn from_raw(raw: &RawRecipe) -> Result<Self, RecipeError> {
        if raw.subtype as usize >= PRODUCT_TYPES {
            return Err(RecipeError::SubtypeOutOfRange {
                max: PRODUCT_TYPES - 1,
            });
        }
        Ok(Recipe::new(ProductType(raw.subtype), raw.resources, raw.points))
    }

    pub fn to_raw(&self) -> RawRecipe {
        RawRecipe {
            tag: RecipeTag::Product,
            subtype: self.product.0,
            resources: self.cost,
            points: self.points,
        }
    }
}
