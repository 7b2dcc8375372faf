//! The world: owner of every structure, recipe and piece of derived state.
//!
//! Structural changes go through `&mut self` methods that finish with a
//! full re-derivation ([`World::update`]) and a simulation reset, so the
//! grid, the flow graph and the error list always describe the current
//! structures.

use crate::connectivity::{self, FlowGraph};
use crate::document::{self, ExportMode, RawWorld};
use crate::entity::Entity;
use crate::error::{EntityError, ErrorDocument, RecipeError, WorldError};
use crate::event::EventLog;
use crate::grid::{Grid, GridPosition, MAX_DIMENSION};
use crate::id::EntityId;
use crate::recipe::Recipe;
use crate::sim::SimState;
use serde_json::Value;
use slotmap::SlotMap;

/// A puzzle world and its simulation state.
#[derive(Debug, Clone, Default)]
pub struct World {
    width: u32,
    height: u32,
    pub(crate) entities: SlotMap<EntityId, Entity>,
    /// Insertion order; fixes the per-turn processing order.
    pub(crate) order: Vec<EntityId>,
    pub(crate) recipes: Vec<Recipe>,
    /// A missing or unreadable count reads as 0.
    pub(crate) turns: i64,
    time: Option<i64>,

    grid: Grid,
    pub(crate) graph: FlowGraph,
    /// Errors from the last `parse`. Kept until the next one.
    input_errors: Vec<WorldError>,
    /// Errors from the last re-derivation.
    state_errors: Vec<WorldError>,

    pub(crate) sim: SimState,
    pub(crate) log: EventLog,
    /// Phase timings of the last completed run.
    #[cfg(feature = "profiling")]
    pub(crate) last_profile: Option<crate::profiling::RunProfile>,
}

impl World {
    /// An empty world with no area, no structures and no recipes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw document into a fresh world. Check
    /// [`errors`](Self::errors) before simulating.
    pub fn from_value(raw: &Value) -> Self {
        let mut world = Self::new();
        world.parse(raw);
        world
    }

    /// Parse a JSON document into a fresh world.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&raw))
    }

    /// Build a world from an export record. Unlike [`parse`](Self::parse),
    /// a record that fails validation yields no world at all.
    pub fn from_raw(raw: &RawWorld) -> Result<Self, WorldError> {
        let (width, height) = check_size(i64::from(raw.width), i64::from(raw.height))?;
        let entities = raw
            .objects
            .iter()
            .map(Entity::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        let recipes = raw
            .products
            .iter()
            .map(Recipe::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        let mut world = Self::new();
        world.width = width;
        world.height = height;
        for entity in entities {
            world.insert(entity);
        }
        world.recipes = recipes;
        world.turns = raw.turns;
        world.time = raw.time;
        world.reset_simulation();
        Ok(world)
    }

    /// Replace the whole world with the contents of `raw`.
    ///
    /// Validation stops at the first input error, which is kept and leaves
    /// the world empty. Otherwise the world is re-derived and reset.
    pub fn parse(&mut self, raw: &Value) {
        let log_enabled = self.log.is_enabled();
        *self = Self::new();
        self.log.set_enabled(log_enabled);
        match Self::read_document(raw) {
            Ok(parsed) => {
                self.width = parsed.width;
                self.height = parsed.height;
                for entity in parsed.entities {
                    self.insert(entity);
                }
                self.recipes = parsed.recipes;
                self.turns = parsed.turns;
                self.time = parsed.time;
                self.reset_simulation();
            }
            Err(error) => {
                tracing::debug!(%error, "document rejected");
                self.input_errors.push(error);
            }
        }
    }

    fn read_document(raw: &Value) -> Result<ParsedDocument, WorldError> {
        if document::is_falsy(raw) {
            return Err(WorldError::MissingDocument);
        }
        let (width, height) = check_size(
            document::coerce_int(raw.get("width")),
            document::coerce_int(raw.get("height")),
        )?;

        let Some(Value::Array(objects)) = raw.get("objects") else {
            return Err(WorldError::ObjectsNotArray);
        };
        let entities = objects
            .iter()
            .map(Entity::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        let Some(Value::Array(products)) = raw.get("products") else {
            return Err(WorldError::ProductsNotArray);
        };
        let recipes = products
            .iter()
            .map(Recipe::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ParsedDocument {
            width,
            height,
            entities,
            recipes,
            turns: document::coerce_int(raw.get("turns")),
            time: document::coerce_opt_int(raw.get("time")),
        })
    }

    // -- Re-derivation --

    /// Rebuild the grid, the flow graph and the state errors from the
    /// current structures. Restores every deposit's stock.
    ///
    /// Nothing is derived while input errors are present.
    pub fn update(&mut self) {
        self.state_errors.clear();
        self.graph.clear();
        if !self.input_errors.is_empty() {
            return;
        }

        self.grid = Grid::new(self.width, self.height);
        for &id in &self.order {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            entity.restock();
            let cells: Vec<_> = entity.footprint().cells(entity.position()).collect();
            let (laid, errors) = self.grid.place(id, entity.kind(), cells);
            entity.placed = laid;
            self.state_errors.extend(errors);
        }

        if self.state_errors.is_empty() {
            let (graph, errors) = connectivity::resolve(&self.entities, &self.order, &self.grid);
            self.graph = graph;
            self.state_errors.extend(errors);
            if let Some(error) = self.global_error() {
                self.state_errors.push(error);
            }
        }

        tracing::debug!(
            entities = self.order.len(),
            edges = self.graph.edge_count(),
            errors = self.state_errors.len(),
            "world re-derived"
        );
    }

    /// First violated world-wide invariant, checked in a fixed order.
    fn global_error(&self) -> Option<WorldError> {
        if self.turns < 1 {
            return Some(WorldError::NoTurns);
        }
        if self.recipes.is_empty() {
            return Some(WorldError::NoProducts);
        }
        self.recipes
            .iter()
            .find(|r| !r.has_valid_cost())
            .map(|r| WorldError::InvalidRecipeCost { product: r.product.0 })
    }

    /// Input errors first, then state errors.
    pub fn errors(&self) -> impl Iterator<Item = &WorldError> {
        self.input_errors.iter().chain(&self.state_errors)
    }

    pub fn error_count(&self) -> usize {
        self.input_errors.len() + self.state_errors.len()
    }

    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_document(&self) -> ErrorDocument {
        self.errors().collect()
    }

    // -- Mutation --

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.insert(entity);
        self.order.push(id);
        id
    }

    /// Append a structure and re-derive.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = self.insert(entity);
        self.reset_simulation();
        id
    }

    /// Build a structure from a loosely typed record and append it.
    pub fn parse_entity(&mut self, raw: &Value) -> Result<EntityId, EntityError> {
        let entity = Entity::from_value(raw)?;
        Ok(self.add_entity(entity))
    }

    /// Build and append several structures. Nothing is added when any record
    /// fails, or when `disallow_terrain` is set and a record is a deposit or
    /// obstacle.
    pub fn parse_entities(
        &mut self,
        raws: &[Value],
        disallow_terrain: bool,
    ) -> Result<Vec<EntityId>, EntityError> {
        let entities = raws
            .iter()
            .map(Entity::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        if disallow_terrain && entities.iter().any(|e| e.kind().is_terrain()) {
            return Err(EntityError::TerrainNotAllowed);
        }
        let ids = entities.into_iter().map(|e| self.insert(e)).collect();
        self.reset_simulation();
        Ok(ids)
    }

    /// Replace the recipe list with loosely typed records.
    pub fn parse_recipes(&mut self, raws: &[Value]) -> Result<(), RecipeError> {
        let recipes = raws
            .iter()
            .map(Recipe::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.set_recipes(recipes);
        Ok(())
    }

    pub fn set_recipes(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes;
        self.reset_simulation();
    }

    /// Move a structure's anchor.
    pub fn move_entity(&mut self, id: EntityId, position: GridPosition) -> Result<(), EntityError> {
        self.entities
            .get_mut(id)
            .ok_or(EntityError::NotFound)?
            .set_position(position);
        self.reset_simulation();
        Ok(())
    }

    /// Change the size of a deposit or obstacle.
    pub fn resize_entity(&mut self, id: EntityId, width: i64, height: i64) -> Result<(), EntityError> {
        self.entities
            .get_mut(id)
            .ok_or(EntityError::NotFound)?
            .set_dimensions(width, height)?;
        self.reset_simulation();
        Ok(())
    }

    /// Remove a structure. Unknown ids are ignored.
    pub fn delete_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(id)?;
        self.order.retain(|&o| o != id);
        self.reset_simulation();
        Some(entity)
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
        self.order.clear();
        self.reset_simulation();
    }

    /// Change the grid size, deleting structures that had a cell beyond
    /// the new right or bottom edge. A size outside `1..=100` is refused
    /// and leaves the world untouched.
    pub fn resize(&mut self, width: i64, height: i64) -> Result<(), WorldError> {
        let (width, height) = check_size(width, height)?;
        self.width = width;
        self.height = height;
        let beyond: Vec<EntityId> = self
            .entities()
            .filter(|(_, e)| {
                e.placed_cells().iter().any(|(p, _)| {
                    i64::from(p.x) >= i64::from(width) || i64::from(p.y) >= i64::from(height)
                })
            })
            .map(|(id, _)| id)
            .collect();
        for id in beyond {
            self.entities.remove(id);
        }
        let entities = &self.entities;
        self.order.retain(|&id| entities.contains_key(id));
        self.reset_simulation();
        Ok(())
    }

    pub fn set_turns(&mut self, turns: i64) {
        self.turns = turns;
        self.reset_simulation();
    }

    /// Record a time budget. Carried through export, never enforced.
    pub fn set_time(&mut self, time: Option<i64>) {
        self.time = time;
        self.reset_simulation();
    }

    pub fn set_log_enabled(&mut self, enabled: bool) {
        self.log.set_enabled(enabled);
    }

    // -- Export --

    /// Flatten the world into a document that parses back to the same world.
    pub fn to_raw(&self, mode: ExportMode) -> RawWorld {
        RawWorld {
            width: self.width,
            height: self.height,
            objects: self
                .entities()
                .filter(|(_, e)| mode == ExportMode::Complete || e.kind().is_terrain())
                .map(|(_, e)| e.to_raw())
                .collect(),
            products: self.recipes.iter().map(Recipe::to_raw).collect(),
            turns: self.turns,
            time: self.time,
        }
    }

    // -- Queries --

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn turns(&self) -> i64 {
        self.turns
    }

    pub fn time(&self) -> Option<i64> {
        self.time
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Structures in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.order
            .iter()
            .filter_map(|&id| self.entities.get(id).map(|e| (id, e)))
    }

    pub fn entity_ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }
}

/// Grid size checks shared by parsing and [`World::resize`].
fn check_size(width: i64, height: i64) -> Result<(u32, u32), WorldError> {
    if width < 1 {
        return Err(WorldError::WidthTooSmall);
    }
    if width > i64::from(MAX_DIMENSION) {
        return Err(WorldError::WidthTooLarge { max: MAX_DIMENSION });
    }
    if height < 1 {
        return Err(WorldError::HeightTooSmall);
    }
    if height > i64::from(MAX_DIMENSION) {
        return Err(WorldError::HeightTooLarge { max: MAX_DIMENSION });
    }
    Ok((width as u32, height as u32))
}

struct ParsedDocument {
    width: u32,
    height: u32,
    entities: Vec<Entity>,
    recipes: Vec<Recipe>,
    turns: i64,
    time: Option<i64>,
}
