//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::world::World;
use serde_json::{Value, json};

// ===========================================================================
// Record builders
// ===========================================================================

pub fn deposit(x: i32, y: i32, subtype: u8, width: u32, height: u32) -> Value {
    json!({ "type": "deposit", "x": x, "y": y, "subtype": subtype, "width": width, "height": height })
}

pub fn obstacle(x: i32, y: i32, width: u32, height: u32) -> Value {
    json!({ "type": "obstacle", "x": x, "y": y, "width": width, "height": height })
}

pub fn mine(x: i32, y: i32, subtype: u8) -> Value {
    json!({ "type": "mine", "x": x, "y": y, "subtype": subtype })
}

pub fn conveyor(x: i32, y: i32, subtype: u8) -> Value {
    json!({ "type": "conveyor", "x": x, "y": y, "subtype": subtype })
}

pub fn combiner(x: i32, y: i32, subtype: u8) -> Value {
    json!({ "type": "combiner", "x": x, "y": y, "subtype": subtype })
}

pub fn factory(x: i32, y: i32, subtype: u8) -> Value {
    json!({ "type": "factory", "x": x, "y": y, "subtype": subtype })
}

pub fn product(subtype: u8, resources: &[i64], points: i64) -> Value {
    json!({ "type": "product", "subtype": subtype, "resources": resources, "points": points })
}

// ===========================================================================
// Documents
// ===========================================================================

/// A 10x10 document around `objects`, with a valid recipe, 10 turns and a
/// time budget of 10.
pub fn small_document(objects: Vec<Value>) -> Value {
    json!({
        "width": 10,
        "height": 10,
        "objects": objects,
        "products": [product(0, &[1, 1, 1, 1, 1, 1, 1, 1], 0)],
        "turns": 10,
        "time": 10
    })
}

/// Parse [`small_document`] into a world.
pub fn world_with_objects(objects: Vec<Value>) -> World {
    World::from_value(&small_document(objects))
}

/// Deposit, mine, conveyor and factory in a straight line on a 20x10 grid.
/// Every unit mined becomes one point.
pub fn pipeline_document(turns: i64) -> Value {
    json!({
        "width": 20,
        "height": 10,
        "objects": [
            deposit(0, 0, 0, 3, 3),
            mine(4, 0, 0),
            conveyor(8, 1, 0),
            factory(10, 0, 0)
        ],
        "products": [product(0, &[1], 1)],
        "turns": turns
    })
}

/// Four deposits feeding two factories through mines, conveyors and
/// combiners on a 29x23 grid walled by obstacles.
pub fn showcase_document() -> Value {
    json!({
        "width": 29,
        "height": 23,
        "objects": [
            obstacle(8, 0, 4, 11),
            obstacle(8, 12, 4, 11),
            deposit(0, 0, 0, 8, 9),
            deposit(0, 14, 1, 8, 9),
            deposit(21, 0, 2, 8, 9),
            deposit(21, 14, 3, 8, 9),
            obstacle(17, 0, 4, 11),
            obstacle(17, 12, 4, 11),
            obstacle(14, 10, 1, 3),
            obstacle(12, 0, 5, 1),
            obstacle(12, 22, 5, 1),
            combiner(7, 11, 0),
            combiner(21, 11, 2),
            combiner(14, 15, 1),
            combiner(14, 7, 3),
            conveyor(10, 11, 4),
            conveyor(17, 11, 6),
            conveyor(16, 13, 1),
            conveyor(12, 9, 3),
            mine(4, 12, 0),
            mine(4, 9, 2),
            factory(12, 1, 0),
            factory(12, 17, 1),
            conveyor(3, 11, 1),
            mine(23, 9, 2),
            mine(23, 12, 0),
            conveyor(25, 11, 3)
        ],
        "products": [
            product(0, &[10, 10, 0, 0, 0, 0, 0, 0], 10),
            product(1, &[0, 0, 10, 10, 0, 0, 0, 0], 10)
        ],
        "turns": 20
    })
}

/// Parse [`showcase_document`] into a world.
pub fn showcase_world() -> World {
    World::from_value(&showcase_document())
}

/// Messages of every error, in order.
pub fn error_messages(world: &World) -> Vec<String> {
    world.errors().map(ToString::to_string).collect()
}
