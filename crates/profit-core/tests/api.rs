//! Public API tests: world mutation, incremental parsing and export.

use profit_core::document::ExportMode;
use profit_core::error::{EntityError, WorldError};
use profit_core::grid::GridPosition;
use profit_core::test_utils::*;
use profit_core::world::World;
use serde_json::json;

// ===========================================================================
// Mutation
// ===========================================================================

#[test]
fn resize_drops_structures_beyond_the_edge() {
    let mut world = world_with_objects(vec![deposit(3, 3, 0, 3, 3), deposit(0, 0, 0, 1, 1)]);
    assert_eq!(world.entity_count(), 2);
    world.resize(1, 2).unwrap();
    assert_eq!(world.width(), 1);
    assert_eq!(world.height(), 2);
    assert_eq!(world.entity_count(), 1);
    let (_, kept) = world.entities().next().unwrap();
    assert_eq!(kept.position(), GridPosition::new(0, 0));
}

#[test]
fn resize_checks_bounds() {
    let mut world = world_with_objects(vec![deposit(3, 3, 0, 3, 3)]);
    assert_eq!(world.resize(0, 5), Err(WorldError::WidthTooSmall));
    assert_eq!(world.resize(101, 5), Err(WorldError::WidthTooLarge { max: 100 }));
    assert_eq!(world.resize(5, -3), Err(WorldError::HeightTooSmall));
    assert_eq!(world.resize(5, 1_000_000), Err(WorldError::HeightTooLarge { max: 100 }));
    assert_eq!((world.width(), world.height()), (10, 10));
    assert_eq!(world.entity_count(), 1);
    assert!(world.is_valid());

    world.resize(100, 100).unwrap();
    assert_eq!((world.width(), world.height()), (100, 100));
    assert_eq!(world.entity_count(), 1);
    world.resize(1, 1).unwrap();
    assert_eq!(world.entity_count(), 0);
}

#[test]
fn move_entity() {
    let mut world = world_with_objects(vec![deposit(0, 0, 0, 3, 3)]);
    let id = world.entity_ids()[0];
    assert_eq!(world.entity(id).unwrap().position(), GridPosition::new(0, 0));
    world.move_entity(id, GridPosition::new(1, 2)).unwrap();
    assert_eq!(world.entity(id).unwrap().position(), GridPosition::new(1, 2));
    assert!(world.is_valid());
}

#[test]
fn resize_entity() {
    let mut world = world_with_objects(vec![deposit(0, 0, 0, 3, 3)]);
    let id = world.entity_ids()[0];
    assert_eq!(world.entity(id).unwrap().structure().dimensions(), Some((3, 3)));
    world.resize_entity(id, 1, 2).unwrap();
    assert_eq!(world.entity(id).unwrap().structure().dimensions(), Some((1, 2)));
}

#[test]
fn machines_cannot_be_resized() {
    let mut world = world_with_objects(vec![conveyor(3, 3, 0)]);
    let id = world.entity_ids()[0];
    assert!(matches!(
        world.resize_entity(id, 2, 2),
        Err(EntityError::NotResizable(_))
    ));
}

#[test]
fn invalid_resize_is_rejected() {
    let mut world = world_with_objects(vec![obstacle(0, 0, 3, 3)]);
    let id = world.entity_ids()[0];
    assert_eq!(world.resize_entity(id, 0, 2), Err(EntityError::WidthTooSmall));
    assert_eq!(world.entity(id).unwrap().structure().dimensions(), Some((3, 3)));
}

#[test]
fn clear_entities() {
    let mut world = world_with_objects(vec![deposit(0, 0, 0, 3, 3)]);
    assert_ne!(world.entity_count(), 0);
    world.clear_entities();
    assert_eq!(world.entity_count(), 0);
    assert!(world.is_valid());
}

#[test]
fn set_turns() {
    let mut world = world_with_objects(vec![]);
    assert_eq!(world.turns(), 10);
    world.set_turns(5);
    assert_eq!(world.turns(), 5);
    world.set_turns(0);
    assert_eq!(
        world.errors().next().map(ToString::to_string).as_deref(),
        Some("Number of turns < 1")
    );
}

#[test]
fn set_time() {
    let mut world = world_with_objects(vec![]);
    assert_eq!(world.time(), Some(10));
    world.set_time(Some(5));
    assert_eq!(world.time(), Some(5));
}

#[test]
fn mutation_rederives_errors() {
    let mut world = world_with_objects(vec![obstacle(0, 0, 2, 2), obstacle(5, 5, 2, 2)]);
    assert!(world.is_valid());
    let second = world.entity_ids()[1];
    world.move_entity(second, GridPosition::new(1, 1)).unwrap();
    assert_eq!(error_messages(&world), vec!["Placement conflict: objects intersect"]);
    world.delete_entity(second);
    assert!(world.is_valid());
}

// ===========================================================================
// Incremental parsing
// ===========================================================================

#[test]
fn parse_entity() {
    let mut world = world_with_objects(vec![]);
    assert_eq!(world.entity_count(), 0);
    world.parse_entity(&deposit(0, 0, 0, 3, 3)).unwrap();
    assert_eq!(world.entity_count(), 1);
    assert_eq!(
        world.parse_entity(&json!({ "type": "belt" })),
        Err(EntityError::UnknownKind("belt".into()))
    );
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn parse_entities() {
    let mut world = world_with_objects(vec![]);
    let ids = world
        .parse_entities(&[deposit(0, 0, 0, 3, 3), deposit(3, 3, 0, 3, 3)], false)
        .unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(world.entity_count(), 2);
    assert_eq!(
        world.parse_entities(&[obstacle(0, 0, 1, 1)], true),
        Err(EntityError::TerrainNotAllowed)
    );
    assert_eq!(world.entity_count(), 2);
}

#[test]
fn parse_recipes() {
    let mut world = world_with_objects(vec![]);
    assert!(!world.recipes().is_empty());
    world
        .parse_recipes(&[product(0, &[1; 8], 1), product(1, &[1; 8], 1)])
        .unwrap();
    assert_eq!(world.recipes().len(), 2);
    assert!(world.parse_recipes(&[json!({ "subtype": 0, "points": 1 })]).is_err());
    assert_eq!(world.recipes().len(), 2);
}

// ===========================================================================
// Export
// ===========================================================================

fn export_world() -> World {
    world_with_objects(vec![
        deposit(0, 0, 0, 3, 3),
        obstacle(3, 3, 3, 3),
        conveyor(6, 6, 0),
    ])
}

#[test]
fn export_complete() {
    let raw = serde_json::to_value(export_world().to_raw(ExportMode::Complete)).unwrap();
    assert_eq!(
        raw,
        json!({
            "width": 10,
            "height": 10,
            "objects": [
                { "type": "deposit", "x": 0, "y": 0, "subtype": 0, "width": 3, "height": 3 },
                { "type": "obstacle", "x": 3, "y": 3, "width": 3, "height": 3 },
                { "type": "conveyor", "x": 6, "y": 6, "subtype": 0 }
            ],
            "products": [
                { "type": "product", "subtype": 0, "resources": [1, 1, 1, 1, 1, 1, 1, 1], "points": 0 }
            ],
            "turns": 10,
            "time": 10
        })
    );
}

#[test]
fn export_task() {
    let raw = serde_json::to_value(export_world().to_raw(ExportMode::Task)).unwrap();
    assert_eq!(
        raw["objects"],
        json!([
            { "type": "deposit", "x": 0, "y": 0, "subtype": 0, "width": 3, "height": 3 },
            { "type": "obstacle", "x": 3, "y": 3, "width": 3, "height": 3 }
        ])
    );
    assert_eq!(raw["turns"], 10);
    assert_eq!(raw["time"], 10);
}

#[test]
fn export_key_order() {
    let text = serde_json::to_string(&export_world().to_raw(ExportMode::Task)).unwrap();
    assert!(text.starts_with(
        r#"{"width":10,"height":10,"objects":[{"type":"deposit","x":0,"y":0,"subtype":0,"width":3,"height":3}"#
    ));
    assert!(text.ends_with(r#""turns":10,"time":10}"#));
}

#[test]
fn export_reimports_to_the_same_world() {
    let mut source = showcase_world();
    let raw = serde_json::to_value(source.to_raw(ExportMode::Complete)).unwrap();
    let mut copy = World::from_value(&raw);
    assert!(copy.is_valid(), "{:?}", error_messages(&copy));
    assert_eq!(copy.to_raw(ExportMode::Complete), source.to_raw(ExportMode::Complete));
    source.simulate().unwrap();
    copy.simulate().unwrap();
    assert_eq!(copy.score(), source.score());
    assert_eq!(copy.log_lines().len(), source.log_lines().len());
}

#[test]
fn export_record_rebuilds_the_world() {
    let mut source = showcase_world();
    let raw = source.to_raw(ExportMode::Complete);
    let mut copy = World::from_raw(&raw).unwrap();
    assert!(copy.is_valid(), "{:?}", error_messages(&copy));
    assert_eq!(copy.to_raw(ExportMode::Complete), raw);
    assert_eq!(copy.grid(), source.grid());
    assert_eq!(copy.graph().edge_count(), source.graph().edge_count());
    source.simulate().unwrap();
    copy.simulate().unwrap();
    assert_eq!(copy.score(), source.score());
    assert_eq!(copy.score_at_turn(), source.score_at_turn());
}

#[test]
fn task_record_rebuilds_the_puzzle() {
    let raw = export_world().to_raw(ExportMode::Task);
    let world = World::from_raw(&raw).unwrap();
    assert_eq!(world.entity_count(), 2);
    assert_eq!(world.turns(), 10);
    assert_eq!(world.time(), Some(10));
}

#[test]
fn invalid_export_record_is_refused() {
    let mut raw = export_world().to_raw(ExportMode::Complete);
    raw.width = 0;
    assert_eq!(World::from_raw(&raw).unwrap_err(), WorldError::WidthTooSmall);

    let mut raw = export_world().to_raw(ExportMode::Complete);
    raw.objects[2].subtype = Some(9);
    assert!(matches!(
        World::from_raw(&raw),
        Err(WorldError::Entity(EntityError::SubtypeOutOfRange { .. }))
    ));

    let mut raw = export_world().to_raw(ExportMode::Complete);
    raw.products[0].subtype = 8;
    assert!(World::from_raw(&raw).is_err());
}
