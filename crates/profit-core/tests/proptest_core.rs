//! Property-based tests for the world model and the simulator.
//!
//! Uses proptest to generate random documents and layouts, then verify
//! that validation, export and simulation keep their invariants.

use profit_core::document::ExportMode;
use profit_core::grid::GridPosition;
use profit_core::id::EntityId;
use profit_core::test_utils::*;
use profit_core::world::World;
use proptest::prelude::*;
use serde_json::{Value, json};

// ===========================================================================
// Generators
// ===========================================================================

/// A random structure record anchored somewhere on a 20x20 grid. Some of
/// them overlap or hang over the edge.
fn arb_record() -> impl Strategy<Value = Value> {
    (0..6u8, 0..20i32, 0..20i32, 0..8u8, 1..5u32, 1..5u32).prop_map(
        |(kind, x, y, subtype, w, h)| match kind {
            0 => deposit(x, y, subtype, w, h),
            1 => obstacle(x, y, w, h),
            2 => mine(x, y, subtype % 4),
            3 => conveyor(x, y, subtype),
            4 => combiner(x, y, subtype % 4),
            _ => factory(x, y, subtype),
        },
    )
}

fn arb_document(max_records: usize) -> impl Strategy<Value = Value> {
    (proptest::collection::vec(arb_record(), 0..=max_records), 1..30i64).prop_map(
        |(objects, turns)| {
            json!({
                "width": 20,
                "height": 20,
                "objects": objects,
                "products": [product(0, &[1, 1, 0, 0, 0, 0, 0, 0], 5), product(3, &[2], 1)],
                "turns": turns
            })
        },
    )
}

/// Every link as `(from, to, outbound, inbound)`, sorted.
fn edge_list(world: &World) -> Vec<(EntityId, EntityId, GridPosition, GridPosition)> {
    let mut links: Vec<_> = world
        .graph()
        .edges()
        .map(|(_, e)| (e.from, e.to, e.outbound, e.inbound))
        .collect();
    links.sort();
    links
}

/// Log lines without the trailing duration line, which varies between runs.
fn stable_lines(world: &World) -> Vec<String> {
    let mut lines = world.log_lines();
    lines.pop();
    lines
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any size within bounds is accepted.
    #[test]
    fn dimensions_in_range_are_valid(width in 1..=100u32, height in 1..=100u32) {
        let world = World::from_value(&json!({
            "width": width,
            "height": height,
            "objects": [],
            "products": [product(0, &[1], 1)],
            "turns": 1
        }));
        prop_assert!(world.is_valid(), "{:?}", error_messages(&world));
        prop_assert_eq!((world.width(), world.height()), (width, height));
    }

    /// Any width above the limit is the one and only error.
    #[test]
    fn oversized_width_is_rejected(width in 101..10_000i64) {
        let world = World::from_value(&json!({ "width": width, "height": 1 }));
        prop_assert_eq!(error_messages(&world), vec!["Width must be <= 100".to_string()]);
    }

    /// Conveyor and factory variants run 0-7, mine and combiner 0-3.
    #[test]
    fn subtype_ranges(subtype in -3..12i64) {
        for (kind, count) in [("mine", 4), ("conveyor", 8), ("combiner", 4), ("factory", 8)] {
            let world = world_with_objects(vec![
                json!({ "type": kind, "x": 3, "y": 3, "subtype": subtype }),
            ]);
            let in_range = (0..count).contains(&subtype);
            prop_assert_eq!(world.is_valid(), in_range, "{} {}", kind, subtype);
        }
    }

    /// Exporting and re-parsing reproduces the same world and errors.
    #[test]
    fn export_round_trip(doc in arb_document(12)) {
        let world = World::from_value(&doc);
        let raw = serde_json::to_value(world.to_raw(ExportMode::Complete)).unwrap();
        let copy = World::from_value(&raw);
        prop_assert_eq!(copy.to_raw(ExportMode::Complete), world.to_raw(ExportMode::Complete));
        prop_assert_eq!(error_messages(&copy), error_messages(&world));
    }

    /// Re-deriving an unchanged world changes nothing: same errors, same
    /// occupancy and the same links.
    #[test]
    fn update_is_idempotent(doc in arb_document(12)) {
        let mut world = World::from_value(&doc);
        let before: Vec<_> = world.errors().cloned().collect();
        let grid = world.grid().clone();
        let links = edge_list(&world);
        world.update();
        prop_assert_eq!(world.errors().cloned().collect::<Vec<_>>(), before);
        prop_assert_eq!(world.grid(), &grid);
        prop_assert_eq!(edge_list(&world), links);
    }

    /// Valid random layouts simulate deterministically, and the score is the
    /// sum of yield times points.
    #[test]
    fn simulation_is_deterministic(doc in arb_document(12)) {
        let mut world = World::from_value(&doc);
        prop_assume!(world.is_valid());
        let first = world.simulate().unwrap().clone();
        let first_lines = stable_lines(&world);
        let second = world.simulate().unwrap().clone();
        prop_assert_eq!(first.score, second.score);
        prop_assert_eq!(first.yields, second.yields);
        prop_assert_eq!(first_lines, stable_lines(&world));
        prop_assert_eq!(first.score, first.yields[0] * 5 + first.yields[3]);
    }

    /// More turns never lower the pipeline's score.
    #[test]
    fn pipeline_score_is_monotone(turns in 1..40i64) {
        let mut shorter = World::from_value(&pipeline_document(turns));
        let mut longer = World::from_value(&pipeline_document(turns + 1));
        let a = shorter.simulate().unwrap().score;
        let b = longer.simulate().unwrap().score;
        prop_assert!(a <= b, "{} turns: {}, {} turns: {}", turns, a, turns + 1, b);
    }
}
