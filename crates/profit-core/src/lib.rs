//! Profit Core -- the engine of a turn-based resource-flow puzzle.
//!
//! Structures are placed on a bounded grid: deposits hold finite stock,
//! mines extract it, conveyors and combiners carry it, and factories turn
//! it into scored products. Structures only interact through ports on
//! adjacent cells.
//!
//! # Pipeline
//!
//! 1. **Parse** -- a loosely typed document becomes a [`world::World`].
//!    The first malformed field stops parsing with an `input` error.
//! 2. **Place** -- every footprint is laid onto the [`grid::Grid`];
//!    out-of-bounds cells and overlaps become `state` errors.
//! 3. **Connect** -- outbound ports next to inbound ports of other
//!    structures become edges of the [`connectivity::FlowGraph`].
//! 4. **Simulate** -- [`world::World::simulate`] runs a commit phase and a
//!    transfer/production phase per turn and records a log.
//!
//! Steps 2 and 3 together are the re-derivation performed by
//! [`world::World::update`] after every mutation.
//!
//! ```rust,ignore
//! let mut world = World::from_json(&text)?;
//! if world.is_valid() {
//!     world.simulate()?;
//!     println!("{}", serde_json::to_string(&world.output())?);
//! }
//! ```
//!
//! # Key Types
//!
//! - [`world::World`] -- owner of structures, recipes and run state.
//! - [`entity::Entity`] / [`entity::Structure`] -- a placed structure.
//! - [`footprint::Footprint`] -- resolved cell-role template.
//! - [`error::WorldError`] -- every validation failure, with
//!   [`error::ErrorDocument`] as its serialized form.
//! - [`event::SimEvent`] -- typed log entries.

pub mod connectivity;
pub mod document;
pub mod entity;
pub mod error;
pub mod event;
pub mod footprint;
pub mod grid;
pub mod id;
#[cfg(feature = "profiling")]
pub mod profiling;
pub mod recipe;
pub mod resource;
pub mod sim;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
