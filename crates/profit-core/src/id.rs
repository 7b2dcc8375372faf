use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

/// Number of resource subtypes a deposit can hold.
pub const RESOURCE_TYPES: usize = 8;

/// Number of product subtypes a factory can manufacture.
pub const PRODUCT_TYPES: usize = 8;

new_key_type! {
    /// Identifies a placed structure in the world.
    pub struct EntityId;

    /// Identifies a directed link between two structures.
    pub struct EdgeId;
}

/// Identifies a resource subtype. Always below [`RESOURCE_TYPES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceType(pub u8);

impl ResourceType {
    /// Slot index in a [`ResourceVector`](crate::resource::ResourceVector).
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a product subtype. Always below [`PRODUCT_TYPES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductType(pub u8);

impl ProductType {
    /// Slot index in the yield table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
