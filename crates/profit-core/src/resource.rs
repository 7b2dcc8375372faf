use crate::id::{RESOURCE_TYPES, ResourceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantities of every resource subtype, one slot per subtype.
///
/// Used for what a structure holds (`storage`), what arrives at the next
/// commit (`incoming`), and what a recipe costs. Storage never goes
/// negative; recipe costs may until the world is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector([i64; RESOURCE_TYPES]);

impl ResourceVector {
    pub const ZERO: Self = Self([0; RESOURCE_TYPES]);

    pub fn new(slots: [i64; RESOURCE_TYPES]) -> Self {
        Self(slots)
    }

    /// A vector holding `quantity` of a single subtype.
    pub fn single(resource: ResourceType, quantity: i64) -> Self {
        let mut v = Self::ZERO;
        v.add(resource, quantity);
        v
    }

    pub fn slots(&self) -> &[i64; RESOURCE_TYPES] {
        &self.0
    }

    pub fn get(&self, resource: ResourceType) -> i64 {
        self.0[resource.index()]
    }

    pub fn add(&mut self, resource: ResourceType, quantity: i64) {
        self.0[resource.index()] += quantity;
    }

    /// Slot-wise add `other` into `self`. Returns the total moved.
    pub fn merge(&mut self, other: &ResourceVector) -> i64 {
        let mut delta = 0;
        for (slot, q) in self.0.iter_mut().zip(other.0) {
            *slot += q;
            delta += q;
        }
        delta
    }

    /// Empty the vector, returning what it held.
    pub fn take(&mut self) -> ResourceVector {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.0 = [0; RESOURCE_TYPES];
    }

    /// Sum of all slots.
    pub fn total(&self) -> i64 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&q| q == 0)
    }

    pub fn has_negative(&self) -> bool {
        self.0.iter().any(|&q| q < 0)
    }

    /// Whether every slot holds at least what `cost` requires.
    pub fn covers(&self, cost: &ResourceVector) -> bool {
        self.0.iter().zip(cost.0).all(|(&have, need)| have >= need)
    }

    /// Subtract `cost` slot-wise. Callers check [`covers`](Self::covers) first.
    pub fn deduct(&mut self, cost: &ResourceVector) {
        for (slot, q) in self.0.iter_mut().zip(cost.0) {
            *slot -= q;
        }
    }
}

impl From<[i64; RESOURCE_TYPES]> for ResourceVector {
    fn from(slots: [i64; RESOURCE_TYPES]) -> Self {
        Self(slots)
    }
}

/// Formats the non-zero slots as `[3x0, 5x2]` (quantity x subtype).
impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        let mut first = true;
        for (subtype, &q) in self.0.iter().enumerate() {
            if q > 0 {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{q}x{subtype}")?;
                first = false;
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_returns_moved_total() {
        let mut storage = ResourceVector::single(ResourceType(0), 2);
        let incoming = ResourceVector::new([1, 0, 4, 0, 0, 0, 0, 0]);
        assert_eq!(storage.merge(&incoming), 5);
        assert_eq!(storage.get(ResourceType(0)), 3);
        assert_eq!(storage.get(ResourceType(2)), 4);
        assert_eq!(storage.total(), 7);
    }

    #[test]
    fn take_leaves_zero() {
        let mut v = ResourceVector::single(ResourceType(5), 9);
        let taken = v.take();
        assert!(v.is_empty());
        assert_eq!(taken.get(ResourceType(5)), 9);
    }

    #[test]
    fn covers_and_deduct() {
        let mut storage = ResourceVector::new([10, 10, 0, 0, 0, 0, 0, 0]);
        let cost = ResourceVector::new([10, 10, 0, 0, 0, 0, 0, 0]);
        assert!(storage.covers(&cost));
        storage.deduct(&cost);
        assert!(storage.is_empty());
        assert!(!storage.covers(&cost));
    }

    #[test]
    fn negative_detection() {
        assert!(ResourceVector::new([1, -1, 0, 0, 0, 0, 0, 0]).has_negative());
        assert!(!ResourceVector::ZERO.has_negative());
    }

    #[test]
    fn display_skips_empty_slots() {
        assert_eq!(ResourceVector::ZERO.to_string(), "[]");
        assert_eq!(
            ResourceVector::new([3, 0, 0, 12, 0, 0, 0, 0]).to_string(),
            "[3x0, 12x3]"
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        let v = ResourceVector::new([1, 2, 3, 4, 5, 6, 7, 8]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "[1,2,3,4,5,6,7,8]");
    }
}
