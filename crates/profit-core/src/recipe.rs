use crate::id::ProductType;
use crate::resource::ResourceVector;
use serde::{Deserialize, Serialize};

/// A product a factory of the matching subtype can manufacture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub product: ProductType,
    pub cost: ResourceVector,
    pub points: i64,
}

impl Recipe {
    pub fn new(product: ProductType, cost: ResourceVector, points: i64) -> Self {
        Self {
            product,
            cost,
            points,
        }
    }

    /// A usable cost asks for at least one unit and never a negative one.
    pub fn has_valid_cost(&self) -> bool {
        self.cost.total() >= 1 && !self.cost.has_negative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_validity() {
        let ok = Recipe::new(ProductType(0), ResourceVector::new([1, 0, 0, 0, 0, 0, 0, 0]), 1);
        assert!(ok.has_valid_cost());

        let empty = Recipe::new(ProductType(0), ResourceVector::ZERO, 1);
        assert!(!empty.has_valid_cost());

        // Sums to one but still asks for a negative quantity.
        let negative = Recipe::new(ProductType(0), ResourceVector::new([2, -1, 0, 0, 0, 0, 0, 0]), 1);
        assert!(!negative.has_valid_cost());
    }
}
