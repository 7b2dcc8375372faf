//! Footprint catalog: the physical shape of every structure.
//!
//! A footprint is a rectangular template of [`CellRole`]s plus an anchor
//! offset. Placing an entity at `(x, y)` puts template cell `(col, row)` at
//! world cell `(x - anchor.x + col, y - anchor.y + row)`.
//!
//! Machine templates (mine, conveyor, combiner, factory) are fixed tables
//! indexed by variant. Deposits and obstacles have caller-chosen sizes and
//! their templates are generated.

use crate::entity::EntityKind;
use crate::error::EntityError;
use crate::grid::GridPosition;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cell roles
// ---------------------------------------------------------------------------

/// What a single footprint cell does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellRole {
    /// Not part of the structure; other structures may use the cell.
    #[default]
    Empty,
    /// Solid part of the structure.
    Body,
    /// Receives resources from an adjacent outbound port.
    Inbound,
    /// Hands resources to an adjacent inbound port.
    Outbound,
}

impl CellRole {
    /// Decode a template marker: `' '`, `'O'`, `'+'`, `'-'`.
    const fn from_marker(marker: u8) -> Self {
        match marker {
            b'O' => CellRole::Body,
            b'+' => CellRole::Inbound,
            b'-' => CellRole::Outbound,
            _ => CellRole::Empty,
        }
    }

    /// The template marker for this role.
    pub fn marker(self) -> char {
        match self {
            CellRole::Empty => ' ',
            CellRole::Body => 'O',
            CellRole::Inbound => '+',
            CellRole::Outbound => '-',
        }
    }

    pub fn is_occupied(self) -> bool {
        self != CellRole::Empty
    }
}

/// Offset of the anchor cell from the template's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub const ORIGIN: Anchor = Anchor { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Catalog tables
// ---------------------------------------------------------------------------

/// A fixed family of templates sharing size and anchor.
#[derive(Debug)]
pub struct Template {
    pub width: u32,
    pub height: u32,
    pub anchor: Anchor,
    /// One row-major marker string per variant.
    pub variants: &'static [&'static str],
}

pub const MINE: Template = Template {
    width: 4,
    height: 4,
    anchor: Anchor::new(1, 1),
    variants: &[
        "     OO +OO-    ",
        " +   OO  OO  -  ",
        "    -OO+ OO     ",
        "  -  OO  OO   + ",
    ],
};

/// Variants 0-3 are short belts pointing east, south, west and north;
/// 4-7 are the long belts in the same order.
pub const CONVEYOR: Template = Template {
    width: 4,
    height: 4,
    anchor: Anchor::new(1, 1),
    variants: &[
        "    +O-         ",
        " +   O   -      ",
        "    -O+         ",
        " -   O   +      ",
        "    +OO-        ",
        " +   O   O   -  ",
        "    -OO+        ",
        " -   O   O   +  ",
    ],
};

pub const COMBINER: Template = Template {
    width: 3,
    height: 3,
    anchor: Anchor::new(1, 1),
    variants: &["+O +O-+O ", "+++OOO - ", " O+-O+ O+", " - OOO+++"],
};

/// Every factory shares one template; the variant selects the product.
pub const FACTORY: Template = Template {
    width: 5,
    height: 5,
    anchor: Anchor::ORIGIN,
    variants: &["++++++OOO++OOO++OOO++++++"],
};

/// Template table for a machine kind. `None` for deposits and obstacles.
pub fn template(kind: EntityKind) -> Option<&'static Template> {
    match kind {
        EntityKind::Mine => Some(&MINE),
        EntityKind::Conveyor => Some(&CONVEYOR),
        EntityKind::Combiner => Some(&COMBINER),
        EntityKind::Factory => Some(&FACTORY),
        EntityKind::Deposit | EntityKind::Obstacle => None,
    }
}

/// Number of valid subtypes for a kind. Deposits count resource subtypes,
/// factories product subtypes; obstacles have none.
pub fn variant_count(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Deposit => crate::id::RESOURCE_TYPES,
        EntityKind::Obstacle => 0,
        EntityKind::Mine => MINE.variants.len(),
        EntityKind::Conveyor => CONVEYOR.variants.len(),
        EntityKind::Combiner => COMBINER.variants.len(),
        EntityKind::Factory => crate::id::PRODUCT_TYPES,
    }
}

/// Check `variant` against the kind's range, returning it narrowed.
pub fn check_variant(kind: EntityKind, variant: i64) -> Result<u8, EntityError> {
    let count = variant_count(kind);
    match u8::try_from(variant) {
        Ok(v) if (v as usize) < count => Ok(v),
        _ => Err(EntityError::SubtypeOutOfRange {
            max: count.saturating_sub(1),
        }),
    }
}

/// Resolve the footprint of a machine kind and variant.
pub fn lookup(kind: EntityKind, variant: i64) -> Result<Footprint, EntityError> {
    let v = check_variant(kind, variant)?;
    let table = template(kind).ok_or(EntityError::GeneratedFootprint(kind))?;
    // Factories reuse their single template for every product variant.
    let markers = table
        .variants
        .get(v as usize)
        .or_else(|| table.variants.first())
        .ok_or(EntityError::GeneratedFootprint(kind))?;
    Ok(Footprint::from_markers(
        table.width,
        table.height,
        table.anchor,
        markers,
    ))
}

// ---------------------------------------------------------------------------
// Footprint
// ---------------------------------------------------------------------------

/// A resolved rectangular template of cell roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    width: u32,
    height: u32,
    anchor: Anchor,
    cells: Vec<CellRole>,
}

impl Footprint {
    fn from_markers(width: u32, height: u32, anchor: Anchor, markers: &str) -> Self {
        let cells = markers.bytes().map(CellRole::from_marker).collect();
        Self {
            width,
            height,
            anchor,
            cells,
        }
    }

    /// Deposit footprint: outbound border, body interior.
    pub fn hollow(width: u32, height: u32) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in 0..height {
            for col in 0..width {
                let border = col == 0 || row == 0 || col == width - 1 || row == height - 1;
                cells.push(if border {
                    CellRole::Outbound
                } else {
                    CellRole::Body
                });
            }
        }
        Self {
            width,
            height,
            anchor: Anchor::ORIGIN,
            cells,
        }
    }

    /// Obstacle footprint: body everywhere.
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            anchor: Anchor::ORIGIN,
            cells: vec![CellRole::Body; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Role of template cell `(col, row)`; `Empty` outside the template.
    pub fn role(&self, col: u32, row: u32) -> CellRole {
        if col >= self.width || row >= self.height {
            return CellRole::Empty;
        }
        self.cells
            .get((row * self.width + col) as usize)
            .copied()
            .unwrap_or_default()
    }

    /// World cells covered by the template when anchored at `position`,
    /// row-major, skipping empty cells.
    ///
    /// Coordinates saturate at the `i32` limits; such cells are always
    /// outside any grid.
    pub fn cells(&self, position: GridPosition) -> impl Iterator<Item = (GridPosition, CellRole)> + '_ {
        let ox = position.x.saturating_sub(self.anchor.x);
        let oy = position.y.saturating_sub(self.anchor.y);
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, role)| role.is_occupied())
            .map(move |(i, &role)| {
                let col = (i as u32 % width) as i32;
                let row = (i as u32 / width) as i32;
                (GridPosition::new(ox.saturating_add(col), oy.saturating_add(row)), role)
            })
    }

    /// Render the template as marker rows, one string per row.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|r| r.marker()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_matches_its_size() {
        for table in [&MINE, &CONVEYOR, &COMBINER, &FACTORY] {
            for markers in table.variants {
                assert_eq!(markers.len() as u32, table.width * table.height);
            }
        }
    }

    #[test]
    fn every_machine_variant_has_ports() {
        for kind in [EntityKind::Mine, EntityKind::Conveyor, EntityKind::Combiner] {
            for variant in 0..variant_count(kind) {
                let fp = lookup(kind, variant as i64).unwrap();
                let roles: Vec<_> = fp.cells(GridPosition::new(5, 5)).map(|(_, r)| r).collect();
                assert_eq!(
                    roles.iter().filter(|r| **r == CellRole::Outbound).count(),
                    1,
                    "{kind:?} variant {variant} should have exactly one outbound port"
                );
                assert!(roles.contains(&CellRole::Inbound));
            }
        }
    }

    #[test]
    fn conveyor_east_cells() {
        let fp = lookup(EntityKind::Conveyor, 0).unwrap();
        let cells: Vec<_> = fp.cells(GridPosition::new(2, 2)).collect();
        assert_eq!(
            cells,
            vec![
                (GridPosition::new(1, 2), CellRole::Inbound),
                (GridPosition::new(2, 2), CellRole::Body),
                (GridPosition::new(3, 2), CellRole::Outbound),
            ]
        );
    }

    #[test]
    fn cells_saturate_at_coordinate_limits() {
        let fp = Footprint::solid(2, 1);
        let cells: Vec<_> = fp.cells(GridPosition::new(i32::MAX, 0)).collect();
        assert_eq!(cells[1].0, GridPosition::new(i32::MAX, 0));

        let fp = lookup(EntityKind::Mine, 0).unwrap();
        assert!(
            fp.cells(GridPosition::new(i32::MIN, i32::MIN))
                .all(|(p, _)| p.x <= i32::MIN + 3 && p.y <= i32::MIN + 3)
        );
    }

    #[test]
    fn mine_anchor_offset() {
        let fp = lookup(EntityKind::Mine, 0).unwrap();
        assert_eq!(fp.anchor(), Anchor::new(1, 1));
        let cells: Vec<_> = fp.cells(GridPosition::new(4, 0)).collect();
        assert_eq!(cells[0], (GridPosition::new(4, 0), CellRole::Body));
        assert!(cells.contains(&(GridPosition::new(3, 1), CellRole::Inbound)));
        assert!(cells.contains(&(GridPosition::new(6, 1), CellRole::Outbound)));
    }

    #[test]
    fn factory_variants_share_template() {
        let a = lookup(EntityKind::Factory, 0).unwrap();
        let b = lookup(EntityKind::Factory, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.role(0, 0), CellRole::Inbound);
        assert_eq!(a.role(2, 2), CellRole::Body);
    }

    #[test]
    fn variant_out_of_range_names_bound() {
        let err = lookup(EntityKind::Mine, 4).unwrap_err();
        assert_eq!(err.to_string(), "Subtype must be between 0 and 3");
        let err = lookup(EntityKind::Conveyor, -1).unwrap_err();
        assert_eq!(err.to_string(), "Subtype must be between 0 and 7");
    }

    #[test]
    fn hollow_rectangle() {
        let fp = Footprint::hollow(3, 3);
        assert_eq!(fp.rows(), vec!["---", "-O-", "---"]);
        let fp = Footprint::hollow(1, 1);
        assert_eq!(fp.rows(), vec!["-"]);
    }

    #[test]
    fn solid_rectangle() {
        let fp = Footprint::solid(2, 3);
        assert_eq!(fp.cells(GridPosition::new(0, 0)).count(), 6);
        assert!(fp.cells(GridPosition::new(0, 0)).all(|(_, r)| r == CellRole::Body));
    }

    #[test]
    fn role_outside_template_is_empty() {
        let fp = Footprint::solid(2, 2);
        assert_eq!(fp.role(5, 0), CellRole::Empty);
    }
}
