use std::collections::HashSet;

use crate::error::{ModelError, Result};

use super::ids::{LatticeId, UniverseId};

/// A rectangular lattice of universes in the xy plane.
///
/// The grid is stored row by row, top row first, so it reads the way it is
/// printed. [`universe_at`](Self::universe_at) takes lattice indices counted
/// from the lower-left corner.
#[derive(Debug, Clone)]
pub struct RectLattice {
    pub(super) id: LatticeId,
    pub(super) name: Option<String>,
    pub(super) pitch: [f64; 2],
    pub(super) lower_left: [f64; 2],
    pub(super) rows: Vec<Vec<UniverseId>>,
    pub(super) outer: Option<UniverseId>,
}

impl RectLattice {
    /// Returns the lattice id.
    #[must_use]
    pub fn id(&self) -> LatticeId {
        self.id
    }

    /// Returns the optional name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Element width in x and y.
    #[must_use]
    pub fn pitch(&self) -> [f64; 2] {
        self.pitch
    }

    /// Coordinates of the lower-left corner.
    #[must_use]
    pub fn lower_left(&self) -> [f64; 2] {
        self.lower_left
    }

    /// Number of elements in x and y.
    #[must_use]
    pub fn dimension(&self) -> [usize; 2] {
        [self.rows.first().map_or(0, Vec::len), self.rows.len()]
    }

    /// Grid rows, top row first.
    #[must_use]
    pub fn rows(&self) -> &[Vec<UniverseId>] {
        &self.rows
    }

    /// Universe filling space outside the grid, if any.
    #[must_use]
    pub fn outer(&self) -> Option<UniverseId> {
        self.outer
    }

    /// Universe at lattice index `(ix, iy)`, counted from the lower-left
    /// element.
    #[must_use]
    pub fn universe_at(&self, ix: usize, iy: usize) -> Option<UniverseId> {
        let row = self.rows.len().checked_sub(iy.checked_add(1)?)?;
        self.rows.get(row)?.get(ix).copied()
    }

    /// Distinct universes referenced by the lattice, grid first (in reading
    /// order) and the outer universe last.
    #[must_use]
    pub fn children(&self) -> Vec<UniverseId> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .flatten()
            .copied()
            .chain(self.outer)
            .filter(|u| seen.insert(*u))
            .collect()
    }
}

/// Creation request for a [`RectLattice`].
#[derive(Debug, Clone)]
pub struct LatticeDef {
    pub(super) id: Option<u32>,
    pub(super) name: Option<String>,
    pub(super) pitch: [f64; 2],
    pub(super) lower_left: [f64; 2],
    pub(super) rows: Vec<Vec<UniverseId>>,
    pub(super) outer: Option<UniverseId>,
}

impl LatticeDef {
    /// A lattice with the given grid rows (top row first).
    #[must_use]
    pub fn new(pitch: [f64; 2], lower_left: [f64; 2], rows: Vec<Vec<UniverseId>>) -> Self {
        Self {
            id: None,
            name: None,
            pitch,
            lower_left,
            rows,
            outer: None,
        }
    }

    /// An `nx` by `ny` lattice with every element set to `universe`.
    #[must_use]
    pub fn uniform(
        pitch: [f64; 2],
        lower_left: [f64; 2],
        [nx, ny]: [usize; 2],
        universe: UniverseId,
    ) -> Self {
        Self::new(pitch, lower_left, vec![vec![universe; nx]; ny])
    }

    /// Requests an explicit id from the universe namespace.
    #[must_use]
    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets a descriptive name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the universe outside the grid.
    #[must_use]
    pub fn outer(mut self, universe: UniverseId) -> Self {
        self.outer = Some(universe);
        self
    }

    /// Replaces the element in grid row `row` (top row is 0), column `col`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidLattice`] if the position is outside the
    /// grid.
    pub fn set(&mut self, row: usize, col: usize, universe: UniverseId) -> Result<()> {
        let slot = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| {
                ModelError::InvalidLattice(format!("position ({row}, {col}) is outside the grid"))
            })?;
        *slot = universe;
        Ok(())
    }

    pub(super) fn validate(&self) -> std::result::Result<(), String> {
        let nx = self.rows.first().map_or(0, Vec::len);
        if nx == 0 {
            return Err("grid is empty".into());
        }
        if let Some((i, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != nx) {
            return Err(format!("row {i} has {} elements, expected {nx}", row.len()));
        }
        for (axis, value) in ["x", "y"].iter().zip(self.pitch) {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("pitch along {axis} must be positive, got {value}"));
            }
        }
        if self.lower_left.iter().any(|v| !v.is_finite()) {
            return Err("lower-left corner must be finite".into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn u(id: u32) -> UniverseId {
        UniverseId(id)
    }

    fn lattice(def: LatticeDef) -> RectLattice {
        RectLattice {
            id: LatticeId(9),
            name: def.name,
            pitch: def.pitch,
            lower_left: def.lower_left,
            rows: def.rows,
            outer: def.outer,
        }
    }

    #[test]
    fn universe_at_counts_from_bottom() {
        let def = LatticeDef::new(
            [1.0, 1.0],
            [-1.0, -1.0],
            vec![vec![u(1), u(2)], vec![u(3), u(4)]],
        );
        let lat = lattice(def);
        assert_eq!(lat.dimension(), [2, 2]);
        assert_eq!(lat.universe_at(0, 0), Some(u(3)));
        assert_eq!(lat.universe_at(1, 1), Some(u(2)));
        assert_eq!(lat.universe_at(2, 0), None);
        assert_eq!(lat.universe_at(0, 2), None);
        assert_eq!(lat.universe_at(0, usize::MAX), None);
        assert_eq!(lat.universe_at(usize::MAX, 0), None);
    }

    #[test]
    fn children_are_distinct_with_outer_last() {
        let mut def = LatticeDef::uniform([1.26, 1.26], [0.0, 0.0], [3, 3], u(1)).outer(u(7));
        def.set(1, 1, u(2)).unwrap();
        def.set(0, 2, u(1)).unwrap();
        let lat = lattice(def);
        assert_eq!(lat.children(), vec![u(1), u(2), u(7)]);
    }

    #[test]
    fn set_outside_grid_fails() {
        let mut def = LatticeDef::uniform([1.0, 1.0], [0.0, 0.0], [2, 2], u(1));
        assert!(def.set(2, 0, u(2)).is_err());
    }

    #[test]
    fn validation_rules() {
        assert!(LatticeDef::uniform([1.0, 1.0], [0.0, 0.0], [2, 3], u(1))
            .validate()
            .is_ok());
        assert!(LatticeDef::new([1.0, 1.0], [0.0, 0.0], vec![]).validate().is_err());
        assert!(LatticeDef::new([1.0, 1.0], [0.0, 0.0], vec![vec![u(1)], vec![u(1), u(2)]])
            .validate()
            .is_err());
        assert!(LatticeDef::uniform([0.0, 1.0], [0.0, 0.0], [2, 2], u(1))
            .validate()
            .is_err());
        assert!(LatticeDef::uniform([1.0, 1.0], [f64::NAN, 0.0], [2, 2], u(1))
            .validate()
            .is_err());
    }
}
