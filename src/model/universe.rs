use super::ids::{CellId, UniverseId};

/// A set of cells sharing one id.
#[derive(Debug, Clone)]
pub struct Universe {
    pub(super) id: UniverseId,
    pub(super) name: Option<String>,
    pub(super) cells: Vec<CellId>,
}

impl Universe {
    /// Returns the universe id.
    #[must_use]
    pub fn id(&self) -> UniverseId {
        self.id
    }

    /// Returns the optional name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Cells explicitly placed in this universe, in insertion order.
    ///
    /// Cells that were never placed anywhere belong to the root universe
    /// but are not listed here; see
    /// [`Geometry::universe_cells`](super::Geometry::universe_cells).
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }
}
