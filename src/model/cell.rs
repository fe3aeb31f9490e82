use crate::geometry::region::Region;

use super::ids::{CellId, LatticeId, MaterialId, UniverseId};

/// What occupies a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fill {
    /// A registered material.
    Material(MaterialId),
    /// Nothing at all.
    Void,
    /// A nested universe.
    Universe(UniverseId),
    /// A nested lattice.
    Lattice(LatticeId),
}

impl From<MaterialId> for Fill {
    fn from(id: MaterialId) -> Self {
        Self::Material(id)
    }
}

impl From<UniverseId> for Fill {
    fn from(id: UniverseId) -> Self {
        Self::Universe(id)
    }
}

impl From<LatticeId> for Fill {
    fn from(id: LatticeId) -> Self {
        Self::Lattice(id)
    }
}

/// A volume bounded by a region and filled with something.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(super) id: CellId,
    pub(super) name: Option<String>,
    pub(super) region: Option<Region>,
    pub(super) fill: Option<Fill>,
    pub(super) universe: Option<UniverseId>,
}

impl Cell {
    /// Returns the cell id.
    #[must_use]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Returns the optional name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the bounding region, if set.
    #[must_use]
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Returns the fill, if set.
    #[must_use]
    pub fn fill(&self) -> Option<Fill> {
        self.fill
    }

    /// Returns the universe the cell was explicitly placed in.
    ///
    /// `None` means the cell was never placed and belongs to the root
    /// universe.
    #[must_use]
    pub fn placement(&self) -> Option<UniverseId> {
        self.universe
    }
}

/// Creation request for a cell.
///
/// Defaults: automatic id, no name, no region, void fill.
#[derive(Debug, Clone)]
pub struct CellDef {
    pub(super) id: Option<u32>,
    pub(super) name: Option<String>,
    pub(super) region: Option<Region>,
    pub(super) fill: Option<Fill>,
}

impl Default for CellDef {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            region: None,
            fill: Some(Fill::Void),
        }
    }
}

impl CellDef {
    /// Same as [`CellDef::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests an explicit id.
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

    /// Sets the bounding region.
    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the fill.
    #[must_use]
    pub fn fill(mut self, fill: impl Into<Fill>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Leaves the fill unset; it must be provided before finalizing.
    #[must_use]
    pub fn unfilled(mut self) -> Self {
        self.fill = None;
        self
    }
}
