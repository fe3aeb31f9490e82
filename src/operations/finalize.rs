use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::error::{ModelError, Result};
use crate::geometry::surface::{BoundaryCondition, Surface};
use crate::model::{Cell, Fill, Geometry, LatticeId, Namespace, RectLattice, UniverseId};

/// Validates a geometry and collects what will be written out.
///
/// Walks the universe hierarchy depth-first from the root, following
/// universe and lattice fills, and checks that every reachable cell has a
/// region and a fill, that every referenced surface, material, universe and
/// lattice is registered, and that no universe contains itself.
///
/// Cells outside the hierarchy are left out with a warning and are not
/// checked, so an unreachable cell without a region or with a dangling fill
/// does not fail finalization.
pub struct Finalize<'a> {
    geometry: &'a Geometry,
}

impl<'a> Finalize<'a> {
    /// Creates a new `Finalize` operation.
    #[must_use]
    pub fn new(geometry: &'a Geometry) -> Self {
        Self { geometry }
    }

    /// Executes the validation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IncompleteCell`], [`ModelError::CyclicUniverse`]
    /// or [`ModelError::DanglingReference`] for the first problem found.
    pub fn execute(&self) -> Result<FinalizedGeometry<'a>> {
        let geometry = self.geometry;
        let root = geometry.root_universe();

        let mut members: HashMap<UniverseId, Vec<&'a Cell>> = HashMap::new();
        for cell in geometry.cells() {
            members
                .entry(cell.placement().unwrap_or(root))
                .or_default()
                .push(cell);
        }

        let mut walk = Walk {
            geometry,
            members,
            path: Vec::new(),
            done: HashSet::new(),
            universes: HashSet::new(),
            lattices: HashSet::new(),
        };
        walk.universe(root)?;

        let cells: Vec<&'a Cell> = geometry
            .cells()
            .filter(|c| walk.universes.contains(&c.placement().unwrap_or(root)))
            .collect();
        for cell in geometry.cells() {
            if !walk.universes.contains(&cell.placement().unwrap_or(root)) {
                warn!(
                    cell = cell.id().get(),
                    "cell is not reachable from the root universe and will not be written"
                );
            }
        }
        if cells.is_empty() {
            warn!(root = root.get(), "root universe has no cells");
        }

        let surfaces = referenced_surfaces(geometry, &cells)?;
        let lattices: Vec<&'a RectLattice> = geometry
            .lattices()
            .filter(|l| walk.lattices.contains(&l.id()))
            .collect();

        info!(
            cells = cells.len(),
            surfaces = surfaces.len(),
            universes = walk.universes.len(),
            lattices = lattices.len(),
            "finalized geometry"
        );

        Ok(FinalizedGeometry {
            root,
            cells,
            lattices,
            surfaces,
        })
    }
}

/// A validated geometry, reduced to what is reachable from the root.
///
/// Every list is in registration order.
#[derive(Debug)]
pub struct FinalizedGeometry<'a> {
    root: UniverseId,
    cells: Vec<&'a Cell>,
    lattices: Vec<&'a RectLattice>,
    surfaces: Vec<&'a Surface>,
}

impl<'a> FinalizedGeometry<'a> {
    /// Cells reachable from the root universe.
    #[must_use]
    pub fn cells(&self) -> &[&'a Cell] {
        &self.cells
    }

    /// Lattices reachable from the root universe.
    #[must_use]
    pub fn lattices(&self) -> &[&'a RectLattice] {
        &self.lattices
    }

    /// Surfaces referenced by the reachable cells, periodic partners
    /// included.
    #[must_use]
    pub fn surfaces(&self) -> &[&'a Surface] {
        &self.surfaces
    }

    /// Universe a finalized cell belongs to.
    #[must_use]
    pub fn owner(&self, cell: &Cell) -> UniverseId {
        cell.placement().unwrap_or(self.root)
    }
}

impl Geometry {
    /// Validates the geometry. Shorthand for [`Finalize`].
    ///
    /// # Errors
    ///
    /// See [`Finalize::execute`].
    pub fn finalize(&self) -> Result<FinalizedGeometry<'_>> {
        Finalize::new(self).execute()
    }
}

struct Walk<'a> {
    geometry: &'a Geometry,
    members: HashMap<UniverseId, Vec<&'a Cell>>,
    /// Universe-namespace ids on the current DFS path.
    path: Vec<u32>,
    done: HashSet<u32>,
    universes: HashSet<UniverseId>,
    lattices: HashSet<LatticeId>,
}

impl<'a> Walk<'a> {
    /// Pushes `id` on the path. Returns `false` if it was fully visited
    /// already.
    fn enter(&mut self, id: u32) -> Result<bool> {
        if self.path.contains(&id) {
            let mut path = self.path.clone();
            path.push(id);
            return Err(ModelError::CyclicUniverse { path }.into());
        }
        if self.done.contains(&id) {
            return Ok(false);
        }
        self.path.push(id);
        Ok(true)
    }

    fn leave(&mut self, id: u32) {
        self.path.pop();
        self.done.insert(id);
    }

    fn universe(&mut self, id: UniverseId) -> Result<()> {
        if !self.enter(id.get())? {
            return Ok(());
        }
        self.universes.insert(id);
        let cells = self.members.get(&id).cloned().unwrap_or_default();
        for cell in cells {
            self.cell(cell)?;
        }
        self.leave(id.get());
        Ok(())
    }

    fn lattice(&mut self, id: LatticeId) -> Result<()> {
        if !self.enter(id.get())? {
            return Ok(());
        }
        self.lattices.insert(id);
        for child in self.geometry.lattice(id)?.children() {
            if !self.geometry.has_universe(child) {
                return Err(dangling(Namespace::Universe, child.get(), format!("lattice {id}")));
            }
            self.universe(child)?;
        }
        self.leave(id.get());
        Ok(())
    }

    fn cell(&mut self, cell: &'a Cell) -> Result<()> {
        let id = cell.id();
        let region = cell.region().ok_or(ModelError::IncompleteCell {
            cell: id.get(),
            missing: "region",
        })?;
        let fill = cell.fill().ok_or(ModelError::IncompleteCell {
            cell: id.get(),
            missing: "fill",
        })?;

        if let Some(missing) = region
            .surface_ids()
            .into_iter()
            .find(|s| !self.geometry.surfaces().contains(*s))
        {
            return Err(dangling(Namespace::Surface, missing.get(), format!("cell {id}")));
        }

        match fill {
            Fill::Void => Ok(()),
            Fill::Material(m) if self.geometry.has_material(m) => Ok(()),
            Fill::Material(m) => Err(dangling(Namespace::Material, m.get(), format!("cell {id}"))),
            Fill::Universe(u) if self.geometry.has_universe(u) => self.universe(u),
            Fill::Universe(u) => Err(dangling(Namespace::Universe, u.get(), format!("cell {id}"))),
            Fill::Lattice(l) if self.geometry.has_lattice(l) => self.lattice(l),
            Fill::Lattice(l) => Err(dangling(Namespace::Universe, l.get(), format!("cell {id}"))),
        }
    }
}

/// Surfaces used by `cells`, closed over periodic partners, in registration
/// order.
fn referenced_surfaces<'a>(geometry: &'a Geometry, cells: &[&'a Cell]) -> Result<Vec<&'a Surface>> {
    let registry = geometry.surfaces();
    let mut used = HashSet::new();
    let mut pending = Vec::new();
    for cell in cells {
        if let Some(region) = cell.region() {
            region.visit_leaves(&mut |h| {
                if used.insert(h.surface) {
                    pending.push(h.surface);
                }
            });
        }
    }
    while let Some(id) = pending.pop() {
        if let BoundaryCondition::Periodic { partner } = registry.surface(id)?.boundary() {
            if !registry.contains(partner) {
                return Err(dangling(Namespace::Surface, partner.get(), format!("surface {id}")));
            }
            if used.insert(partner) {
                pending.push(partner);
            }
        }
    }
    Ok(registry.iter().filter(|s| used.contains(&s.id())).collect())
}

fn dangling(namespace: Namespace, id: u32, referrer: String) -> crate::error::CsgError {
    ModelError::DanglingReference {
        namespace,
        id,
        referrer,
    }
    .into()
}
