pub mod cell;
pub mod ids;
pub mod lattice;
pub mod material;
pub mod universe;

pub use cell::{Cell, CellDef, Fill};
pub use ids::{CellId, IdAllocator, LatticeId, MaterialId, Namespace, SurfaceId, UniverseId};
pub use lattice::{LatticeDef, RectLattice};
pub use material::Material;
pub use universe::Universe;

use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::geometry::region::Region;
use crate::geometry::surface::{SurfaceDef, SurfaceRegistry};
use ids::DEFAULT_AUTO_ID_START;

slotmap::new_key_type! {
    struct CellKey;
    struct UniverseKey;
    struct LatticeKey;
    struct MaterialKey;
}

/// Settings for building a [`Geometry`].
#[derive(Debug, Clone, Copy)]
pub struct GeometryConfig {
    /// First automatically assigned id, shared by all namespaces.
    pub auto_id_start: u32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            auto_id_start: DEFAULT_AUTO_ID_START,
        }
    }
}

/// Central arena that owns a complete geometry description.
///
/// Surfaces, cells, universes, lattices and material references are stored
/// by value and refer to each other through their integer ids, so the
/// universe hierarchy can contain reference cycles that
/// [`finalize`](Self::finalize) detects instead of ownership cycles.
///
/// Each geometry carries its own id namespaces; building a second geometry
/// starts from fresh allocators.
#[derive(Debug, Clone)]
pub struct Geometry {
    root: UniverseId,
    surfaces: SurfaceRegistry,
    cells: SlotMap<CellKey, Cell>,
    cell_index: HashMap<CellId, CellKey>,
    cell_ids: IdAllocator,
    universes: SlotMap<UniverseKey, Universe>,
    universe_index: HashMap<UniverseId, UniverseKey>,
    lattices: SlotMap<LatticeKey, RectLattice>,
    lattice_index: HashMap<LatticeId, LatticeKey>,
    universe_ids: IdAllocator,
    materials: SlotMap<MaterialKey, Material>,
    material_index: HashMap<MaterialId, MaterialKey>,
    material_ids: IdAllocator,
}

impl Geometry {
    /// Creates an empty geometry whose root universe has id `root_universe`.
    #[must_use]
    pub fn new(root_universe: u32) -> Self {
        Self::with_config(root_universe, GeometryConfig::default())
    }

    /// Creates an empty geometry with custom settings.
    #[must_use]
    pub fn with_config(root_universe: u32, config: GeometryConfig) -> Self {
        let start = config.auto_id_start;
        let root = UniverseId(root_universe);
        let mut universes = SlotMap::with_key();
        let mut universe_index = HashMap::new();
        let key = universes.insert(Universe {
            id: root,
            name: None,
            cells: Vec::new(),
        });
        universe_index.insert(root, key);
        Self {
            root,
            surfaces: SurfaceRegistry::new(start),
            cells: SlotMap::with_key(),
            cell_index: HashMap::new(),
            cell_ids: IdAllocator::new(Namespace::Cell, start),
            universes,
            universe_index,
            lattices: SlotMap::with_key(),
            lattice_index: HashMap::new(),
            universe_ids: IdAllocator::with_reserved(Namespace::Universe, start, root_universe),
            materials: SlotMap::with_key(),
            material_index: HashMap::new(),
            material_ids: IdAllocator::new(Namespace::Material, start),
        }
    }

    /// Id of the root universe.
    #[must_use]
    pub fn root_universe(&self) -> UniverseId {
        self.root
    }

    // --- Surface operations ---

    /// Read access to the surface registry.
    #[must_use]
    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    /// Write access to the surface registry.
    pub fn surfaces_mut(&mut self) -> &mut SurfaceRegistry {
        &mut self.surfaces
    }

    /// Registers a surface. Shorthand for
    /// [`SurfaceRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns an error if the requested id is already taken.
    pub fn add_surface(&mut self, def: impl Into<SurfaceDef>) -> Result<SurfaceId> {
        self.surfaces.register(def.into())
    }

    // --- Material operations ---

    /// Registers a material reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested id is already taken.
    pub fn register_material(&mut self, id: Option<u32>, name: Option<&str>) -> Result<MaterialId> {
        let id = MaterialId(self.material_ids.assign(id)?);
        debug!(id = id.get(), name, "registered material");
        let key = self.materials.insert(Material {
            id,
            name: name.map(str::to_owned),
        });
        self.material_index.insert(id, key);
        Ok(id)
    }

    /// Returns the material with the given id, if registered.
    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.material_index
            .get(&id)
            .and_then(|key| self.materials.get(*key))
    }

    /// Iterates over materials in registration order.
    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    // --- Cell operations ---

    /// Creates a cell. It belongs to the root universe until placed
    /// elsewhere with [`add_cells`](Self::add_cells).
    ///
    /// # Errors
    ///
    /// Returns an error if the requested id is already taken.
    pub fn create_cell(&mut self, def: CellDef) -> Result<CellId> {
        let CellDef {
            id,
            name,
            region,
            fill,
        } = def;
        let id = CellId(self.cell_ids.assign(id)?);
        debug!(id = id.get(), name = name.as_deref(), "created cell");
        let key = self.cells.insert(Cell {
            id,
            name,
            region,
            fill,
            universe: None,
        });
        self.cell_index.insert(id, key);
        Ok(id)
    }

    /// Returns the cell with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownEntity`] if no such cell exists.
    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        self.cell_index
            .get(&id)
            .and_then(|key| self.cells.get(*key))
            .ok_or_else(|| unknown(Namespace::Cell, id.get()))
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        self.cell_index
            .get(&id)
            .and_then(|key| self.cells.get_mut(*key))
            .ok_or_else(|| unknown(Namespace::Cell, id.get()))
    }

    /// Sets or replaces the region of a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn set_region(&mut self, cell: CellId, region: Region) -> Result<()> {
        self.cell_mut(cell)?.region = Some(region);
        Ok(())
    }

    /// Sets or replaces the fill of a cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn set_fill(&mut self, cell: CellId, fill: impl Into<Fill>) -> Result<()> {
        self.cell_mut(cell)?.fill = Some(fill.into());
        Ok(())
    }

    /// Iterates over all cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        // No removal API, so slot order is creation order.
        self.cells.values()
    }

    /// Universe a cell belongs to: its explicit placement, or the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell does not exist.
    pub fn owner_of(&self, cell: CellId) -> Result<UniverseId> {
        Ok(self.cell(cell)?.universe.unwrap_or(self.root))
    }

    // --- Universe operations ---

    /// Creates an empty universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested id is already taken by a universe
    /// or a lattice.
    pub fn create_universe(&mut self, id: Option<u32>, name: Option<&str>) -> Result<UniverseId> {
        let id = UniverseId(self.universe_ids.assign(id)?);
        debug!(id = id.get(), name, "created universe");
        let key = self.universes.insert(Universe {
            id,
            name: name.map(str::to_owned),
            cells: Vec::new(),
        });
        self.universe_index.insert(id, key);
        Ok(id)
    }

    /// Returns the universe with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownEntity`] if no such universe exists.
    pub fn universe(&self, id: UniverseId) -> Result<&Universe> {
        self.universe_index
            .get(&id)
            .and_then(|key| self.universes.get(*key))
            .ok_or_else(|| unknown(Namespace::Universe, id.get()))
    }

    /// Iterates over universes in creation order, root first.
    pub fn universes(&self) -> impl Iterator<Item = &Universe> {
        self.universes.values()
    }

    /// Places `cells` in `universe`.
    ///
    /// Either every cell is placed or none is. Adding a cell to the
    /// universe it is already in does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CellAlreadyAssigned`] if a cell was already
    /// placed in a different universe, or [`ModelError::UnknownEntity`] if
    /// the universe or a cell does not exist.
    pub fn add_cells(&mut self, universe: UniverseId, cells: &[CellId]) -> Result<()> {
        let ukey = *self
            .universe_index
            .get(&universe)
            .ok_or_else(|| unknown(Namespace::Universe, universe.get()))?;

        let mut pending = Vec::with_capacity(cells.len());
        for &id in cells {
            let cell = self.cell(id)?;
            match cell.universe {
                Some(current) if current == universe => {}
                Some(current) => {
                    return Err(ModelError::CellAlreadyAssigned {
                        cell: id.get(),
                        current: current.get(),
                        requested: universe.get(),
                    }
                    .into());
                }
                None if !pending.contains(&id) => pending.push(id),
                None => {}
            }
        }

        for &id in &pending {
            self.cell_mut(id)?.universe = Some(universe);
        }
        if let Some(u) = self.universes.get_mut(ukey) {
            u.cells.extend_from_slice(&pending);
        }
        debug!(universe = universe.get(), added = pending.len(), "placed cells");
        Ok(())
    }

    /// Places a single cell in `universe`. See [`add_cells`](Self::add_cells).
    ///
    /// # Errors
    ///
    /// See [`add_cells`](Self::add_cells).
    pub fn add_cell(&mut self, universe: UniverseId, cell: CellId) -> Result<()> {
        self.add_cells(universe, &[cell])
    }

    /// Cells belonging to `universe`, in creation order. For the root this
    /// includes cells that were never placed anywhere.
    #[must_use]
    pub fn universe_cells(&self, universe: UniverseId) -> Vec<&Cell> {
        self.cells()
            .filter(|c| c.universe.unwrap_or(self.root) == universe)
            .collect()
    }

    // --- Lattice operations ---

    /// Creates a rectangular lattice. Its id comes from the universe
    /// namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already taken or the grid is malformed.
    pub fn create_lattice(&mut self, def: LatticeDef) -> Result<LatticeId> {
        def.validate().map_err(|reason| {
            let label = def
                .id
                .map_or_else(|| def.name.clone().unwrap_or_default(), |id| id.to_string());
            ModelError::InvalidLattice(format!("{label}: {reason}"))
        })?;
        let LatticeDef {
            id,
            name,
            pitch,
            lower_left,
            rows,
            outer,
        } = def;
        let id = LatticeId(self.universe_ids.assign(id)?);
        debug!(
            id = id.get(),
            nx = rows.first().map_or(0, Vec::len),
            ny = rows.len(),
            "created lattice"
        );
        let key = self.lattices.insert(RectLattice {
            id,
            name,
            pitch,
            lower_left,
            rows,
            outer,
        });
        self.lattice_index.insert(id, key);
        Ok(id)
    }

    /// Returns the lattice with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownEntity`] if no such lattice exists.
    pub fn lattice(&self, id: LatticeId) -> Result<&RectLattice> {
        self.lattice_index
            .get(&id)
            .and_then(|key| self.lattices.get(*key))
            .ok_or_else(|| unknown(Namespace::Universe, id.get()))
    }

    /// Iterates over lattices in creation order.
    pub fn lattices(&self) -> impl Iterator<Item = &RectLattice> {
        self.lattices.values()
    }

    pub(crate) fn has_universe(&self, id: UniverseId) -> bool {
        self.universe_index.contains_key(&id)
    }

    pub(crate) fn has_lattice(&self, id: LatticeId) -> bool {
        self.lattice_index.contains_key(&id)
    }

    pub(crate) fn has_material(&self, id: MaterialId) -> bool {
        self.material_index.contains_key(&id)
    }
}

fn unknown(namespace: Namespace, id: u32) -> crate::error::CsgError {
    ModelError::UnknownEntity { namespace, id }.into()
}
