use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::model::ids::{IdAllocator, Namespace, SurfaceId, DEFAULT_AUTO_ID_START};

use super::{BoundaryCondition, ImplicitSurface, Surface, SurfaceDef, SurfaceKind};

slotmap::new_key_type! {
    /// Arena key of a surface inside the registry.
    struct SurfaceKey;
}

/// Owns every surface of a geometry and their id namespace.
///
/// Surfaces are append-only. Iteration follows registration order.
#[derive(Debug, Clone)]
pub struct SurfaceRegistry {
    surfaces: SlotMap<SurfaceKey, Surface>,
    index: HashMap<SurfaceId, SurfaceKey>,
    ids: IdAllocator,
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_ID_START)
    }
}

impl SurfaceRegistry {
    /// Creates an empty registry whose automatic ids start at `auto_start`.
    #[must_use]
    pub fn new(auto_start: u32) -> Self {
        Self {
            surfaces: SlotMap::with_key(),
            index: HashMap::new(),
            ids: IdAllocator::new(Namespace::Surface, auto_start),
        }
    }

    /// Registers a surface and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::DuplicateId`](crate::error::IdError::DuplicateId)
    /// if the requested id is already taken, or
    /// [`IdError::NonPositive`](crate::error::IdError::NonPositive) for id 0.
    pub fn register(&mut self, def: SurfaceDef) -> Result<SurfaceId> {
        let SurfaceDef {
            kind,
            boundary,
            id,
            name,
        } = def;
        let id = SurfaceId(self.ids.assign(id)?);
        debug!(
            id = id.get(),
            kind = kind.type_tag(),
            boundary = boundary.as_str(),
            "registered surface"
        );
        let key = self.surfaces.insert(Surface {
            id,
            kind,
            boundary,
            name,
        });
        self.index.insert(id, key);
        Ok(id)
    }

    /// Registers a transmissive surface with an automatic id.
    ///
    /// # Errors
    ///
    /// Returns an error only if the automatic id space is exhausted.
    pub fn add(&mut self, kind: impl Into<SurfaceKind>) -> Result<SurfaceId> {
        self.register(SurfaceDef::new(kind))
    }

    /// Registers a surface from its type tag and raw coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag or coefficients are invalid, or the id
    /// is already taken.
    pub fn register_raw(
        &mut self,
        tag: &str,
        coefficients: &[f64],
        boundary: BoundaryCondition,
        id: Option<u32>,
    ) -> Result<SurfaceId> {
        let mut def = SurfaceDef::new(SurfaceKind::from_raw(tag, coefficients)?).boundary(boundary);
        if let Some(id) = id {
            def = def.id(id);
        }
        self.register(def)
    }

    /// Returns the surface with the given id, if registered.
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.index.get(&id).and_then(|key| self.surfaces.get(*key))
    }

    /// Returns the surface with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownEntity`] if no such surface exists.
    pub fn surface(&self, id: SurfaceId) -> Result<&Surface> {
        self.get(id).ok_or_else(|| {
            ModelError::UnknownEntity {
                namespace: Namespace::Surface,
                id: id.get(),
            }
            .into()
        })
    }

    /// Returns `true` if a surface with this id is registered.
    #[must_use]
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterates over surfaces in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        // No removal API, so slot order is registration order.
        self.surfaces.values()
    }

    /// Number of registered surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns `true` if no surface is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
