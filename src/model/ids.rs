use std::collections::BTreeSet;
use std::fmt;

use crate::error::IdError;

/// Default first automatically assigned id in every namespace.
///
/// Keeps generated ids clear of the small ids users tend to pick by hand.
pub const DEFAULT_AUTO_ID_START: u32 = 10_000;

/// The independent identifier namespaces of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Surface,
    Cell,
    Material,
    /// Shared by universes and lattices.
    Universe,
}

impl Namespace {
    /// Smallest id the namespace accepts.
    ///
    /// Surface, cell and material ids are positive. Universe ids may be 0,
    /// the conventional root universe.
    #[must_use]
    pub fn min_id(self) -> u32 {
        match self {
            Self::Universe => 0,
            Self::Surface | Self::Cell | Self::Material => 1,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Surface => "surface",
            Self::Cell => "cell",
            Self::Material => "material",
            Self::Universe => "universe",
        })
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $namespace:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Namespace this id is allocated from.
            pub const NAMESPACE: Namespace = $namespace;

            /// Returns the raw integer id.
            #[must_use]
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }
    };
}

entity_id! {
    /// Identifier of an analytic surface.
    SurfaceId => Namespace::Surface
}

entity_id! {
    /// Identifier of a cell.
    CellId => Namespace::Cell
}

entity_id! {
    /// Identifier of a material used as a cell fill.
    MaterialId => Namespace::Material
}

entity_id! {
    /// Identifier of a universe.
    UniverseId => Namespace::Universe
}

entity_id! {
    /// Identifier of a lattice. Lattices share the universe namespace.
    LatticeId => Namespace::Universe
}

/// Hands out and tracks the ids of a single namespace.
///
/// Explicit ids are reserved with [`reserve`](Self::reserve). Automatic ids
/// come from [`next_auto`](Self::next_auto), which returns
/// `max(high_water + 1, auto_start)` where `high_water` is the largest id
/// reserved or assigned so far. Automatic ids are therefore strictly
/// increasing and can never hit an id that was reserved earlier.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    namespace: Namespace,
    reserved: BTreeSet<u32>,
    high_water: Option<u32>,
    auto_start: u32,
}

impl IdAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new(namespace: Namespace, auto_start: u32) -> Self {
        Self {
            namespace,
            reserved: BTreeSet::new(),
            high_water: None,
            auto_start: auto_start.max(namespace.min_id()),
        }
    }

    /// Creates an allocator with `id` already reserved.
    #[must_use]
    pub fn with_reserved(namespace: Namespace, auto_start: u32, id: u32) -> Self {
        let mut allocator = Self::new(namespace, auto_start);
        allocator.insert(id);
        allocator
    }

    /// Returns the namespace served by this allocator.
    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Reserves an explicitly chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::NonPositive`] if the namespace does not accept
    /// `id`, or [`IdError::DuplicateId`] if the id is already reserved.
    pub fn reserve(&mut self, id: u32) -> Result<(), IdError> {
        if id < self.namespace.min_id() {
            return Err(IdError::NonPositive {
                namespace: self.namespace,
                id,
            });
        }
        if self.reserved.contains(&id) {
            return Err(IdError::DuplicateId {
                namespace: self.namespace,
                id,
            });
        }
        self.insert(id);
        Ok(())
    }

    /// Assigns and reserves the next automatic id.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Exhausted`] once the id space above the high-water
    /// mark is used up.
    pub fn next_auto(&mut self) -> Result<u32, IdError> {
        let id = match self.high_water {
            None => self.auto_start,
            Some(high) => high
                .checked_add(1)
                .ok_or(IdError::Exhausted {
                    namespace: self.namespace,
                })?
                .max(self.auto_start),
        };
        self.insert(id);
        Ok(id)
    }

    /// Reserves `explicit` if given, otherwise assigns an automatic id.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve) and [`next_auto`](Self::next_auto).
    pub fn assign(&mut self, explicit: Option<u32>) -> Result<u32, IdError> {
        match explicit {
            Some(id) => self.reserve(id).map(|()| id),
            None => self.next_auto(),
        }
    }

    /// Returns `true` if `id` is reserved.
    #[must_use]
    pub fn is_reserved(&self, id: u32) -> bool {
        self.reserved.contains(&id)
    }

    /// Number of reserved ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    /// Returns `true` if nothing has been reserved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    fn insert(&mut self, id: u32) {
        self.reserved.insert(id);
        self.high_water = Some(self.high_water.map_or(id, |high| high.max(id)));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn surfaces() -> IdAllocator {
        IdAllocator::new(Namespace::Surface, DEFAULT_AUTO_ID_START)
    }

    #[test]
    fn auto_ids_start_at_offset() {
        let mut ids = surfaces();
        assert_eq!(ids.next_auto().unwrap(), 10_000);
        assert_eq!(ids.next_auto().unwrap(), 10_001);
    }

    #[test]
    fn low_explicit_ids_do_not_shift_auto_range() {
        let mut ids = surfaces();
        ids.reserve(1).unwrap();
        ids.reserve(4).unwrap();
        assert_eq!(ids.next_auto().unwrap(), 10_000);
    }

    #[test]
    fn auto_ids_skip_past_explicit_high_ids() {
        let mut ids = surfaces();
        assert_eq!(ids.next_auto().unwrap(), 10_000);
        ids.reserve(10_005).unwrap();
        assert_eq!(ids.next_auto().unwrap(), 10_006);
    }

    #[test]
    fn duplicate_reservation_fails() {
        let mut ids = surfaces();
        ids.reserve(7).unwrap();
        let err = ids.reserve(7).unwrap_err();
        assert!(matches!(
            err,
            IdError::DuplicateId {
                namespace: Namespace::Surface,
                id: 7
            }
        ));
    }

    #[test]
    fn reserving_an_auto_id_fails() {
        let mut ids = surfaces();
        let auto = ids.next_auto().unwrap();
        assert!(ids.reserve(auto).is_err());
    }

    #[test]
    fn interleaved_registration_never_collides() {
        // Deterministic pseudo-random interleaving of explicit and automatic ids.
        let mut ids = surfaces();
        let mut seen = BTreeSet::new();
        let mut state: u32 = 12_345;
        for _ in 0..2_000 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = if state % 3 == 0 {
                let candidate = (state >> 8) % 20_000 + 1;
                match ids.reserve(candidate) {
                    Ok(()) => candidate,
                    Err(_) => {
                        assert!(seen.contains(&candidate));
                        continue;
                    }
                }
            } else {
                ids.next_auto().unwrap()
            };
            assert!(seen.insert(id), "id {id} handed out twice");
        }
        assert_eq!(seen.len(), ids.len());
    }

    #[test]
    fn exhausted_namespace_reports_error() {
        let mut ids = surfaces();
        ids.reserve(u32::MAX).unwrap();
        assert!(matches!(
            ids.next_auto(),
            Err(IdError::Exhausted { .. })
        ));
    }

    #[test]
    fn zero_is_rejected_outside_universe_namespace() {
        for namespace in [Namespace::Surface, Namespace::Cell, Namespace::Material] {
            let mut ids = IdAllocator::new(namespace, DEFAULT_AUTO_ID_START);
            assert!(matches!(
                ids.reserve(0),
                Err(IdError::NonPositive { id: 0, .. })
            ));
            assert!(ids.is_empty());
        }
        let mut universes = IdAllocator::new(Namespace::Universe, DEFAULT_AUTO_ID_START);
        universes.reserve(0).unwrap();
    }

    #[test]
    fn zero_auto_start_is_raised_to_minimum() {
        let mut ids = IdAllocator::new(Namespace::Surface, 0);
        assert_eq!(ids.next_auto().unwrap(), 1);
    }

    #[test]
    fn assign_prefers_explicit_id() {
        let mut ids = IdAllocator::with_reserved(Namespace::Universe, 100, 0);
        assert_eq!(ids.assign(Some(3)).unwrap(), 3);
        assert_eq!(ids.assign(None).unwrap(), 100);
        assert!(ids.assign(Some(0)).is_err());
    }

    #[test]
    fn id_display_is_decimal() {
        assert_eq!(SurfaceId(10_000).to_string(), "10000");
        assert_eq!(LatticeId::NAMESPACE, Namespace::Universe);
    }
}
