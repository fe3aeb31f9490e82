//! Boolean region expressions over surface half-spaces.
//!
//! A [`Region`] only references surfaces by id. Trees built through the
//! combinators in [`algebra`] are canonical: intersections and unions are
//! flattened, complements of half-spaces are folded into the opposite
//! half-space, and double complements cancel.

pub mod algebra;
mod expression;

pub use algebra::{all_of, any_of, complement, intersect, union};
pub use expression::RegionStyle;

use std::collections::HashSet;

use crate::error::Result;
use crate::geometry::surface::SurfaceRegistry;
use crate::math::Point3;
use crate::model::ids::SurfaceId;

/// Side of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    /// `f(p) > 0`.
    Positive,
    /// `f(p) < 0`.
    Negative,
}

impl Sense {
    /// The opposite side.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// One side of a surface; the leaf of a region expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Halfspace {
    pub surface: SurfaceId,
    pub sense: Sense,
}

impl Halfspace {
    /// Creates a new half-space.
    #[must_use]
    pub fn new(surface: SurfaceId, sense: Sense) -> Self {
        Self { surface, sense }
    }

    /// The half-space on the other side of the same surface.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            surface: self.surface,
            sense: self.sense.flip(),
        }
    }
}

/// A boolean expression tree over half-spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    Leaf(Halfspace),
    /// At least two operands when built through the combinators.
    Intersection(Vec<Region>),
    /// At least two operands when built through the combinators.
    Union(Vec<Region>),
    Complement(Box<Region>),
}

impl Region {
    /// The half-space of `surface` on side `sense`.
    #[must_use]
    pub fn half_space(surface: SurfaceId, sense: Sense) -> Self {
        Self::Leaf(Halfspace::new(surface, sense))
    }

    /// The positive half-space of `surface`.
    #[must_use]
    pub fn positive(surface: SurfaceId) -> Self {
        Self::half_space(surface, Sense::Positive)
    }

    /// The negative half-space of `surface`.
    #[must_use]
    pub fn negative(surface: SurfaceId) -> Self {
        Self::half_space(surface, Sense::Negative)
    }

    /// See [`algebra::intersect`].
    #[must_use]
    pub fn intersect(self, other: Region) -> Self {
        intersect(self, other)
    }

    /// See [`algebra::union`].
    #[must_use]
    pub fn union(self, other: Region) -> Self {
        union(self, other)
    }

    /// See [`algebra::complement`].
    #[must_use]
    pub fn complement(self) -> Self {
        complement(self)
    }

    /// Returns `true` for a single half-space.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Surfaces referenced by the expression, in first-occurrence order.
    #[must_use]
    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.visit_leaves(&mut |h| {
            if seen.insert(h.surface) {
                out.push(h.surface);
            }
        });
        out
    }

    /// Calls `f` on every leaf, left to right.
    pub fn visit_leaves(&self, f: &mut impl FnMut(&Halfspace)) {
        match self {
            Self::Leaf(h) => f(h),
            Self::Intersection(children) | Self::Union(children) => {
                for child in children {
                    child.visit_leaves(f);
                }
            }
            Self::Complement(inner) => inner.visit_leaves(f),
        }
    }

    /// Tests whether `point` lies inside the region.
    ///
    /// Points exactly on a bounding surface belong to neither side.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression references a surface that is not
    /// in `surfaces`.
    pub fn contains(&self, point: &Point3, surfaces: &SurfaceRegistry) -> Result<bool> {
        match self {
            Self::Leaf(h) => {
                let value = surfaces.surface(h.surface)?.evaluate(point);
                Ok(match h.sense {
                    Sense::Positive => value > 0.0,
                    Sense::Negative => value < 0.0,
                })
            }
            Self::Intersection(children) => {
                for child in children {
                    if !child.contains(point, surfaces)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Union(children) => {
                for child in children {
                    if child.contains(point, surfaces)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Complement(inner) => Ok(!inner.contains(point, surfaces)?),
        }
    }
}

impl std::ops::BitAnd for Region {
    type Output = Region;

    fn bitand(self, rhs: Region) -> Region {
        intersect(self, rhs)
    }
}

impl std::ops::BitOr for Region {
    type Output = Region;

    fn bitor(self, rhs: Region) -> Region {
        union(self, rhs)
    }
}

impl std::ops::Not for Region {
    type Output = Region;

    fn not(self) -> Region {
        complement(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::surface::{AxisCylinder, AxisPlane};

    fn pin_surfaces() -> (SurfaceRegistry, SurfaceId, SurfaceId) {
        let mut reg = SurfaceRegistry::default();
        let fuel = reg.add(AxisCylinder::z(0.0, 0.0, 0.39218).unwrap()).unwrap();
        let clad = reg.add(AxisCylinder::z(0.0, 0.0, 0.40005).unwrap()).unwrap();
        (reg, fuel, clad)
    }

    #[test]
    fn annulus_contains() {
        let (reg, fuel, clad) = pin_surfaces();
        let gap = Region::positive(fuel) & Region::negative(clad);
        assert!(gap.contains(&Point3::new(0.395, 0.0, 0.0), &reg).unwrap());
        assert!(!gap.contains(&Point3::new(0.1, 0.0, 0.0), &reg).unwrap());
        assert!(!gap.contains(&Point3::new(1.0, 0.0, 0.0), &reg).unwrap());
    }

    #[test]
    fn union_and_complement_contains() {
        let (reg, fuel, clad) = pin_surfaces();
        let outside_gap = !(Region::positive(fuel) & Region::negative(clad));
        assert!(outside_gap.contains(&Point3::new(0.1, 0.0, 0.0), &reg).unwrap());
        assert!(!outside_gap.contains(&Point3::new(0.395, 0.0, 0.0), &reg).unwrap());

        let either = Region::negative(fuel) | Region::positive(clad);
        assert!(either.contains(&Point3::new(0.1, 0.0, 0.0), &reg).unwrap());
        assert!(!either.contains(&Point3::new(0.395, 0.0, 0.0), &reg).unwrap());
    }

    #[test]
    fn contains_reports_unknown_surface() {
        let reg = SurfaceRegistry::default();
        let r = Region::negative(SurfaceId(3));
        assert!(r.contains(&Point3::origin(), &reg).is_err());
    }

    #[test]
    fn surface_ids_in_first_occurrence_order() {
        let mut reg = SurfaceRegistry::default();
        let a = reg.add(AxisPlane::x(0.0).unwrap()).unwrap();
        let b = reg.add(AxisPlane::y(0.0).unwrap()).unwrap();
        let r = (Region::positive(b) | Region::negative(a)) & Region::negative(b);
        assert_eq!(r.surface_ids(), vec![b, a]);
    }
}
