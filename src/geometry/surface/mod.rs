mod cone;
mod cylinder;
mod plane;
mod quadric;
mod registry;
mod sphere;
mod torus;

pub use cone::AxisCone;
pub use cylinder::AxisCylinder;
pub use plane::{AxisPlane, Plane};
pub use quadric::Quadric;
pub use registry::SurfaceRegistry;
pub use sphere::Sphere;
pub use torus::AxisTorus;

use std::fmt;

use crate::error::{GeometryError, Result};
use crate::geometry::region::Region;
use crate::math::{Axis, Point3};
use crate::model::ids::SurfaceId;

/// Trait for analytic surfaces given by an implicit equation `f(p) = 0`.
///
/// The sign of `f` splits space into the positive and negative half-spaces
/// that regions are built from.
pub trait ImplicitSurface {
    /// Type tag written to the geometry document (`"z-cylinder"`, ...).
    fn type_tag(&self) -> &'static str;

    /// Coefficients in the order they are written to the geometry document.
    fn coefficients(&self) -> Vec<f64>;

    /// Evaluates the implicit equation at `point`.
    fn evaluate(&self, point: &Point3) -> f64;
}

/// The closed set of supported surface kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceKind {
    /// `x-plane`, `y-plane` or `z-plane`.
    AxisPlane(AxisPlane),
    /// General `plane`.
    Plane(Plane),
    /// `x-cylinder`, `y-cylinder` or `z-cylinder`.
    Cylinder(AxisCylinder),
    /// `sphere`.
    Sphere(Sphere),
    /// `x-cone`, `y-cone` or `z-cone`.
    Cone(AxisCone),
    /// `x-torus`, `y-torus` or `z-torus`.
    Torus(AxisTorus),
    /// General `quadric`.
    Quadric(Quadric),
}

impl SurfaceKind {
    /// Builds a surface kind from its type tag and raw coefficient list, as
    /// they appear in a geometry document.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown tag, a wrong number of coefficients,
    /// or coefficients the surface constructor rejects.
    pub fn from_raw(tag: &str, coeffs: &[f64]) -> Result<Self> {
        let (family, axis) = split_tag(tag);
        let kind = match (family, axis) {
            ("plane", Some(axis)) => {
                let [offset] = take::<1>(tag, coeffs)?;
                Self::AxisPlane(AxisPlane::new(axis, offset)?)
            }
            ("plane", None) => {
                let [a, b, c, d] = take::<4>(tag, coeffs)?;
                Self::Plane(Plane::new(a, b, c, d)?)
            }
            ("cylinder", Some(axis)) => {
                let [c1, c2, r] = take::<3>(tag, coeffs)?;
                Self::Cylinder(AxisCylinder::new(axis, c1, c2, r)?)
            }
            ("sphere", None) => {
                let [x, y, z, r] = take::<4>(tag, coeffs)?;
                Self::Sphere(Sphere::new(Point3::new(x, y, z), r)?)
            }
            ("cone", Some(axis)) => {
                let [x, y, z, r2] = take::<4>(tag, coeffs)?;
                Self::Cone(AxisCone::new(axis, Point3::new(x, y, z), r2)?)
            }
            ("torus", Some(axis)) => {
                let [x, y, z, a, b, c] = take::<6>(tag, coeffs)?;
                Self::Torus(AxisTorus::new(axis, Point3::new(x, y, z), a, b, c)?)
            }
            ("quadric", None) => Self::Quadric(Quadric::new(take::<10>(tag, coeffs)?)?),
            _ => return Err(GeometryError::UnknownSurfaceType(tag.to_owned()).into()),
        };
        Ok(kind)
    }

    fn as_implicit(&self) -> &dyn ImplicitSurface {
        match self {
            Self::AxisPlane(s) => s,
            Self::Plane(s) => s,
            Self::Cylinder(s) => s,
            Self::Sphere(s) => s,
            Self::Cone(s) => s,
            Self::Torus(s) => s,
            Self::Quadric(s) => s,
        }
    }
}

impl ImplicitSurface for SurfaceKind {
    fn type_tag(&self) -> &'static str {
        self.as_implicit().type_tag()
    }

    fn coefficients(&self) -> Vec<f64> {
        self.as_implicit().coefficients()
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        self.as_implicit().evaluate(point)
    }
}

macro_rules! kind_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for SurfaceKind {
                fn from(surface: $ty) -> Self {
                    Self::$variant(surface)
                }
            }

            impl From<$ty> for SurfaceDef {
                fn from(surface: $ty) -> Self {
                    Self::new(surface)
                }
            }
        )*
    };
}

kind_from!(
    AxisPlane(AxisPlane),
    Plane(Plane),
    Cylinder(AxisCylinder),
    Sphere(Sphere),
    Cone(AxisCone),
    Torus(AxisTorus),
    Quadric(Quadric),
);

/// What happens to a particle that reaches a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Particles cross freely.
    #[default]
    Transmission,
    /// Particles leaving through the surface are killed.
    Vacuum,
    /// Specular reflection.
    Reflective,
    /// Diffuse (cosine-distributed) reflection.
    White,
    /// Particles re-enter through the partner surface.
    Periodic { partner: SurfaceId },
}

impl BoundaryCondition {
    /// Keyword written to the geometry document.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transmission => "transmission",
            Self::Vacuum => "vacuum",
            Self::Reflective => "reflective",
            Self::White => "white",
            Self::Periodic { .. } => "periodic",
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered surface.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    kind: SurfaceKind,
    boundary: BoundaryCondition,
    name: Option<String>,
}

impl Surface {
    /// Returns the surface id.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Returns the analytic kind and its coefficients.
    #[must_use]
    pub fn kind(&self) -> &SurfaceKind {
        &self.kind
    }

    /// Returns the boundary condition.
    #[must_use]
    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    /// Returns the optional name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Evaluates the implicit equation of the surface at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        self.kind.evaluate(point)
    }

    /// The positive half-space of this surface.
    #[must_use]
    pub fn positive(&self) -> Region {
        Region::positive(self.id)
    }

    /// The negative half-space of this surface.
    #[must_use]
    pub fn negative(&self) -> Region {
        Region::negative(self.id)
    }
}

impl From<SurfaceKind> for SurfaceDef {
    fn from(kind: SurfaceKind) -> Self {
        Self::new(kind)
    }
}

/// Registration request for a surface.
#[derive(Debug, Clone)]
pub struct SurfaceDef {
    kind: SurfaceKind,
    boundary: BoundaryCondition,
    id: Option<u32>,
    name: Option<String>,
}

impl SurfaceDef {
    /// A transmissive surface with an automatically assigned id.
    #[must_use]
    pub fn new(kind: impl Into<SurfaceKind>) -> Self {
        Self {
            kind: kind.into(),
            boundary: BoundaryCondition::Transmission,
            id: None,
            name: None,
        }
    }

    /// Sets the boundary condition.
    #[must_use]
    pub fn boundary(mut self, boundary: BoundaryCondition) -> Self {
        self.boundary = boundary;
        self
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
}

pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite { name, value }.into())
    }
}

/// Splits `"z-cylinder"` into `("cylinder", Some(Z))` and `"sphere"` into
/// `("sphere", None)`.
fn split_tag(tag: &str) -> (&str, Option<Axis>) {
    let axis = match tag.get(..2) {
        Some("x-") => Some(Axis::X),
        Some("y-") => Some(Axis::Y),
        Some("z-") => Some(Axis::Z),
        _ => None,
    };
    match axis {
        Some(axis) => (&tag[2..], Some(axis)),
        None => (tag, None),
    }
}

fn take<const N: usize>(tag: &str, coeffs: &[f64]) -> Result<[f64; N]> {
    <[f64; N]>::try_from(coeffs).map_err(|_| {
        GeometryError::CoefficientCount {
            kind: tag.to_owned(),
            expected: N,
            actual: coeffs.len(),
        }
        .into()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CsgError;

    #[test]
    fn from_raw_round_trips_tag_and_coefficients() {
        let cases: [(&str, &[f64]); 8] = [
            ("x-plane", &[-10.71]),
            ("plane", &[1.0, 1.0, 0.0, 2.0]),
            ("z-cylinder", &[0.0, 0.0, 0.39218]),
            ("y-cylinder", &[1.0, -1.0, 2.0]),
            ("sphere", &[0.0, 0.0, 1.0, 3.0]),
            ("z-cone", &[0.0, 0.0, 0.0, 0.5]),
            ("x-torus", &[0.0, 0.0, 0.0, 5.0, 1.0, 1.5]),
            (
                "quadric",
                &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -4.0],
            ),
        ];
        for (tag, coeffs) in cases {
            let kind = SurfaceKind::from_raw(tag, coeffs).unwrap();
            assert_eq!(kind.type_tag(), tag);
            assert_eq!(kind.coefficients(), coeffs);
        }
    }

    #[test]
    fn from_raw_rejects_unknown_tag() {
        let err = SurfaceKind::from_raw("w-plane", &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            CsgError::Geometry(GeometryError::UnknownSurfaceType(_))
        ));
    }

    #[test]
    fn from_raw_rejects_wrong_count() {
        let err = SurfaceKind::from_raw("sphere", &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            CsgError::Geometry(GeometryError::CoefficientCount {
                expected: 4,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn boundary_keywords() {
        assert_eq!(BoundaryCondition::default().as_str(), "transmission");
        assert_eq!(BoundaryCondition::Reflective.to_string(), "reflective");
        let periodic = BoundaryCondition::Periodic {
            partner: SurfaceId(3),
        };
        assert_eq!(periodic.as_str(), "periodic");
    }

    #[test]
    fn def_builder_sets_fields() {
        let def = SurfaceDef::new(AxisPlane::x(1.0).unwrap())
            .boundary(BoundaryCondition::Vacuum)
            .id(4)
            .name("left");
        assert_eq!(def.id, Some(4));
        assert_eq!(def.boundary, BoundaryCondition::Vacuum);
        assert_eq!(def.name.as_deref(), Some("left"));
    }
}
