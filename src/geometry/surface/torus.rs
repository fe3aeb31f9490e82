use crate::error::{GeometryError, Result};
use crate::math::{Axis, Point3, TOLERANCE};

use super::{ensure_finite, ImplicitSurface};

/// An elliptical torus whose symmetry axis is parallel to a coordinate axis.
///
/// For a z-torus
/// `f(p) = (z - z0)^2 / B^2 + (sqrt((x - x0)^2 + (y - y0)^2) - A)^2 / C^2 - 1`,
/// where `A` is the major radius, `B` the minor radius along the axis and
/// `C` the minor radius in the radial direction.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTorus {
    axis: Axis,
    center: Point3,
    a: f64,
    b: f64,
    c: f64,
}

impl AxisTorus {
    /// Creates a new torus.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or either minor
    /// radius is non-positive.
    pub fn new(axis: Axis, center: Point3, a: f64, b: f64, c: f64) -> Result<Self> {
        ensure_finite("x0", center.x)?;
        ensure_finite("y0", center.y)?;
        ensure_finite("z0", center.z)?;
        ensure_finite("A", a)?;
        ensure_finite("B", b)?;
        ensure_finite("C", c)?;
        if b < TOLERANCE || c < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "torus minor radii must be positive".into(),
            )
            .into());
        }
        Ok(Self {
            axis,
            center,
            a,
            b,
            c,
        })
    }

    /// Returns the symmetry axis.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the major radius.
    #[must_use]
    pub fn major_radius(&self) -> f64 {
        self.a
    }
}

impl ImplicitSurface for AxisTorus {
    fn type_tag(&self) -> &'static str {
        match self.axis {
            Axis::X => "x-torus",
            Axis::Y => "y-torus",
            Axis::Z => "z-torus",
        }
    }

    fn coefficients(&self) -> Vec<f64> {
        vec![
            self.center.x,
            self.center.y,
            self.center.z,
            self.a,
            self.b,
            self.c,
        ]
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        let d = point - self.center;
        let (u, v) = self.axis.transverse();
        let w = d[self.axis.index()];
        let radial = d[u.index()].hypot(d[v.index()]) - self.a;
        w * w / (self.b * self.b) + radial * radial / (self.c * self.c) - 1.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring() -> AxisTorus {
        AxisTorus::new(Axis::Z, Point3::origin(), 5.0, 1.0, 1.0).unwrap()
    }

    #[test]
    fn tube_center_is_inside() {
        assert_relative_eq!(ring().evaluate(&Point3::new(5.0, 0.0, 0.0)), -1.0);
        assert!(ring().evaluate(&Point3::origin()) > 0.0);
    }

    #[test]
    fn tube_surface_is_zero() {
        assert_relative_eq!(ring().evaluate(&Point3::new(0.0, 6.0, 0.0)), 0.0);
        assert_relative_eq!(ring().evaluate(&Point3::new(5.0, 0.0, 1.0)), 0.0);
    }

    #[test]
    fn coefficients_and_tag() {
        let t = AxisTorus::new(Axis::Y, Point3::new(1.0, 2.0, 3.0), 4.0, 0.5, 0.75).unwrap();
        assert_eq!(t.type_tag(), "y-torus");
        assert_eq!(t.coefficients(), vec![1.0, 2.0, 3.0, 4.0, 0.5, 0.75]);
    }

    #[test]
    fn invalid_minor_radius() {
        assert!(AxisTorus::new(Axis::Z, Point3::origin(), 5.0, 0.0, 1.0).is_err());
    }
}
