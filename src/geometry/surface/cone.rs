use crate::error::{GeometryError, Result};
use crate::math::{Axis, Point3, TOLERANCE};

use super::{ensure_finite, ImplicitSurface};

/// A double cone whose axis is parallel to a coordinate axis.
///
/// For a z-cone `f(p) = (x - x0)^2 + (y - y0)^2 - R2 * (z - z0)^2`, where
/// `R2` is the squared tangent of the half-angle.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCone {
    axis: Axis,
    apex: Point3,
    r2: f64,
}

impl AxisCone {
    /// Creates a cone with its apex at `apex`.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or `r2` is
    /// non-positive.
    pub fn new(axis: Axis, apex: Point3, r2: f64) -> Result<Self> {
        ensure_finite("x0", apex.x)?;
        ensure_finite("y0", apex.y)?;
        ensure_finite("z0", apex.z)?;
        ensure_finite("R2", r2)?;
        if r2 < TOLERANCE {
            return Err(GeometryError::Degenerate("cone R2 must be positive".into()).into());
        }
        Ok(Self { axis, apex, r2 })
    }

    /// Returns the axis direction.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the apex.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the squared half-angle tangent.
    #[must_use]
    pub fn r2(&self) -> f64 {
        self.r2
    }
}

impl ImplicitSurface for AxisCone {
    fn type_tag(&self) -> &'static str {
        match self.axis {
            Axis::X => "x-cone",
            Axis::Y => "y-cone",
            Axis::Z => "z-cone",
        }
    }

    fn coefficients(&self) -> Vec<f64> {
        vec![self.apex.x, self.apex.y, self.apex.z, self.r2]
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        let d = point - self.apex;
        let (a, b) = self.axis.transverse();
        let w = d[self.axis.index()];
        d[a.index()] * d[a.index()] + d[b.index()] * d[b.index()] - self.r2 * w * w
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn z_cone_surface_points() {
        let c = AxisCone::new(Axis::Z, Point3::origin(), 1.0).unwrap();
        assert_relative_eq!(c.evaluate(&Point3::new(2.0, 0.0, 2.0)), 0.0);
        assert_relative_eq!(c.evaluate(&Point3::new(0.0, 2.0, -2.0)), 0.0);
        assert!(c.evaluate(&Point3::new(0.0, 0.0, 1.0)) < 0.0);
        assert!(c.evaluate(&Point3::new(3.0, 0.0, 1.0)) > 0.0);
    }

    #[test]
    fn x_cone_tag_and_coefficients() {
        let c = AxisCone::new(Axis::X, Point3::new(1.0, 2.0, 3.0), 0.25).unwrap();
        assert_eq!(c.type_tag(), "x-cone");
        assert_eq!(c.coefficients(), vec![1.0, 2.0, 3.0, 0.25]);
    }

    #[test]
    fn invalid_r2() {
        assert!(AxisCone::new(Axis::Y, Point3::origin(), 0.0).is_err());
    }
}
