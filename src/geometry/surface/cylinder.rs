use crate::error::{GeometryError, Result};
use crate::math::{Axis, Point3, TOLERANCE};

use super::{ensure_finite, ImplicitSurface};

/// An infinite circular cylinder parallel to a coordinate axis.
///
/// For a z-cylinder `f(p) = (x - x0)^2 + (y - y0)^2 - R^2`; the other axes
/// use their two transverse coordinates in ascending order. The negative
/// half-space is the inside of the cylinder.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCylinder {
    axis: Axis,
    center: [f64; 2],
    radius: f64,
}

impl AxisCylinder {
    /// Creates a cylinder along `axis` whose axis passes through the
    /// transverse coordinates `(c1, c2)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or the radius is
    /// non-positive.
    pub fn new(axis: Axis, c1: f64, c2: f64, radius: f64) -> Result<Self> {
        ensure_finite("center", c1)?;
        ensure_finite("center", c2)?;
        ensure_finite("R", radius)?;
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        Ok(Self {
            axis,
            center: [c1, c2],
            radius,
        })
    }

    /// Cylinder parallel to the x axis through `(y0, z0)`.
    ///
    /// # Errors
    ///
    /// See [`AxisCylinder::new`].
    pub fn x(y0: f64, z0: f64, radius: f64) -> Result<Self> {
        Self::new(Axis::X, y0, z0, radius)
    }

    /// Cylinder parallel to the y axis through `(x0, z0)`.
    ///
    /// # Errors
    ///
    /// See [`AxisCylinder::new`].
    pub fn y(x0: f64, z0: f64, radius: f64) -> Result<Self> {
        Self::new(Axis::Y, x0, z0, radius)
    }

    /// Cylinder parallel to the z axis through `(x0, y0)`.
    ///
    /// # Errors
    ///
    /// See [`AxisCylinder::new`].
    pub fn z(x0: f64, y0: f64, radius: f64) -> Result<Self> {
        Self::new(Axis::Z, x0, y0, radius)
    }

    /// Returns the axis direction.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl ImplicitSurface for AxisCylinder {
    fn type_tag(&self) -> &'static str {
        match self.axis {
            Axis::X => "x-cylinder",
            Axis::Y => "y-cylinder",
            Axis::Z => "z-cylinder",
        }
    }

    fn coefficients(&self) -> Vec<f64> {
        vec![self.center[0], self.center[1], self.radius]
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        let (a, b) = self.axis.transverse();
        let du = point[a.index()] - self.center[0];
        let dv = point[b.index()] - self.center[1];
        du * du + dv * dv - self.radius * self.radius
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn z_cylinder_inside_is_negative() {
        let c = AxisCylinder::z(0.0, 0.0, 0.39218).unwrap();
        assert!(c.evaluate(&Point3::new(0.1, 0.1, 50.0)) < 0.0);
        assert!(c.evaluate(&Point3::new(0.5, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn x_cylinder_uses_yz() {
        let c = AxisCylinder::x(1.0, 2.0, 1.0).unwrap();
        assert_relative_eq!(c.evaluate(&Point3::new(100.0, 1.0, 2.0)), -1.0);
        assert_relative_eq!(c.evaluate(&Point3::new(0.0, 3.0, 2.0)), 3.0);
        assert_eq!(c.type_tag(), "x-cylinder");
        assert_eq!(c.coefficients(), vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn invalid_radius() {
        assert!(AxisCylinder::z(0.0, 0.0, 0.0).is_err());
        assert!(AxisCylinder::z(0.0, 0.0, -1.0).is_err());
    }
}
