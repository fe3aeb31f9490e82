use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};

use super::{ensure_finite, ImplicitSurface};

/// A sphere, `f(p) = |p - center|^2 - R^2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Point3,
    radius: f64,
}

impl Sphere {
    /// Creates a new sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is not finite or the radius is
    /// non-positive.
    pub fn new(center: Point3, radius: f64) -> Result<Self> {
        ensure_finite("x0", center.x)?;
        ensure_finite("y0", center.y)?;
        ensure_finite("z0", center.z)?;
        ensure_finite("R", radius)?;
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("sphere radius must be positive".into()).into(),
            );
        }
        Ok(Self { center, radius })
    }

    /// Returns the center.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl ImplicitSurface for Sphere {
    fn type_tag(&self) -> &'static str {
        "sphere"
    }

    fn coefficients(&self) -> Vec<f64> {
        vec![self.center.x, self.center.y, self.center.z, self.radius]
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        (point - self.center).norm_squared() - self.radius * self.radius
    }
}
