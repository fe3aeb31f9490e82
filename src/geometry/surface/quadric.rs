use crate::error::{GeometryError, Result};
use crate::math::{Point3, TOLERANCE};

use super::{ensure_finite, ImplicitSurface};

const NAMES: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "J", "K"];

/// A general quadric surface
/// `Ax^2 + By^2 + Cz^2 + Dxy + Eyz + Fxz + Gx + Hy + Jz + K = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadric {
    coeffs: [f64; 10],
}

impl Quadric {
    /// Creates a quadric from `[A, B, C, D, E, F, G, H, J, K]`.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or every
    /// non-constant coefficient is zero.
    pub fn new(coeffs: [f64; 10]) -> Result<Self> {
        for (name, value) in NAMES.iter().zip(coeffs) {
            ensure_finite(*name, value)?;
        }
        if coeffs[..9].iter().all(|c| c.abs() < TOLERANCE) {
            return Err(GeometryError::Degenerate(
                "quadric has no non-constant terms".into(),
            )
            .into());
        }
        Ok(Self { coeffs })
    }
}

impl ImplicitSurface for Quadric {
    fn type_tag(&self) -> &'static str {
        "quadric"
    }

    fn coefficients(&self) -> Vec<f64> {
        self.coeffs.to_vec()
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        let [a, b, c, d, e, f, g, h, j, k] = self.coeffs;
        let (x, y, z) = (point.x, point.y, point.z);
        a * x * x + b * y * y + c * z * z + d * x * y + e * y * z + f * x * z
            + g * x
            + h * y
            + j * z
            + k
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_sphere_as_quadric() {
        let q = Quadric::new([1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]).unwrap();
        assert_relative_eq!(q.evaluate(&Point3::origin()), -1.0);
        assert_relative_eq!(q.evaluate(&Point3::new(0.0, 1.0, 0.0)), 0.0);
        assert_eq!(q.coefficients().len(), 10);
    }

    #[test]
    fn constant_only_is_degenerate() {
        let mut coeffs = [0.0; 10];
        coeffs[9] = 3.0;
        assert!(Quadric::new(coeffs).is_err());
    }
}
