use crate::error::{GeometryError, Result};
use crate::math::{Axis, Point3, Vector3, TOLERANCE};

use super::{ensure_finite, ImplicitSurface};

/// A plane perpendicular to a coordinate axis.
///
/// `f(p) = p[axis] - offset`, so the positive half-space lies on the side of
/// increasing coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlane {
    axis: Axis,
    offset: f64,
}

impl AxisPlane {
    /// Creates a plane at `offset` along `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is not finite.
    pub fn new(axis: Axis, offset: f64) -> Result<Self> {
        ensure_finite("offset", offset)?;
        Ok(Self { axis, offset })
    }

    /// Plane `x = x0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x0` is not finite.
    pub fn x(x0: f64) -> Result<Self> {
        Self::new(Axis::X, x0)
    }

    /// Plane `y = y0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `y0` is not finite.
    pub fn y(y0: f64) -> Result<Self> {
        Self::new(Axis::Y, y0)
    }

    /// Plane `z = z0`.
    ///
    /// # Errors
    ///
    /// Returns an error if `z0` is not finite.
    pub fn z(z0: f64) -> Result<Self> {
        Self::new(Axis::Z, z0)
    }

    /// Returns the normal axis.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the position along the normal axis.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl ImplicitSurface for AxisPlane {
    fn type_tag(&self) -> &'static str {
        match self.axis {
            Axis::X => "x-plane",
            Axis::Y => "y-plane",
            Axis::Z => "z-plane",
        }
    }

    fn coefficients(&self) -> Vec<f64> {
        vec![self.offset]
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        point[self.axis.index()] - self.offset
    }
}

/// A general plane `Ax + By + Cz = D`.
///
/// `f(p) = Ax + By + Cz - D`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    normal: Vector3,
    d: f64,
}

impl Plane {
    /// Creates a plane from its four coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if a coefficient is not finite or `(A, B, C)` is the
    /// zero vector.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        ensure_finite("A", a)?;
        ensure_finite("B", b)?;
        ensure_finite("C", c)?;
        ensure_finite("D", d)?;
        let normal = Vector3::new(a, b, c);
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("plane normal must be non-zero".into()).into());
        }
        Ok(Self { normal, d })
    }

    /// Creates the plane through `origin` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length or not finite.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let d = normal.dot(&origin.coords);
        Self::new(normal.x, normal.y, normal.z, d)
    }

    /// Creates the plane through three points. The normal follows
    /// `(p2 - p1) x (p3 - p1)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are collinear.
    pub fn from_points(p1: Point3, p2: Point3, p3: Point3) -> Result<Self> {
        let normal = (p2 - p1).cross(&(p3 - p1));
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("plane points are collinear".into()).into());
        }
        Self::from_normal(p1, normal)
    }

    /// Returns the (unnormalized) normal `(A, B, C)`.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the constant term `D`.
    #[must_use]
    pub fn d(&self) -> f64 {
        self.d
    }
}

impl ImplicitSurface for Plane {
    fn type_tag(&self) -> &'static str {
        "plane"
    }

    fn coefficients(&self) -> Vec<f64> {
        vec![self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    fn evaluate(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.d
    }
}
