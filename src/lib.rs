pub mod error;
pub mod geometry;
pub mod math;
pub mod model;
pub mod operations;

pub use error::{CsgError, Result};
pub use model::{Geometry, GeometryConfig};
