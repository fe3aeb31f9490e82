pub mod region;
pub mod surface;

pub use region::{Halfspace, Region, RegionStyle, Sense};
pub use surface::{BoundaryCondition, ImplicitSurface, Surface, SurfaceDef, SurfaceKind, SurfaceRegistry};
