use super::ids::MaterialId;

/// An opaque material reference.
///
/// Compositions live outside the geometry model; cells only need to know
/// that the id exists.
#[derive(Debug, Clone)]
pub struct Material {
    pub(super) id: MaterialId,
    pub(super) name: Option<String>,
}

impl Material {
    /// Returns the material id.
    #[must_use]
    pub fn id(&self) -> MaterialId {
        self.id
    }

    /// Returns the optional name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
