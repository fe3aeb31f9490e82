use thiserror::Error;

use crate::model::ids::Namespace;

/// Top-level error type for the csgcell geometry model.
#[derive(Debug, Error)]
pub enum CsgError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Id(#[from] IdError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors related to analytic surface definitions.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("coefficient {name} = {value} is not finite")]
    NonFinite { name: &'static str, value: f64 },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("unknown surface type `{0}`")]
    UnknownSurfaceType(String),

    #[error("surface type `{kind}` takes {expected} coefficients, got {actual}")]
    CoefficientCount {
        kind: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised by the identifier namespaces.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("{namespace} id {id} is already in use")]
    DuplicateId { namespace: Namespace, id: u32 },

    #[error("{namespace} ids must be positive, got {id}")]
    NonPositive { namespace: Namespace, id: u32 },

    #[error("no {namespace} ids left to assign automatically")]
    Exhausted { namespace: Namespace },
}

/// Errors related to the cell / universe hierarchy.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cell {cell} has no {missing}")]
    IncompleteCell { cell: u32, missing: &'static str },

    #[error("cell {cell} already belongs to universe {current}, cannot add it to universe {requested}")]
    CellAlreadyAssigned {
        cell: u32,
        current: u32,
        requested: u32,
    },

    #[error("universe hierarchy contains a cycle: {}", format_path(.path))]
    CyclicUniverse { path: Vec<u32> },

    #[error("{referrer} references unregistered {namespace} {id}")]
    DanglingReference {
        namespace: Namespace,
        id: u32,
        referrer: String,
    },

    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("{namespace} {id} not found")]
    UnknownEntity { namespace: Namespace, id: u32 },
}

/// Error produced while parsing a region expression.
#[derive(Debug, Error)]
#[error("invalid region expression at offset {offset}: {message}")]
pub struct ExpressionError {
    /// Byte offset into the expression where parsing failed.
    pub offset: usize,
    /// Description of the problem.
    pub message: String,
}

/// Errors related to writing the geometry document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML write failed: {0}")]
    Xml(String),
}

fn format_path(path: &[u32]) -> String {
    path.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Convenience type alias for results using [`CsgError`].
pub type Result<T> = std::result::Result<T, CsgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = ModelError::CyclicUniverse {
            path: vec![0, 5, 7, 5],
        };
        assert_eq!(
            err.to_string(),
            "universe hierarchy contains a cycle: 0 -> 5 -> 7 -> 5"
        );
    }

    #[test]
    fn duplicate_id_names_namespace() {
        let err: CsgError = IdError::DuplicateId {
            namespace: Namespace::Surface,
            id: 3,
        }
        .into();
        assert_eq!(err.to_string(), "surface id 3 is already in use");
    }
}
