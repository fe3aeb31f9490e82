mod export_xml;
mod finalize;

pub use export_xml::{ExportOptions, ExportXml};
pub use finalize::{Finalize, FinalizedGeometry};
