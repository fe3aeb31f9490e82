use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::info;

use crate::error::{CsgError, ExportError, Result};
use crate::geometry::region::RegionStyle;
use crate::geometry::surface::{BoundaryCondition, ImplicitSurface, Surface};
use crate::math::format_reals;
use crate::model::{Cell, Fill, Geometry, RectLattice};

use super::finalize::{Finalize, FinalizedGeometry};

/// Parameters controlling the written document.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// How region expressions are parenthesized.
    pub region_style: RegionStyle,
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            region_style: RegionStyle::Grouped,
            indent: 2,
        }
    }
}

/// Writes a geometry as a `<geometry>` XML document.
///
/// The geometry is validated with [`Finalize`] first and the document is
/// built in memory, so nothing is written when validation fails.
#[derive(Debug, Clone, Default)]
pub struct ExportXml {
    options: ExportOptions,
}

impl ExportXml {
    /// Creates a new `ExportXml` operation.
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Validates `geometry` and renders the document.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`Finalize::execute`], or
    /// [`ExportError::Xml`] if the writer fails.
    pub fn execute(&self, geometry: &Geometry) -> Result<String> {
        let finalized = Finalize::new(geometry).execute()?;
        self.render(&finalized)
    }

    /// Renders an already validated geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Xml`] if the writer fails.
    pub fn render(&self, finalized: &FinalizedGeometry<'_>) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', self.options.indent);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("geometry")))
            .map_err(xml_error)?;

        for cell in finalized.cells() {
            let element = self.cell_element(cell, finalized)?;
            writer.write_event(Event::Empty(element)).map_err(xml_error)?;
        }
        for lattice in finalized.lattices() {
            writer
                .write_event(Event::Empty(lattice_element(lattice)))
                .map_err(xml_error)?;
        }
        for surface in finalized.surfaces() {
            writer
                .write_event(Event::Empty(surface_element(surface)))
                .map_err(xml_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("geometry")))
            .map_err(xml_error)?;

        let mut text = String::from_utf8(writer.into_inner()).map_err(xml_error)?;
        text.push('\n');
        Ok(text)
    }

    /// Validates `geometry` and writes the document to `out`.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or [`ExportError::Io`] if writing fails.
    pub fn write_to<W: Write>(&self, geometry: &Geometry, out: &mut W) -> Result<()> {
        let text = self.execute(geometry)?;
        out.write_all(text.as_bytes()).map_err(ExportError::from)?;
        Ok(())
    }

    /// Validates `geometry` and writes the document to `path`.
    ///
    /// The file is only created once the whole document has been produced.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or [`ExportError::Io`] if the file cannot
    /// be written.
    pub fn export_to_file(&self, geometry: &Geometry, path: impl AsRef<Path>) -> Result<()> {
        let text = self.execute(geometry)?;
        std::fs::write(path.as_ref(), text).map_err(ExportError::from)?;
        info!(path = %path.as_ref().display(), "wrote geometry document");
        Ok(())
    }

    fn cell_element(&self, cell: &Cell, finalized: &FinalizedGeometry<'_>) -> Result<BytesStart<'static>> {
        let id = cell.id();
        // Finalize guarantees both are present.
        let (Some(region), Some(fill)) = (cell.region(), cell.fill()) else {
            return Err(ExportError::Xml(format!("cell {id} was not finalized")).into());
        };

        let mut element = BytesStart::new("cell");
        match fill {
            Fill::Universe(u) => element.push_attribute(("fill", u.to_string().as_str())),
            Fill::Lattice(l) => element.push_attribute(("fill", l.to_string().as_str())),
            Fill::Material(_) | Fill::Void => {}
        }
        element.push_attribute(("id", id.to_string().as_str()));
        match fill {
            Fill::Material(m) => element.push_attribute(("material", m.to_string().as_str())),
            Fill::Void => element.push_attribute(("material", "void")),
            Fill::Universe(_) | Fill::Lattice(_) => {}
        }
        push_name(&mut element, cell.name());
        element.push_attribute((
            "region",
            region.to_expression(self.options.region_style).as_str(),
        ));
        element.push_attribute(("universe", finalized.owner(cell).to_string().as_str()));
        Ok(element)
    }
}

impl Geometry {
    /// Renders the geometry with default [`ExportOptions`]. Shorthand for
    /// [`ExportXml::execute`].
    ///
    /// # Errors
    ///
    /// See [`ExportXml::execute`].
    pub fn to_xml_string(&self) -> Result<String> {
        ExportXml::default().execute(self)
    }
}

fn lattice_element(lattice: &RectLattice) -> BytesStart<'static> {
    let [nx, ny] = lattice.dimension();
    let universes = lattice
        .rows()
        .iter()
        .flatten()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    let mut element = BytesStart::new("lattice");
    element.push_attribute(("dimension", format!("{nx} {ny}").as_str()));
    element.push_attribute(("id", lattice.id().to_string().as_str()));
    element.push_attribute(("lower_left", format_reals(&lattice.lower_left()).as_str()));
    push_name(&mut element, lattice.name());
    if let Some(outer) = lattice.outer() {
        element.push_attribute(("outer", outer.to_string().as_str()));
    }
    element.push_attribute(("pitch", format_reals(&lattice.pitch()).as_str()));
    element.push_attribute(("universes", universes.as_str()));
    element
}

fn surface_element(surface: &Surface) -> BytesStart<'static> {
    let boundary = surface.boundary();
    let mut element = BytesStart::new("surface");
    if boundary != BoundaryCondition::Transmission {
        element.push_attribute(("boundary", boundary.as_str()));
    }
    element.push_attribute(("coeffs", format_reals(&surface.kind().coefficients()).as_str()));
    element.push_attribute(("id", surface.id().to_string().as_str()));
    push_name(&mut element, surface.name());
    if let BoundaryCondition::Periodic { partner } = boundary {
        element.push_attribute(("periodic_surface_id", partner.to_string().as_str()));
    }
    element.push_attribute(("type", surface.kind().type_tag()));
    element
}

fn push_name(element: &mut BytesStart<'_>, name: Option<&str>) {
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        element.push_attribute(("name", name));
    }
}

fn xml_error(e: impl Display) -> CsgError {
    ExportError::Xml(e.to_string()).into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::region::Region;
    use crate::geometry::surface::{AxisCylinder, AxisPlane, SurfaceDef};
    use crate::model::{CellDef, LatticeDef};

    /// Fuel rod: fuel inside the first cylinder, gap between the first two.
    fn pin_cell() -> Geometry {
        let mut g = Geometry::new(0);
        let fuel_or = g.add_surface(AxisCylinder::z(0.0, 0.0, 0.39218).unwrap()).unwrap();
        let clad_ir = g.add_surface(AxisCylinder::z(0.0, 0.0, 0.40005).unwrap()).unwrap();
        let uo2 = g.register_material(Some(1), Some("uo2")).unwrap();
        g.create_cell(CellDef::new().id(1).name("fuel").region(Region::negative(fuel_or)).fill(uo2))
            .unwrap();
        g.create_cell(
            CellDef::new()
                .id(2)
                .name("air gap")
                .region(Region::positive(fuel_or) & Region::negative(clad_ir)),
        )
        .unwrap();
        g
    }

    #[test]
    fn pin_cell_fragments() {
        let xml = pin_cell().to_xml_string().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            r#"<cell id="1" material="1" name="fuel" region="-10000" universe="0"/>"#
        ));
        assert!(xml.contains(
            r#"<cell id="2" material="void" name="air gap" region="(10000 -10001)" universe="0"/>"#
        ));
        assert!(xml.contains(r#"<surface coeffs="0 0 0.39218" id="10000" type="z-cylinder"/>"#));
        assert!(xml.trim_end().ends_with("</geometry>"));
    }

    #[test]
    fn bare_style_drops_outer_parentheses() {
        let options = ExportOptions {
            region_style: RegionStyle::Bare,
            ..ExportOptions::default()
        };
        let xml = ExportXml::new(options).execute(&pin_cell()).unwrap();
        assert!(xml.contains(r#"region="10000 -10001""#));
    }

    #[test]
    fn sections_are_ordered() {
        let mut g = Geometry::new(0);
        let s = g.add_surface(AxisCylinder::z(0.0, 0.0, 0.5).unwrap()).unwrap();
        let water = g.register_material(None, Some("water")).unwrap();
        let pin = g.create_universe(Some(1), None).unwrap();
        let c = g.create_cell(CellDef::new().id(5).region(Region::negative(s)).fill(water)).unwrap();
        g.add_cell(pin, c).unwrap();
        let lat = g
            .create_lattice(LatticeDef::uniform([1.26, 1.26], [-1.26, -1.26], [2, 2], pin).id(2))
            .unwrap();
        g.create_cell(CellDef::new().id(6).region(Region::negative(s)).fill(lat)).unwrap();

        let xml = g.to_xml_string().unwrap();
        let cell = xml.find("<cell id=\"5\"").unwrap();
        let root_cell = xml.find(r#"<cell fill="2" id="6""#).unwrap();
        let lattice = xml.find("<lattice").unwrap();
        let surface = xml.find("<surface").unwrap();
        assert!(cell < root_cell && root_cell < lattice && lattice < surface);
        assert!(xml.contains(
            r#"<lattice dimension="2 2" id="2" lower_left="-1.26 -1.26" pitch="1.26 1.26" universes="1 1 1 1"/>"#
        ));
        assert!(xml.contains(r#"universe="1"/>"#));
    }

    #[test]
    fn boundary_attribute_only_when_not_transmission() {
        let mut g = Geometry::new(0);
        let left = g
            .add_surface(SurfaceDef::new(AxisPlane::x(-10.71).unwrap()).boundary(BoundaryCondition::Reflective))
            .unwrap();
        let right = g
            .add_surface(SurfaceDef::new(AxisPlane::x(10.71).unwrap()).name("right"))
            .unwrap();
        g.create_cell(CellDef::new().region(Region::positive(left) & Region::negative(right)))
            .unwrap();
        let xml = g.to_xml_string().unwrap();
        assert!(xml.contains(
            r#"<surface boundary="reflective" coeffs="-10.71" id="10000" type="x-plane"/>"#
        ));
        assert!(xml.contains(r#"<surface coeffs="10.71" id="10001" name="right" type="x-plane"/>"#));
    }

    #[test]
    fn periodic_surface_carries_partner() {
        let mut g = Geometry::new(0);
        let a = g.add_surface(AxisPlane::y(-1.0).unwrap()).unwrap();
        let b = g
            .add_surface(
                SurfaceDef::new(AxisPlane::y(1.0).unwrap())
                    .boundary(BoundaryCondition::Periodic { partner: a }),
            )
            .unwrap();
        g.create_cell(CellDef::new().region(Region::negative(b))).unwrap();
        let xml = g.to_xml_string().unwrap();
        assert!(xml.contains(
            r#"<surface boundary="periodic" coeffs="1" id="10001" periodic_surface_id="10000" type="y-plane"/>"#
        ));
        assert!(xml.contains(r#"id="10000" type="y-plane""#));
    }

    #[test]
    fn names_are_escaped() {
        let mut g = Geometry::new(0);
        let s = g.add_surface(AxisCylinder::z(0.0, 0.0, 1.0).unwrap()).unwrap();
        g.create_cell(CellDef::new().name("a<b & \"c\"").region(Region::negative(s)))
            .unwrap();
        let xml = g.to_xml_string().unwrap();
        assert!(xml.contains("name=\"a&lt;b &amp; &quot;c&quot;\""));
    }

    #[test]
    fn empty_root_writes_empty_document() {
        let xml = Geometry::new(0).to_xml_string().unwrap();
        assert!(!xml.contains("<cell"));
        assert!(!xml.contains("<surface"));
        assert!(xml.contains("<geometry>"));
    }

    #[test]
    fn invalid_geometry_writes_nothing() {
        let mut g = Geometry::new(0);
        g.create_cell(CellDef::new().id(1)).unwrap();
        let mut out = Vec::new();
        assert!(ExportXml::default().write_to(&g, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn write_to_matches_execute() {
        let g = pin_cell();
        let mut out = Vec::new();
        ExportXml::default().write_to(&g, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), g.to_xml_string().unwrap());
    }
}
