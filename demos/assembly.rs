//! Builds a 17x17 PWR fuel assembly and prints its geometry document.
//!
//! Usage:
//! ```text
//! cargo run --example assembly                   # print to stdout
//! cargo run --example assembly -- geometry.xml   # write a file
//! RUST_LOG=csgcell=debug cargo run --example assembly
//! ```

use csgcell::geometry::region::{all_of, Region};
use csgcell::geometry::surface::{AxisCylinder, AxisPlane, BoundaryCondition, SurfaceDef};
use csgcell::model::{CellDef, LatticeDef, MaterialId, SurfaceId, UniverseId};
use csgcell::operations::{ExportOptions, ExportXml};
use csgcell::{Geometry, Result};

const PITCH: f64 = 1.26;
const SIZE: usize = 17;

const GUIDE_TUBE_ROWS: [usize; 21] = [5, 8, 11, 2, 5, 8, 11, 14, 2, 5, 8, 11, 14, 2, 5, 8, 11, 14, 5, 8, 11];
const GUIDE_TUBE_COLS: [usize; 21] = [2, 2, 2, 5, 5, 5, 5, 5, 8, 8, 8, 8, 8, 11, 11, 11, 11, 11, 14, 14, 14];
const BURNABLE_ABSORBER_ROWS: [usize; 4] = [3, 13, 3, 13];
const BURNABLE_ABSORBER_COLS: [usize; 4] = [3, 3, 13, 13];

struct Materials {
    uo2: MaterialId,
    zirconium: MaterialId,
    water: MaterialId,
    pyrex: MaterialId,
    void: MaterialId,
}

fn main() -> Result<()> {
    // Default: WARN for everything, INFO for csgcell.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("csgcell=info".parse().unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let geometry = build()?;
    let export = ExportXml::new(ExportOptions::default());
    match std::env::args().nth(1) {
        Some(path) => export.export_to_file(&geometry, path),
        None => export.write_to(&geometry, &mut std::io::stdout().lock()),
    }
}

fn build() -> Result<Geometry> {
    let mut g = Geometry::new(0);
    let mats = Materials {
        uo2: g.register_material(None, Some("uo2"))?,
        zirconium: g.register_material(None, Some("zirconium"))?,
        water: g.register_material(None, Some("water"))?,
        pyrex: g.register_material(None, Some("pyrex"))?,
        void: g.register_material(None, Some("void"))?,
    };

    let fuel_pin = fuel_pin(&mut g, &mats)?;
    let guide_tube = guide_tube(&mut g, &mats)?;
    let burnable_absorber = burnable_absorber(&mut g, &mats)?;

    // Never placed in the lattice, so finalize skips it with a warning even
    // though its cell has no region.
    let all_water = g.create_universe(None, Some("all water"))?;
    let moderator = g.create_cell(CellDef::new().fill(mats.water))?;
    g.add_cell(all_water, moderator)?;

    let half = PITCH * 17.0 / 2.0;
    let mut assembly = LatticeDef::uniform([PITCH, PITCH], [-half, -half], [SIZE, SIZE], fuel_pin)
        .name("assembly");
    for (row, col) in GUIDE_TUBE_ROWS.into_iter().zip(GUIDE_TUBE_COLS) {
        assembly.set(row, col, guide_tube)?;
    }
    for (row, col) in BURNABLE_ABSORBER_ROWS.into_iter().zip(BURNABLE_ABSORBER_COLS) {
        assembly.set(row, col, burnable_absorber)?;
    }
    let assembly = g.create_lattice(assembly)?;

    let reflective = |kind: AxisPlane| SurfaceDef::new(kind).boundary(BoundaryCondition::Reflective);
    let min_x = g.add_surface(reflective(AxisPlane::x(-10.71)?))?;
    let max_x = g.add_surface(reflective(AxisPlane::x(10.71)?))?;
    let min_y = g.add_surface(reflective(AxisPlane::y(-10.71)?))?;
    let max_y = g.add_surface(reflective(AxisPlane::y(10.71)?))?;
    let min_z = g.add_surface(reflective(AxisPlane::z(-10.0)?))?;
    let max_z = g.add_surface(reflective(AxisPlane::z(10.0)?))?;

    let bounds = all_of([
        Region::positive(min_x),
        Region::negative(max_x),
        Region::positive(min_y),
        Region::negative(max_y),
        Region::positive(min_z),
        Region::negative(max_z),
    ]);
    let mut root_cell = CellDef::new().name("root cell").fill(assembly);
    if let Some(bounds) = bounds {
        root_cell = root_cell.region(bounds);
    }
    let root_cell = g.create_cell(root_cell)?;
    g.add_cell(g.root_universe(), root_cell)?;

    Ok(g)
}

fn z_cylinder(g: &mut Geometry, radius: f64) -> Result<SurfaceId> {
    g.add_surface(AxisCylinder::z(0.0, 0.0, radius)?)
}

fn fuel_pin(g: &mut Geometry, mats: &Materials) -> Result<UniverseId> {
    let fuel_or = z_cylinder(g, 0.39218)?;
    let clad_ir = z_cylinder(g, 0.40005)?;
    let clad_or = z_cylinder(g, 0.45720)?;

    let cells = [
        g.create_cell(CellDef::new().id(1).name("fuel").region(Region::negative(fuel_or)).fill(mats.uo2))?,
        g.create_cell(
            CellDef::new()
                .id(2)
                .name("air gap")
                .region(Region::positive(fuel_or) & Region::negative(clad_ir))
                .fill(mats.void),
        )?,
        g.create_cell(
            CellDef::new()
                .id(3)
                .name("clad")
                .region(Region::positive(clad_ir) & Region::negative(clad_or))
                .fill(mats.zirconium),
        )?,
        g.create_cell(CellDef::new().id(4).name("moderator").region(Region::positive(clad_or)).fill(mats.water))?,
    ];
    let universe = g.create_universe(None, Some("fuel pin"))?;
    g.add_cells(universe, &cells)?;
    Ok(universe)
}

fn guide_tube(g: &mut Geometry, mats: &Materials) -> Result<UniverseId> {
    let clad_ir = z_cylinder(g, 0.56134)?;
    let clad_or = z_cylinder(g, 0.60198)?;

    let cells = [
        g.create_cell(CellDef::new().region(Region::negative(clad_ir)).fill(mats.water))?,
        g.create_cell(
            CellDef::new()
                .region(Region::positive(clad_ir) & Region::negative(clad_or))
                .fill(mats.zirconium),
        )?,
        g.create_cell(CellDef::new().region(Region::positive(clad_or)).fill(mats.water))?,
    ];
    let universe = g.create_universe(None, Some("guide tube"))?;
    g.add_cells(universe, &cells)?;
    Ok(universe)
}

fn burnable_absorber(g: &mut Geometry, mats: &Materials) -> Result<UniverseId> {
    let radii = [0.21400, 0.23051, 0.24130, 0.42672, 0.43688, 0.48387, 0.56134, 0.60198];
    let cylinders = radii
        .iter()
        .map(|r| z_cylinder(g, *r))
        .collect::<Result<Vec<_>>>()?;
    let layers = [mats.zirconium, mats.void, mats.pyrex, mats.void, mats.zirconium, mats.water, mats.zirconium];

    let mut cells = vec![g.create_cell(CellDef::new().region(Region::negative(cylinders[0])).fill(mats.void))?];
    for (pair, material) in cylinders.windows(2).zip(layers) {
        cells.push(g.create_cell(
            CellDef::new()
                .region(Region::positive(pair[0]) & Region::negative(pair[1]))
                .fill(material),
        )?);
    }
    cells.push(g.create_cell(CellDef::new().region(Region::positive(cylinders[7])).fill(mats.water))?);

    let universe = g.create_universe(None, Some("burnable absorber"))?;
    g.add_cells(universe, &cells)?;
    Ok(universe)
}
