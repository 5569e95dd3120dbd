//!
//! # Component-Cell Registry
//!
//! Maps component names to builder functions producing [Cell] definitions
//! with named [Pin]s. Lookup fails closed: an unregistered name is a fatal
//! [PdkError::MissingCell], raised before any placement happens.
//!
//! The cell geometry here is black-box stub geometry (outline, port stubs,
//! pins), which is all a layout-generation run needs: bounding boxes, pin
//! positions and headings, and something visible in the export.
//!

// Crates.io
use indexmap::IndexMap;

// Local imports
use crate::error::{PdkError, PdkResult};
use crate::tech::TechLayers;
use pic21raw::{Cell, DbUnits, Library, Pin, Point, Polygon, Ptr, Rotation, Shape};

/// Y-branch body length, input to outputs
pub const YBRANCH_LENGTH: pic21raw::Int = 14_800;
/// Y-branch output-port offset from the center line
pub const YBRANCH_PORT_DY: pic21raw::Int = 2_750;

/// Builder function for a fixed (non-parametric) component cell
type Builder = fn(&TechLayers) -> Cell;

/// # Component Library
///
/// Insertion-ordered name → builder registry for one technology's cells.
#[derive(Debug, Clone)]
pub struct ComponentLib {
    /// Library Name
    pub name: String,
    builders: IndexMap<String, Builder>,
}
impl ComponentLib {
    /// Create the standard component set of library `name`
    pub fn standard(name: impl Into<String>) -> Self {
        let mut builders: IndexMap<String, Builder> = IndexMap::new();
        builders.insert("laser_1310nm_dfb".to_string(), laser_1310nm_dfb as Builder);
        builders.insert("ybranch_te1310".to_string(), ybranch_te1310 as Builder);
        builders.insert("gc_te1310".to_string(), gc_te1310 as Builder);
        builders.insert(
            "taper_350nm_2000nm".to_string(),
            taper_350nm_2000nm as Builder,
        );
        builders.insert(
            "terminator_te1310".to_string(),
            terminator_te1310 as Builder,
        );
        builders.insert(
            "waveguide_straight".to_string(),
            waveguide_straight as Builder,
        );
        Self {
            name: name.into(),
            builders,
        }
    }
    /// All registered component names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.builders.keys().cloned().collect()
    }
    /// Build the component named `name` and insert it into `lib`.
    /// Fails closed with [PdkError::MissingCell] on unregistered names.
    pub fn create(
        &self,
        lib: &mut Library,
        layers: &TechLayers,
        name: &str,
    ) -> PdkResult<Ptr<Cell>> {
        let builder = self.builders.get(name).ok_or_else(|| PdkError::MissingCell {
            name: name.to_string(),
            library: self.name.clone(),
        })?;
        Ok(lib.cells.insert(builder(layers)))
    }
    /// Build a parametric straight waveguide of `length_um` × `width_um`.
    /// The `name` must still resolve in the registry; parameters only
    /// specialize the geometry.
    pub fn create_straight(
        &self,
        lib: &mut Library,
        layers: &TechLayers,
        name: &str,
        length_um: f64,
        width_um: f64,
    ) -> PdkResult<Ptr<Cell>> {
        if !self.builders.contains_key(name) {
            return Err(PdkError::MissingCell {
                name: name.to_string(),
                library: self.name.clone(),
            });
        }
        Ok(lib.cells.insert(straight_cell(layers, length_um, width_um)))
    }
}

/// DFB laser black box. Output port on the right edge.
fn laser_1310nm_dfb(layers: &TechLayers) -> Cell {
    let mut cell = Cell::new("laser_1310nm_dfb")
        .with_pin(Pin::new("opt1", Point::new(400_000, 0), Rotation::R0));
    cell.add_shape(layers.devrec, Shape::rect(0, -150_000, 400_000, 150_000));
    cell.add_shape(layers.waveguide, Shape::rect(398_000, -175, 400_000, 175));
    cell
}

/// 1×2 splitter. Input on the left, two outputs on the right.
fn ybranch_te1310(layers: &TechLayers) -> Cell {
    let (len, dy) = (YBRANCH_LENGTH, YBRANCH_PORT_DY);
    let mut cell = Cell::new("ybranch_te1310")
        .with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R180))
        .with_pin(Pin::new("opt2", Point::new(len, dy), Rotation::R0))
        .with_pin(Pin::new("opt3", Point::new(len, -dy), Rotation::R0));
    cell.add_shape(layers.devrec, Shape::rect(0, -dy - 1_000, len, dy + 1_000));
    cell.add_shape(layers.waveguide, Shape::rect(0, -175, 2_000, 175));
    cell.add_shape(layers.waveguide, Shape::rect(len - 2_000, dy - 175, len, dy + 175));
    cell.add_shape(
        layers.waveguide,
        Shape::rect(len - 2_000, -dy - 175, len, -dy + 175),
    );
    cell
}

/// Grating coupler. Port at the origin, teeth fanning out to the left.
fn gc_te1310(layers: &TechLayers) -> Cell {
    let mut cell =
        Cell::new("gc_te1310").with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R0));
    cell.add_shape(layers.devrec, Shape::rect(-41_000, -17_750, 0, 17_750));
    cell.add_shape(
        layers.waveguide,
        Shape::Polygon(Polygon {
            points: vec![
                Point::new(0, 175),
                Point::new(0, -175),
                Point::new(-21_000, -8_000),
                Point::new(-21_000, 8_000),
            ],
        }),
    );
    // Grating teeth
    for t in 0..5 {
        let x0 = -41_000 + t * 4_000;
        cell.add_shape(layers.waveguide, Shape::rect(x0, -8_000, x0 + 1_500, 8_000));
    }
    cell
}

/// Linear taper, 350 nm strip to 2 µm strip
fn taper_350nm_2000nm(layers: &TechLayers) -> Cell {
    let mut cell = Cell::new("taper_350nm_2000nm")
        .with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R180))
        .with_pin(Pin::new("opt2", Point::new(20_000, 0), Rotation::R0));
    cell.add_shape(layers.devrec, Shape::rect(0, -1_250, 20_000, 1_250));
    cell.add_shape(
        layers.waveguide,
        Shape::Polygon(Polygon {
            points: vec![
                Point::new(0, 175),
                Point::new(20_000, 1_000),
                Point::new(20_000, -1_000),
                Point::new(0, -175),
            ],
        }),
    );
    cell
}

/// Nanotaper terminator, absorbing unused optical output
fn terminator_te1310(layers: &TechLayers) -> Cell {
    let mut cell = Cell::new("terminator_te1310")
        .with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R180));
    cell.add_shape(layers.devrec, Shape::rect(0, -2_500, 10_000, 2_500));
    cell.add_shape(
        layers.waveguide,
        Shape::Polygon(Polygon {
            points: vec![
                Point::new(0, 175),
                Point::new(10_000, 30),
                Point::new(10_000, -30),
                Point::new(0, -175),
            ],
        }),
    );
    cell
}

/// Straight waveguide at the default 40 µm × 350 nm
fn waveguide_straight(layers: &TechLayers) -> Cell {
    straight_cell(layers, 40.0, 0.35)
}

/// Parametric straight waveguide
fn straight_cell(layers: &TechLayers, length_um: f64, width_um: f64) -> Cell {
    let len = DbUnits::from_um(length_um).raw();
    let w = DbUnits::from_um(width_um).raw();
    let mut cell = Cell::new(format!("waveguide_straight_l{}_w{}", len, w))
        .with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R180))
        .with_pin(Pin::new("opt2", Point::new(len, 0), Rotation::R0));
    cell.add_shape(layers.waveguide, Shape::rect(0, -w / 2, len, w / 2));
    cell.add_shape(
        layers.devrec,
        Shape::rect(0, -w / 2 - 1_000, len, w / 2 + 1_000),
    );
    cell
}
