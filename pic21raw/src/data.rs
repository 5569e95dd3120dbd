//!
//! # Raw Layout Data Model
//!
//! Defines the primary structures for representation of geometry-based
//! photonic layout, including [Library], [Cell], [Instance], and related types.
//!
//! A [Library] is the single shared mutable layout document of a generation
//! run: one writer mutates it sequentially, then serializes it once.
//!

// Std-Lib
use std::collections::{HashMap, HashSet};

// Crates.io
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// Local Imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    error::{LayoutError, LayoutResult},
    geom::{Point, Rotation, Shape, Trans},
    Int, Ptr,
};

// Create key-types for each internal type stored in [SlotMap]s
new_key_type! {
    /// Keys for [Layer] entries
    pub struct LayerKey;
}

/// Distance Units Enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Units {
    /// Micrometers, or microns for we olde folke
    Micro,
    /// Nanometers
    Nano,
}
impl Default for Units {
    /// Default units are nanometers
    fn default() -> Units {
        Units::Nano
    }
}

/// # Layer Specification
/// As in seemingly every layout system, this uses two numbers to identify each layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerSpec {
    /// Layer Number
    pub layer: i16,
    /// DataType (or TextType) Number
    pub datatype: i16,
}
impl LayerSpec {
    pub fn new(layer: i16, datatype: i16) -> Self {
        Self { layer, datatype }
    }
}

/// # Named Layer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    /// Layer Name
    pub name: String,
    /// Layer & DataType Numbers
    pub spec: LayerSpec,
}
impl Layer {
    /// Create a new [Layer] with the given `name` and `(layer, datatype)` pair
    pub fn new(name: impl Into<String>, layer: i16, datatype: i16) -> Self {
        Self {
            name: name.into(),
            spec: LayerSpec::new(layer, datatype),
        }
    }
}

/// # Layer Set & Manager
///
/// Keep track of active layers, and index them by name.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layers {
    slots: SlotMap<LayerKey, Layer>,
    names: HashMap<String, LayerKey>,
}
impl Layers {
    /// Add a [Layer] to our slot-map and name-map
    pub fn add(&mut self, layer: Layer) -> LayerKey {
        let name = layer.name.clone();
        let key = self.slots.insert(layer);
        self.names.insert(name, key);
        key
    }
    /// Get the [LayerKey] for layer-name `name`
    pub fn keyname(&self, name: impl Into<String>) -> Option<LayerKey> {
        self.names.get(&name.into()).copied()
    }
    /// Get a reference to the [Layer] at `key`
    pub fn get(&self, key: LayerKey) -> Option<&Layer> {
        self.slots.get(key)
    }
    /// Get a reference to the [Layer] named `name`
    pub fn name(&self, name: &str) -> Option<&Layer> {
        let key = self.names.get(name)?;
        self.slots.get(*key)
    }
}

/// # Pin
///
/// A named, positioned connection point on a [Cell], used for routing.
/// The `heading` is the direction in which light *leaves* the cell,
/// i.e. the direction a connecting waveguide departs.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pin {
    /// Pin Name
    pub name: String,
    /// Location, in cell-local coordinates
    pub loc: Point,
    /// Outward heading
    pub heading: Rotation,
}
impl Pin {
    /// Create a new [Pin]
    pub fn new(name: impl Into<String>, loc: Point, heading: Rotation) -> Self {
        Self {
            name: name.into(),
            loc,
            heading,
        }
    }
}

/// Horizontal alignment for [TextElement]s
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}
impl Default for HAlign {
    fn default() -> HAlign {
        HAlign::Left
    }
}

/// # Text Annotation
///
/// Sits on a designated annotation layer (generally the technology's text
/// layer), with an explicit size and alignment. Downstream test automation
/// reads these; they do not describe connectivity.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextElement {
    /// String Value
    pub string: String,
    /// Location
    pub loc: Point,
    /// Text height, in database units
    pub size: Int,
    /// Horizontal alignment
    pub halign: HAlign,
    /// Layer (Reference)
    pub layer: LayerKey,
}

/// # Primitive Geometric Element
///
/// Primary unit of [Cell] definition.
/// Combines a geometric [Shape] with a z-axis [Layer],
/// and optional net connectivity annotation.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Element {
    /// Net Name
    pub net: Option<String>,
    /// Layer (Reference)
    pub layer: LayerKey,
    /// Shape
    pub inner: Shape,
}

/// Instance of another [Cell]
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance Name
    pub inst_name: String,
    /// Cell Definition Reference
    pub cell: Ptr<Cell>,
    /// Quarter-turn rotation plus location of the `cell` origin
    pub trans: Trans,
}
impl Instance {
    /// Create a new [Instance] of `cell` at `trans`
    pub fn new(inst_name: impl Into<String>, cell: &Ptr<Cell>, trans: Trans) -> Self {
        Self {
            inst_name: inst_name.into(),
            cell: Ptr::clone(cell),
            trans,
        }
    }
    /// Absolute location of the pin named `name`
    pub fn pin_point(&self, name: &str) -> LayoutResult<Point> {
        let cell = self.cell.read()?;
        let pin = cell.pin(name).ok_or_else(|| LayoutError::NoSuchPin {
            cell: cell.name.clone(),
            pin: name.to_string(),
        })?;
        Ok(pin.loc.transform(&self.trans))
    }
    /// Absolute outward heading of the pin named `name`
    pub fn pin_heading(&self, name: &str) -> LayoutResult<Rotation> {
        let cell = self.cell.read()?;
        let pin = cell.pin(name).ok_or_else(|| LayoutError::NoSuchPin {
            cell: cell.name.clone(),
            pin: name.to_string(),
        })?;
        Ok(self.trans.rotation.compose(pin.heading))
    }
    /// Retrieve this Instance's bounding rectangle, in parent coordinates.
    pub fn boundbox(&self) -> LayoutResult<BoundBox> {
        let cell = self.cell.read()?;
        let bbox = cell.bbox()?;
        Ok(BoundBox::from_points(
            bbox.p0.transform(&self.trans),
            bbox.p1.transform(&self.trans),
        ))
    }
}
impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell_name = match self.cell.read() {
            Ok(cell) => cell.name.clone(),
            Err(_) => "<poisoned>".to_string(),
        };
        write!(
            f,
            "Instance(name={}, cell={}, trans={:?})",
            self.inst_name, cell_name, self.trans
        )
    }
}

/// # Layout Cell Definition
///
/// Comprised of geometric [Element]s, text annotations, named [Pin]s,
/// and [Instance]s of other [Cell]s.
///
#[derive(Debug, Clone, Default)]
pub struct Cell {
    /// Cell Name
    pub name: String,
    /// Named connection points
    pub pins: Vec<Pin>,
    /// Instances of other cells
    pub insts: Vec<Instance>,
    /// Primitive / Geometric Elements
    pub elems: Vec<Element>,
    /// Text Annotations
    pub annotations: Vec<TextElement>,
}
impl Cell {
    /// Create a new and empty Cell named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Add [Pin] `pin`. Consumes and returns `self` for chainability.
    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.pins.push(pin);
        self
    }
    /// Get a reference to the pin named `name`, if present
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }
    /// Add a [Shape] on `layer`
    pub fn add_shape(&mut self, layer: LayerKey, inner: Shape) {
        self.elems.push(Element {
            net: None,
            layer,
            inner,
        });
    }
    /// Create a rectangular [BoundBox] surrounding all elements and instances in the [Cell].
    pub fn bbox(&self) -> LayoutResult<BoundBox> {
        let mut bbox = BoundBox::empty();
        for elem in &self.elems {
            bbox = elem.inner.union(&bbox);
        }
        for inst in &self.insts {
            bbox = inst.boundbox()?.union(&bbox);
        }
        Ok(bbox)
    }
}

/// List of reference-counted [Cell] definitions
#[derive(Debug, Clone, Default)]
pub struct Cells(Vec<Ptr<Cell>>);
impl Cells {
    /// Insert a [Cell], returning a [Ptr] to it
    pub fn insert(&mut self, cell: Cell) -> Ptr<Cell> {
        let ptr = Ptr::new(cell);
        let rv = Ptr::clone(&ptr);
        self.0.push(ptr);
        rv
    }
    /// Get an immutable reference to our underlying [Cell]-pointer vector
    pub fn as_slice(&self) -> &[Ptr<Cell>] {
        self.0.as_slice()
    }
    /// Iterate over the cell-pointers
    pub fn iter(&self) -> std::slice::Iter<'_, Ptr<Cell>> {
        self.0.iter()
    }
    /// Number of cells
    pub fn len(&self) -> usize {
        self.0.len()
    }
    /// Boolean indication of an empty cell-list
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// # Layout Library
///
/// A collection of cell-definitions, layer definitions, and metadata.
/// The sole persistent entity of a generation run.
///
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Library Name
    pub name: String,
    /// Distance Units
    pub units: Units,
    /// Layer Definitions
    pub layers: Ptr<Layers>,
    /// Cell Definitions
    pub cells: Cells,
}
impl Library {
    /// Create a new and empty Library
    pub fn new(name: impl Into<String>, units: Units) -> Self {
        Self {
            name: name.into(),
            units,
            ..Default::default()
        }
    }
}

/// # Dependency-Orderer
///
/// Orders a [Library]'s cells such that each cell-definition precedes
/// every cell instantiating it.
#[derive(Debug)]
pub struct DepOrder<'lib> {
    lib: &'lib Library,
    stack: Vec<Ptr<Cell>>,
    seen: HashSet<Ptr<Cell>>,
}
impl<'lib> DepOrder<'lib> {
    pub fn order(lib: &'lib Library) -> Vec<Ptr<Cell>> {
        let mut myself = Self {
            lib,
            stack: Vec::new(),
            seen: HashSet::new(),
        };
        for cell in myself.lib.cells.iter() {
            myself.push(cell);
        }
        myself.stack
    }
    fn push(&mut self, ptr: &Ptr<Cell>) {
        // If the Cell hasn't already been visited, depth-first search it
        if !self.seen.contains(ptr) {
            // Read the cell-pointer, and visit its [Instance]s before inserting it
            {
                let cell = ptr.read().unwrap();
                for inst in &cell.insts {
                    self.push(&inst.cell);
                }
            }
            // And insert the cell (pointer) itself
            self.seen.insert(Ptr::clone(ptr));
            self.stack.push(Ptr::clone(ptr));
        }
    }
}
