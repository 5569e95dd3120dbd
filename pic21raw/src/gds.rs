//!
//! # GDSII Export Module
//!
//! Converts a [Library] to a GDSII library ([gds21::GdsLibrary]) and writes
//! it to disk. Cells are emitted in dependency order, so every struct
//! definition precedes its references.
//!

// Std-Lib
use std::convert::TryFrom;

// Local imports
use crate::{
    data::{Cell, DepOrder, Element, Instance, TextElement},
    error::{ErrorContext, LayoutError, LayoutResult},
    geom::{Point, Rotation, Shape},
    Library,
};

/// # Gds21 Exporter
///
/// The sole valid top-level entity for conversion is always a [Library].
#[derive(Debug)]
pub struct GdsExporter<'lib> {
    lib: &'lib Library,
    ctx_stack: Vec<ErrorContext>,
}
impl<'lib> GdsExporter<'lib> {
    /// Convert [Library] `lib` to a [gds21::GdsLibrary]
    pub fn export(lib: &'lib Library) -> LayoutResult<gds21::GdsLibrary> {
        Self {
            lib,
            ctx_stack: vec![ErrorContext::Library(lib.name.clone())],
        }
        .export_lib()
    }
    /// Internal implementation method. Convert all, starting from our top-level [Library].
    fn export_lib(mut self) -> LayoutResult<gds21::GdsLibrary> {
        // Create a new Gds Library
        let mut gdslib = gds21::GdsLibrary::new(self.lib.name.clone());
        // Set its distance units
        gdslib.units = match self.lib.units {
            crate::data::Units::Nano => gds21::GdsUnits::new(1e-3, 1e-9),
            crate::data::Units::Micro => gds21::GdsUnits::new(1.0, 1e-6),
        };
        // And convert each of our cells into its structs, dependencies first
        for cellptr in DepOrder::order(self.lib) {
            let cell = cellptr.read()?;
            let strukt = self.export_cell(&cell)?;
            gdslib.structs.push(strukt);
        }
        Ok(gdslib)
    }
    /// Convert a [Cell] to a [gds21::GdsStruct] cell-definition
    fn export_cell(&mut self, cell: &Cell) -> LayoutResult<gds21::GdsStruct> {
        self.ctx_stack.push(ErrorContext::Cell(cell.name.clone()));
        let mut elems: Vec<gds21::GdsElement> =
            Vec::with_capacity(cell.elems.len() + cell.insts.len() + cell.annotations.len());
        // Convert each [Instance]
        for inst in &cell.insts {
            elems.push(self.export_instance(inst)?.into());
        }
        // Convert each geometric [Element]
        for elem in &cell.elems {
            elems.push(self.export_element(elem)?);
        }
        // And each [TextElement]
        for text in &cell.annotations {
            elems.push(self.export_annotation(text)?.into());
        }
        let mut strukt = gds21::GdsStruct::new(cell.name.clone());
        strukt.elems = elems;
        self.ctx_stack.pop();
        Ok(strukt)
    }
    /// Convert an [Instance] to a GDS instance, AKA [gds21::GdsStructRef]
    fn export_instance(&mut self, inst: &Instance) -> LayoutResult<gds21::GdsStructRef> {
        self.ctx_stack
            .push(ErrorContext::Instance(inst.inst_name.clone()));
        let cell_name = {
            let cell = inst.cell.read()?;
            cell.name.clone()
        };
        let rv = gds21::GdsStructRef {
            name: cell_name,
            xy: self.export_point(&inst.trans.loc)?,
            strans: self.export_strans(inst.trans.rotation),
            ..Default::default()
        };
        self.ctx_stack.pop();
        Ok(rv)
    }
    /// Convert a [Rotation] to an optional [gds21::GdsStrans].
    /// The unrotated case maps to `None`, GDSII's (far more compact) default.
    fn export_strans(&self, rotation: Rotation) -> Option<gds21::GdsStrans> {
        match rotation {
            Rotation::R0 => None,
            r => Some(gds21::GdsStrans {
                angle: Some(r.degrees()),
                ..Default::default()
            }),
        }
    }
    /// Convert an [Element] into a [gds21::GdsElement]
    fn export_element(&mut self, elem: &Element) -> LayoutResult<gds21::GdsElement> {
        self.ctx_stack.push(ErrorContext::Geometry);
        let spec = self.layer_spec(elem.layer)?;
        let rv: gds21::GdsElement = match &elem.inner {
            Shape::Rect(r) => {
                // GDS shapes include an explicit repetition of their origin for closure
                let (p0, p1) = (&r.p0, &r.p1);
                let xy = self.export_point_vec(&[
                    *p0,
                    Point::new(p1.x, p0.y),
                    *p1,
                    Point::new(p0.x, p1.y),
                    *p0,
                ])?;
                gds21::GdsBoundary {
                    layer: spec.layer,
                    datatype: spec.datatype,
                    xy,
                    ..Default::default()
                }
                .into()
            }
            Shape::Polygon(p) => {
                let mut pts = p.points.clone();
                // Add the origin a second time, to "close" the polygon
                pts.push(p.points[0]);
                gds21::GdsBoundary {
                    layer: spec.layer,
                    datatype: spec.datatype,
                    xy: self.export_point_vec(&pts)?,
                    ..Default::default()
                }
                .into()
            }
            Shape::Path(p) => gds21::GdsPath {
                layer: spec.layer,
                datatype: spec.datatype,
                xy: self.export_point_vec(&p.points)?,
                width: Some(i32::try_from(p.width)?),
                ..Default::default()
            }
            .into(),
        };
        self.ctx_stack.pop();
        Ok(rv)
    }
    /// Convert a [TextElement] to a [gds21::GdsTextElem]
    fn export_annotation(&mut self, text: &TextElement) -> LayoutResult<gds21::GdsTextElem> {
        let spec = self.layer_spec(text.layer)?;
        Ok(gds21::GdsTextElem {
            string: text.string.clone(),
            layer: spec.layer,
            texttype: spec.datatype,
            xy: self.export_point(&text.loc)?,
            ..Default::default()
        })
    }
    /// Convert a [Point] to a [gds21::GdsPoint], checking 32-bit bounds
    fn export_point(&self, pt: &Point) -> LayoutResult<gds21::GdsPoint> {
        let x = i32::try_from(pt.x)?;
        let y = i32::try_from(pt.y)?;
        Ok(gds21::GdsPoint::new(x, y))
    }
    /// Convert a vector of [Point]s
    fn export_point_vec(&self, pts: &[Point]) -> LayoutResult<Vec<gds21::GdsPoint>> {
        pts.iter().map(|p| self.export_point(p)).collect()
    }
    /// Look up the [crate::data::LayerSpec] for layer-key `key`
    fn layer_spec(&self, key: crate::data::LayerKey) -> LayoutResult<crate::data::LayerSpec> {
        let layers = self.lib.layers.read()?;
        match layers.get(key) {
            Some(layer) => Ok(layer.spec),
            None => self.err("Layer Not Defined"),
        }
    }
    /// Error creation helper
    fn err<T>(&self, msg: impl Into<String>) -> LayoutResult<T> {
        Err(LayoutError::Export {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
        })
    }
}

impl Library {
    /// Convert to a GDSII Library
    pub fn to_gds(&self) -> LayoutResult<gds21::GdsLibrary> {
        GdsExporter::export(self)
    }
    /// Convert to GDSII and save to file `fname`
    pub fn save_gds(&self, fname: impl AsRef<std::path::Path>) -> LayoutResult<()> {
        let gdslib = self.to_gds()?;
        gdslib.save(fname)?;
        Ok(())
    }
}
