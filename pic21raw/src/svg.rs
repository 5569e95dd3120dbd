//!
//! # SVG Preview Module
//!
//! Renders a [Library]'s top cell to a rough SVG preview: element outlines,
//! instance bounding boxes, and text annotations. A stand-in for the layout
//! editor screenshot that usually accompanies an export; nothing downstream
//! consumes it.
//!

// Std-Lib
use std::io::Write;

// Local imports
use crate::{
    bbox::BoundBox,
    data::{Cell, HAlign},
    error::LayoutResult,
    geom::Shape,
    Library, Ptr,
};

/// # SVG Preview Exporter
#[derive(Debug)]
pub struct SvgExporter {
    /// Scale from database units to SVG user units (µm)
    scale: f64,
    s: String,
}
impl SvgExporter {
    /// Render the cell `top` of library `lib` to an SVG string
    pub fn export(lib: &Library, top: &Ptr<Cell>) -> LayoutResult<String> {
        let scale = match lib.units {
            crate::data::Units::Nano => 1e-3,
            crate::data::Units::Micro => 1.0,
        };
        let mut myself = Self {
            scale,
            s: String::new(),
        };
        myself.export_top(top)?;
        Ok(myself.s)
    }
    fn export_top(&mut self, top: &Ptr<Cell>) -> LayoutResult<()> {
        let cell = top.read()?;
        let mut bbox = cell.bbox()?;
        if bbox.is_empty() {
            bbox = BoundBox::from_point(crate::geom::Point::new(0, 0));
        }
        bbox.expand(50_000);
        let (w, h) = bbox.size();
        // SVG's y-axis points down; flip the layout into place with a group transform
        self.s.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{:.1} {:.1} {:.1} {:.1}\">\n",
            bbox.left() as f64 * self.scale,
            -bbox.top() as f64 * self.scale,
            w as f64 * self.scale,
            h as f64 * self.scale,
        ));
        self.s.push_str("<g transform=\"scale(1,-1)\">\n");
        self.export_cell(&cell)?;
        self.s.push_str("</g>\n</svg>\n");
        Ok(())
    }
    fn export_cell(&mut self, cell: &Cell) -> LayoutResult<()> {
        // Elements as outlines
        for elem in &cell.elems {
            let filled = !matches!(elem.inner, Shape::Rect(_));
            self.rect(&elem.inner.bbox(), "#1c6fb8", filled)?;
        }
        // Instances as their bounding boxes
        for inst in &cell.insts {
            self.rect(&inst.boundbox()?, "#7a7a7a", false)?;
        }
        // Annotations as (un-flipped) text
        for text in &cell.annotations {
            let anchor = match text.halign {
                HAlign::Left => "start",
                HAlign::Center => "middle",
                HAlign::Right => "end",
            };
            self.s.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{:.1}\" text-anchor=\"{}\" transform=\"scale(1,-1)\">{}</text>\n",
                text.loc.x as f64 * self.scale,
                -text.loc.y as f64 * self.scale,
                text.size as f64 * self.scale,
                anchor,
                xml_escape(&text.string),
            ));
        }
        Ok(())
    }
    fn rect(&mut self, bbox: &BoundBox, color: &str, filled: bool) -> LayoutResult<()> {
        if bbox.is_empty() {
            return Ok(());
        }
        let (w, h) = bbox.size();
        let fill = if filled { color } else { "none" };
        self.s.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" fill-opacity=\"0.3\" stroke=\"{}\" stroke-width=\"0.5\"/>\n",
            bbox.left() as f64 * self.scale,
            bbox.bottom() as f64 * self.scale,
            w as f64 * self.scale,
            h as f64 * self.scale,
            fill,
            color,
        ));
        Ok(())
    }
}

/// Escape the XML-special characters of `s`
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl Library {
    /// Render cell `top` to an SVG preview at `fname`
    pub fn save_svg(
        &self,
        top: &Ptr<Cell>,
        fname: impl AsRef<std::path::Path>,
    ) -> LayoutResult<()> {
        let svg = SvgExporter::export(self, top)?;
        let mut file = std::fs::File::create(fname)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }
}
