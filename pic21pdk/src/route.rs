//!
//! # Pin-To-Pin Waveguide Routing
//!
//! Deterministic Manhattan routing between two named instance pins,
//! guided by "turtle" hints: relative move/turn segments walked outward
//! from each pin before the two open ends are joined.
//!
//! The routed waveguide lands in its own [Cell], as a [pic21raw::Path] on
//! the technology's waveguide layer. Callers either instance that cell in
//! place, or replicate it across an array by transform copies.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::error::{PdkError, PdkResult};
use crate::tech::TechLayers;
use crate::waveguides::WaveguideType;
use pic21raw::{Cell, DbUnits, Dir, Instance, LayoutError, Path, Point, Ptr, Rotation, Shape, Trans};

/// Turn direction of a turtle hint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// One turtle segment: move ahead, or turn in place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurtleStep {
    Forward(DbUnits),
    Turn(Turn),
}

/// # Turtle Routing Hint
///
/// A sequence of relative move/turn segments, walked from a pin outward.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turtle {
    pub steps: Vec<TurtleStep>,
}
impl Turtle {
    /// An empty hint: the router joins straight from the pin
    pub fn empty() -> Self {
        Self::default()
    }
    /// Append a forward move of `um` micrometers.
    /// Consumes and returns `self` to enable chaining.
    pub fn forward(mut self, um: f64) -> Self {
        self.steps.push(TurtleStep::Forward(DbUnits::from_um(um)));
        self
    }
    /// Append a forward move of `d` database units
    pub fn forward_db(mut self, d: DbUnits) -> Self {
        self.steps.push(TurtleStep::Forward(d));
        self
    }
    /// Append a turn
    pub fn turn(mut self, t: Turn) -> Self {
        self.steps.push(TurtleStep::Turn(t));
        self
    }
}

/// Walk `turtle` from `start` with `heading`.
/// Returns the visited points, the final position, and the final heading.
fn walk(turtle: &Turtle, start: Point, heading: Rotation) -> (Vec<Point>, Point, Rotation) {
    let mut pts = Vec::new();
    let mut cur = start;
    let mut heading = heading;
    for step in &turtle.steps {
        match step {
            TurtleStep::Forward(d) => {
                let s = heading.step();
                cur = Point::new(cur.x + s.x * d.raw(), cur.y + s.y * d.raw());
                pts.push(cur);
            }
            TurtleStep::Turn(Turn::Left) => heading = heading.left(),
            TurtleStep::Turn(Turn::Right) => heading = heading.right(),
        }
    }
    (pts, cur, heading)
}

/// Join two open route-ends with one or two Manhattan corners
fn join(pa: Point, ha: Rotation, pb: Point, hb: Rotation) -> Vec<Point> {
    if ha.axis() != hb.axis() {
        // One corner: continue along `ha`, then turn onto `hb`'s axis
        let corner = match ha.axis() {
            Dir::Horiz => Point::new(pb.x, pa.y),
            Dir::Vert => Point::new(pa.x, pb.y),
        };
        vec![corner]
    } else {
        // Same axis: a Z through the midpoint of the crossing coordinate
        match ha.axis() {
            Dir::Horiz => {
                let mid = (pa.x + pb.x) / 2;
                vec![Point::new(mid, pa.y), Point::new(mid, pb.y)]
            }
            Dir::Vert => {
                let mid = (pa.y + pb.y) / 2;
                vec![Point::new(pa.x, mid), Point::new(pb.x, mid)]
            }
        }
    }
}

/// Connect two named pins across two instances with an auto-routed
/// waveguide of type `wg`, guided by per-end turtle hints.
///
/// Returns the waveguide [Cell]; pin existence on either instance is
/// validated here, not by the caller.
pub fn route_waveguide(
    name: impl Into<String>,
    a: &Instance,
    pin_a: &str,
    b: &Instance,
    pin_b: &str,
    wg: &WaveguideType,
    turtle_a: &Turtle,
    turtle_b: &Turtle,
    layers: &TechLayers,
) -> PdkResult<Cell> {
    let start = a.pin_point(pin_a)?;
    let ha = a.pin_heading(pin_a)?;
    let end = b.pin_point(pin_b)?;
    let hb = b.pin_heading(pin_b)?;

    let (pts_a, cur_a, ha) = walk(turtle_a, start, ha);
    let (mut pts_b, cur_b, hb) = walk(turtle_b, end, hb);

    let mut points = vec![start];
    points.extend(pts_a);
    points.extend(join(cur_a, ha, cur_b, hb));
    pts_b.reverse();
    points.extend(pts_b);
    points.push(end);
    points.dedup();

    let mut cell = Cell::new(name);
    cell.add_shape(
        layers.waveguide,
        Shape::Path(Path {
            points,
            width: wg.width.raw() as usize,
        }),
    );
    Ok(cell)
}

/// Instantiate `cell` so that its pin `cell_pin` mates the pin `host_pin`
/// of the already-placed `host` instance: coincident locations, opposed
/// headings. Returns the new (not-yet-inserted) [Instance].
pub fn connect_cell(
    inst_name: impl Into<String>,
    host: &Instance,
    host_pin: &str,
    cell: &Ptr<Cell>,
    cell_pin: &str,
) -> PdkResult<Instance> {
    let target = host.pin_point(host_pin)?;
    let th = host.pin_heading(host_pin)?;
    let (pin_loc, pin_heading) = {
        let guard = cell.read()?;
        let pin = guard
            .pin(cell_pin)
            .ok_or_else(|| {
                PdkError::Layout(LayoutError::NoSuchPin {
                    cell: guard.name.clone(),
                    pin: cell_pin.to_string(),
                })
            })?
            .clone();
        (pin.loc, pin.heading)
    };
    // Rotate until the mating pin heads straight back at the host pin
    let rotation = th.opposite().compose(pin_heading.inverse());
    let rotated = rotation.rotate(&pin_loc);
    let loc = Point::new(target.x - rotated.x, target.y - rotated.y);
    Ok(Instance::new(inst_name, cell, Trans { rotation, loc }))
}
