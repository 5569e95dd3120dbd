//!
//! # Geometry Module
//!
//! Defines the core geometric types including [Point], [Shape], and [Trans],
//! and their core operations.
//!
//! Orientation is restricted to quarter-turn [Rotation]s, applied with exact
//! integer arithmetic. Fabrication layouts must be bit-for-bit regenerable
//! from configuration, and floating-point rotation matrices round.
//!

// Crates.io
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{bbox::BoundBoxTrait, Int};

/// # Point in two-dimensional layout-space
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Create a new [Point] which serves as an offset in direction `dir`
    pub fn offset(val: Int, dir: Dir) -> Self {
        match dir {
            Dir::Horiz => Self { x: val, y: 0 },
            Dir::Vert => Self { x: 0, y: val },
        }
    }
    /// Create a new point shifted by `x` in the x-dimension and by `y` in the y-dimension
    pub fn shift(&self, p: &Point) -> Point {
        Point {
            x: p.x + self.x,
            y: p.y + self.y,
        }
    }
    /// Get the coordinate associated with direction `dir`
    pub fn coord(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
    /// Create a new [Point], transformed from our original location by `trans`.
    /// Rotation is exact: quarter turns permute and negate coordinates,
    /// no floating-point intermediates.
    pub fn transform(&self, trans: &Trans) -> Point {
        let rotated = trans.rotation.rotate(self);
        Point {
            x: rotated.x + trans.loc.x,
            y: rotated.y + trans.loc.y,
        }
    }
}

/// Direction Enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Dir {
    Horiz,
    Vert,
}
impl Dir {
    /// Whichever direction we are, return the other one.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}
impl std::ops::Not for Dir {
    type Output = Self;
    /// Exclamation Operator returns the opposite direction
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// # Quarter-Turn Rotation
///
/// Also doubles as the heading of a [crate::data::Pin]:
/// [Rotation::R0] faces +x, [Rotation::R90] faces +y, and so on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}
impl Default for Rotation {
    fn default() -> Rotation {
        Rotation::R0
    }
}
impl Rotation {
    /// Number of counter-clockwise quarter turns
    fn quarters(self) -> u8 {
        match self {
            Self::R0 => 0,
            Self::R90 => 1,
            Self::R180 => 2,
            Self::R270 => 3,
        }
    }
    fn from_quarters(q: u8) -> Self {
        match q % 4 {
            0 => Self::R0,
            1 => Self::R90,
            2 => Self::R180,
            _ => Self::R270,
        }
    }
    /// Rotation angle in degrees, counter-clockwise
    pub fn degrees(self) -> f64 {
        f64::from(self.quarters()) * 90.0
    }
    /// Compose with `other`: first rotate by `other`, then by `self`.
    /// Quarter-turn rotations commute, so the order is academic.
    pub fn compose(self, other: Rotation) -> Rotation {
        Self::from_quarters(self.quarters() + other.quarters())
    }
    /// The rotation undoing `self`
    pub fn inverse(self) -> Rotation {
        Self::from_quarters(4 - self.quarters())
    }
    /// The opposite heading, i.e. a half turn away
    pub fn opposite(self) -> Rotation {
        self.compose(Self::R180)
    }
    /// Turn a quarter to the left (counter-clockwise)
    pub fn left(self) -> Rotation {
        self.compose(Self::R90)
    }
    /// Turn a quarter to the right (clockwise)
    pub fn right(self) -> Rotation {
        self.compose(Self::R270)
    }
    /// The unit step along this heading
    pub fn step(self) -> Point {
        match self {
            Self::R0 => Point::new(1, 0),
            Self::R90 => Point::new(0, 1),
            Self::R180 => Point::new(-1, 0),
            Self::R270 => Point::new(0, -1),
        }
    }
    /// Axis this heading runs along
    pub fn axis(self) -> Dir {
        match self {
            Self::R0 | Self::R180 => Dir::Horiz,
            Self::R90 | Self::R270 => Dir::Vert,
        }
    }
    /// Apply to a [Point], about the origin
    pub fn rotate(self, p: &Point) -> Point {
        match self {
            Self::R0 => *p,
            Self::R90 => Point::new(-p.y, p.x),
            Self::R180 => Point::new(-p.x, -p.y),
            Self::R270 => Point::new(p.y, -p.x),
        }
    }
}

/// # Integer Layout Transform
///
/// A quarter-turn [Rotation] about the origin, followed by translation to `loc`.
///
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trans {
    /// Rotation, applied first
    pub rotation: Rotation,
    /// X-Y Translation, applied second
    pub loc: Point,
}
impl Trans {
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self::default()
    }
    /// Create a transform with rotation `rotation` and translation to `(x, y)`
    pub fn new(rotation: Rotation, x: Int, y: Int) -> Self {
        Self {
            rotation,
            loc: Point::new(x, y),
        }
    }
    /// Translation by `(x, y)`, without rotation
    pub fn translate(x: Int, y: Int) -> Self {
        Self::new(Rotation::R0, x, y)
    }
    /// Create a new [Trans] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations
    /// relative to its top-level parent. Note this operation *is not* commutative.
    pub fn cascade(parent: &Trans, child: &Trans) -> Trans {
        Trans {
            rotation: parent.rotation.compose(child.rotation),
            loc: child.loc.transform(parent),
        }
    }
}

/// # Path
///
/// Open-ended geometric path with non-zero width.
/// Primarily consists of a series of ordered [Point]s.
/// Routed waveguides land in the layout as [Path]s.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Path {
    pub points: Vec<Point>,
    pub width: usize,
}
/// # Polygon
///
/// Closed n-sided polygon with arbitrary number of vertices.
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Polygon {
    pub points: Vec<Point>,
}
/// # Rectangle
///
/// Axis-aligned rectangle, specified by two opposite corners.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    /// Calculate our center-point
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }
}

/// # Shape
///
/// The primary geometric primitive comprising raw layout.
/// Variants include [Rect], [Polygon], and [Path].
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[enum_dispatch(ShapeTrait)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
    Path(Path),
}
impl Default for Shape {
    fn default() -> Self {
        Self::Rect(Rect::default())
    }
}

/// # ShapeTrait
///
/// Common shape operations, dispatched from the [Shape] enum to its variants by [enum_dispatch].
///
#[enum_dispatch]
pub trait ShapeTrait {
    /// Retrieve our "origin", or first [Point]
    fn point0(&self) -> Point;
    /// Indicate whether this shape is (more or less) horizontal or vertical.
    /// Primarily used for orienting label-text.
    fn orientation(&self) -> Dir;
    /// Shift coordinates by the (x,y) values specified in `pt`
    fn shift(&mut self, pt: &Point);
}

impl ShapeTrait for Rect {
    fn point0(&self) -> Point {
        self.p0
    }
    fn orientation(&self) -> Dir {
        let (p0, p1) = (&self.p0, &self.p1);
        if (p1.x - p0.x).abs() < (p1.y - p0.y).abs() {
            return Dir::Vert;
        }
        Dir::Horiz
    }
    fn shift(&mut self, pt: &Point) {
        self.p0.x += pt.x;
        self.p0.y += pt.y;
        self.p1.x += pt.x;
        self.p1.y += pt.y;
    }
}
impl ShapeTrait for Polygon {
    fn point0(&self) -> Point {
        self.points[0]
    }
    fn orientation(&self) -> Dir {
        Dir::Horiz
    }
    fn shift(&mut self, pt: &Point) {
        for p in self.points.iter_mut() {
            p.x += pt.x;
            p.y += pt.y;
        }
    }
}
impl ShapeTrait for Path {
    fn point0(&self) -> Point {
        self.points[0]
    }
    fn orientation(&self) -> Dir {
        Dir::Horiz
    }
    fn shift(&mut self, pt: &Point) {
        for p in self.points.iter_mut() {
            p.x += pt.x;
            p.y += pt.y;
        }
    }
}

pub trait TransformTrait {
    /// Apply the integer transform `trans`.
    /// Creates a new shape at a location equal to the transformation of our own.
    fn transform(&self, trans: &Trans) -> Self;
}
impl TransformTrait for Shape {
    fn transform(&self, trans: &Trans) -> Self {
        match self {
            Shape::Rect(r) => Shape::Rect(r.transform(trans)),
            Shape::Polygon(p) => Shape::Polygon(p.transform(trans)),
            Shape::Path(p) => Shape::Path(p.transform(trans)),
        }
    }
}
impl TransformTrait for Rect {
    fn transform(&self, trans: &Trans) -> Self {
        // Transformed corners may swap roles; re-normalization is the bbox's job
        Rect {
            p0: self.p0.transform(trans),
            p1: self.p1.transform(trans),
        }
    }
}
impl TransformTrait for Polygon {
    fn transform(&self, trans: &Trans) -> Self {
        Polygon {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}
impl TransformTrait for Path {
    fn transform(&self, trans: &Trans) -> Self {
        Path {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
            width: self.width,
        }
    }
}

impl Shape {
    /// Shorthand for a rectangular [Shape] from corner coordinates
    pub fn rect(x0: Int, y0: Int, x1: Int, y1: Int) -> Shape {
        Shape::Rect(Rect {
            p0: Point::new(x0, y0),
            p1: Point::new(x1, y1),
        })
    }
    /// Rectangular bounding box, via the [BoundBoxTrait]
    pub fn bbox(&self) -> crate::bbox::BoundBox {
        BoundBoxTrait::bbox(self)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn transform_identity() {
        let shape1 = Shape::rect(0, 0, 1, 1);
        let trans = Trans::identity();
        let shape2 = shape1.transform(&trans);
        assert_eq!(shape2, shape1);
    }
    #[test]
    fn transform_quarter_turns_are_exact() {
        let p = Point::new(3, 5);
        let r90 = Trans::new(Rotation::R90, 0, 0);
        assert_eq!(p.transform(&r90), Point::new(-5, 3));
        let r180 = Trans::new(Rotation::R180, 0, 0);
        assert_eq!(p.transform(&r180), Point::new(-3, -5));
        let r270 = Trans::new(Rotation::R270, 0, 0);
        assert_eq!(p.transform(&r270), Point::new(5, -3));
        // Four quarter turns come all the way back around
        let once = Rotation::R90.rotate(&p);
        let twice = Rotation::R90.rotate(&once);
        let thrice = Rotation::R90.rotate(&twice);
        assert_eq!(Rotation::R90.rotate(&thrice), p);
    }
    #[test]
    fn test_cascade() {
        let parent = Trans::new(Rotation::R90, 10, 0);
        let child = Trans::translate(1, 1);
        let p = Point::new(1, 1);

        // Cascade applies the child first, then the parent
        let cascade = Trans::cascade(&parent, &child);
        let direct = p.transform(&child).transform(&parent);
        assert_eq!(p.transform(&cascade), direct);
        assert_eq!(p.transform(&cascade), Point::new(8, 2));
    }
    #[test]
    fn heading_turns() {
        assert_eq!(Rotation::R0.left(), Rotation::R90);
        assert_eq!(Rotation::R0.right(), Rotation::R270);
        assert_eq!(Rotation::R270.left(), Rotation::R0);
        assert_eq!(Rotation::R180.opposite(), Rotation::R0);
        assert_eq!(Rotation::R90.step(), Point::new(0, 1));
    }
}
