//!
//! # PIC21 Raw Layout
//!
//! The geometric representation layer of the pic21 stack.
//! Consists of primitive shapes, layers, pins, cells, and instances of other
//! layout cells, much akin to nearly any legacy layout system,
//! plus conversion of a [data::Library] to GDSII via the [gds21] crate
//! and a rough-and-ready SVG preview renderer.
//!
//! All coordinates are integers in database units (nanometers), and all
//! instance orientations are quarter-turn rotations, so that replaying the
//! same sequence of edits always produces a bit-identical layout.
//!

// Std-lib
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Crates.io
use by_address::ByAddress;

// Modules
pub mod bbox;
pub mod data;
pub mod error;
pub mod gds;
pub mod geom;
pub mod svg;
pub mod units;

// Re-exports
pub use bbox::{BoundBox, BoundBoxTrait};
pub use data::{
    Cell, Cells, Element, HAlign, Instance, Layer, LayerKey, LayerSpec, Layers, Library, Pin,
    TextElement, Units,
};
pub use error::{ErrorContext, LayoutError, LayoutResult};
pub use geom::{Dir, Path, Point, Polygon, Rect, Rotation, Shape, ShapeTrait, Trans, TransformTrait};
pub use units::DbUnits;

/// # Location Integer Type-Alias
///
/// Used for all layout spatial coordinates, in database units.
pub type Int = isize;

/// Internal type-alias for cell and library pointers.
#[derive(Debug, Default)]
pub struct Ptr<T>(ByAddress<Arc<RwLock<T>>>);
// All are thread-safe and reference-counted "smart pointers".
// None of the code *using* them is threaded; the locking exists for
// shared ownership between a [data::Library] and the instances referring
// into it, not for parallelism.
//
// [Ptr] also uses the [ByAddress] struct to allow for comparisons
// and hashes *by address* (i.e. pointer value).
impl<T> Ptr<T> {
    /// Pointer Constructor
    pub fn new(i: T) -> Self {
        Self(ByAddress(Arc::new(RwLock::new(i))))
    }
    /// Read the underlying data
    pub fn read(&self) -> LockResult<RwLockReadGuard<'_, T>> {
        self.0.read()
    }
    /// Write the underlying data
    pub fn write(&self) -> LockResult<RwLockWriteGuard<'_, T>> {
        self.0.write()
    }
}
impl<T> Clone for Ptr<T> {
    fn clone(&self) -> Self {
        Self(ByAddress::clone(&self.0))
    }
}
impl<T> PartialEq for Ptr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<T> Eq for Ptr<T> {}
impl<T> Hash for Ptr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

/// Unit Tests Module
#[cfg(test)]
mod tests;
