//!
//! # Waveguide Types
//!
//! Each technology publishes the waveguide cross-sections it can route.
//! Lookup failures carry the full list of available names, since a typo'd
//! type name is an operator error the diagnostic should make obvious.
//!

// Crates.io
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// Local imports
use crate::error::{PdkError, PdkResult};
use pic21raw::DbUnits;

/// # Waveguide Type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaveguideType {
    /// Type Name, as configuration refers to it
    pub name: String,
    /// Core width
    pub width: DbUnits,
    /// Bend radius
    pub radius: DbUnits,
}
impl WaveguideType {
    /// Create a new [WaveguideType] from micrometer dimensions
    pub fn new(name: impl Into<String>, width_um: f64, radius_um: f64) -> Self {
        Self {
            name: name.into(),
            width: DbUnits::from_um(width_um),
            radius: DbUnits::from_um(radius_um),
        }
    }
}

/// # Waveguide-Type Registry
///
/// Insertion-ordered, so diagnostics list types in a stable order.
#[derive(Debug, Clone, Default)]
pub struct WaveguideTypes(IndexMap<String, WaveguideType>);
impl WaveguideTypes {
    /// Register `wg`, indexed by its name
    pub fn add(&mut self, wg: WaveguideType) {
        self.0.insert(wg.name.clone(), wg);
    }
    /// Get the [WaveguideType] named `name`, if present
    pub fn get(&self, name: &str) -> Option<&WaveguideType> {
        self.0.get(name)
    }
    /// Get the [WaveguideType] named `name`, or fail with the list of
    /// every available name
    pub fn lookup(&self, name: &str) -> PdkResult<&WaveguideType> {
        self.get(name).ok_or_else(|| PdkError::UnknownWaveguideType {
            name: name.to_string(),
            available: self.names(),
        })
    }
    /// All registered names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}
