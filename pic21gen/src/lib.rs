//!
//! # PIC21 Shuttle Generator
//!
//! Parametric layout generation for a photonic test shuttle: DFB lasers
//! spread evenly across the die, a 1×2-splitter tree per laser, and a grid
//! of grating-coupler test arrays with routed waveguides, tapers, loopbacks,
//! and automated-test labels.
//!
//! The generation run is one linear batch against a single layout document:
//! configuration → placement plan → replay → export. Every failure along the
//! way is fatal; a partially-correct fabrication layout is worse than none.
//!

// Modules
pub mod config;
pub mod generate;
pub mod plan;

// Re-exports
pub use config::Config;
pub use generate::{run, GenOptions, RunSummary};
pub use pic21pdk as pdk;
pub use pic21raw as raw;

/// # [GenError] Result Type
pub type GenResult<T> = Result<T, GenError>;

///
/// # Generator Error Enumeration
///
pub enum GenError {
    /// Invalid or malformed configuration
    Config(String),
    /// PDK-level failure: version gate, missing cell, unknown waveguide type
    Pdk(pdk::PdkError),
    /// Layout-document failure
    Layout(raw::LayoutError),
    /// File IO failure
    Io(std::io::Error),
}
impl std::fmt::Debug for GenError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GenError::Config(msg) => write!(f, "Configuration error: {}", msg),
            GenError::Pdk(err) => err.fmt(f),
            GenError::Layout(err) => err.fmt(f),
            GenError::Io(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for GenError {
    /// Display a [GenError]
    /// Delegates to the [std::fmt::Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for GenError {}

impl From<pdk::PdkError> for GenError {
    fn from(e: pdk::PdkError) -> Self {
        Self::Pdk(e)
    }
}
impl From<raw::LayoutError> for GenError {
    fn from(e: raw::LayoutError) -> Self {
        Self::Layout(e)
    }
}
impl From<std::io::Error> for GenError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
impl From<toml::de::Error> for GenError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
impl From<serde_yaml::Error> for GenError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}
impl From<serde_json::Error> for GenError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
impl<T> From<std::sync::PoisonError<T>> for GenError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Layout(e.into())
    }
}

/// Unit Tests Module
#[cfg(test)]
mod tests;
