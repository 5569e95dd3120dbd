//!
//! # PDK Result and Error Types
//!
//! Every variant is fatal to a generation run: a partially-correct
//! fabrication layout is worse than no layout.
//!

// Local Imports
use pic21raw::LayoutError;

/// # [PdkError] Result Type
pub type PdkResult<T> = Result<T, PdkError>;

///
/// # PDK Error Enumeration
///
pub enum PdkError {
    /// Tools version below the technology's requirement
    ToolsVersion { found: String, required: String },
    /// Technology name not registered
    UnknownTechnology(String),
    /// Named component cell absent from the library
    MissingCell { name: String, library: String },
    /// Waveguide type not found; carries every available type name
    /// so the operator can correct the configuration
    UnknownWaveguideType {
        name: String,
        available: Vec<String>,
    },
    /// Splitter-tree depth without a supported arrangement
    UnsupportedTreeDepth(usize),
    /// Underlying layout-document error
    Layout(LayoutError),
}
impl std::fmt::Debug for PdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PdkError::ToolsVersion { found, required } => write!(
                f,
                "This PDK requires pic21 tools v{} or greater (found v{})",
                required, found
            ),
            PdkError::UnknownTechnology(name) => {
                write!(f, "Unknown technology \"{}\"", name)
            }
            PdkError::MissingCell { name, library } => write!(
                f,
                "Cannot load cell \"{}\" from library \"{}\"; please check the configuration carefully",
                name, library
            ),
            PdkError::UnknownWaveguideType { name, available } => write!(
                f,
                "Waveguide type \"{}\" not found in PDK waveguides: {:?}",
                name, available
            ),
            PdkError::UnsupportedTreeDepth(depth) => {
                write!(f, "Invalid tree_depth value {}", depth)
            }
            PdkError::Layout(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for PdkError {
    /// Display a [PdkError]
    /// Delegates to the [std::fmt::Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for PdkError {}

impl From<LayoutError> for PdkError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}
impl<T> From<std::sync::PoisonError<T>> for PdkError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Layout(e.into())
    }
}
