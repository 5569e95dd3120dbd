//!
//! # Technology Definitions
//!
//! A [Technology] names the fabrication process: its database unit, its
//! layer map, the waveguide types it offers, and the minimum tools version
//! it requires. Lookup is by name and fails closed.
//!

// Local imports
use crate::error::{PdkError, PdkResult};
use crate::waveguides::{WaveguideType, WaveguideTypes};
use pic21raw::{Layer, LayerKey, Library};

/// Version of the pic21 tool stack, checked against each technology's
/// requirement before any geometry work begins.
pub const TOOLS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Keys for the technology layers a generation run draws on
#[derive(Debug, Clone, Copy)]
pub struct TechLayers {
    /// Waveguide core
    pub waveguide: LayerKey,
    /// Device recognition / black-box outline
    pub devrec: LayerKey,
    /// Text annotation layer, read by automated test equipment
    pub text: LayerKey,
    /// Floor plan outline
    pub floorplan: LayerKey,
}

/// # Technology
#[derive(Debug, Clone)]
pub struct Technology {
    /// Technology Name
    pub name: String,
    /// Database unit, in micrometers (0.001 ⇒ nanometer grid)
    pub dbu: f64,
    /// Minimum required tools version (semver)
    pub min_tools_version: String,
    /// Layer definitions
    layers: Vec<Layer>,
    /// Waveguide types offered by the process
    waveguides: WaveguideTypes,
}
impl Technology {
    /// Look up a [Technology] by name. Fails closed on unknown names.
    pub fn by_name(name: &str) -> PdkResult<Technology> {
        match name {
            "EBeam_1310" => Ok(Self::ebeam_1310()),
            _ => Err(PdkError::UnknownTechnology(name.to_string())),
        }
    }
    /// The e-beam 1310 nm silicon-photonics technology
    fn ebeam_1310() -> Technology {
        let mut waveguides = WaveguideTypes::default();
        waveguides.add(WaveguideType::new(
            "Strip TE 1310 nm, w=350 nm (core-clad)",
            0.35,
            5.0,
        ));
        waveguides.add(WaveguideType::new("Strip TE 1310 nm, w=800 nm", 0.8, 5.0));
        Technology {
            name: "EBeam_1310".to_string(),
            dbu: 0.001,
            min_tools_version: "0.1.0".to_string(),
            layers: vec![
                Layer::new("Si", 1, 0),
                Layer::new("DevRec", 68, 0),
                Layer::new("Text", 10, 0),
                Layer::new("FloorPlan", 99, 0),
            ],
            waveguides,
        }
    }
    /// Check the running tools version against our requirement.
    /// Raised before any geometry work; there is no degraded mode.
    pub fn check_tools_version(&self) -> PdkResult<()> {
        self.check_tools_version_against(TOOLS_VERSION)
    }
    /// Inner version check, parameterized for testability
    pub(crate) fn check_tools_version_against(&self, found: &str) -> PdkResult<()> {
        let found_v = semver::Version::parse(found);
        let required_v = semver::Version::parse(&self.min_tools_version);
        match (found_v, required_v) {
            (Ok(f), Ok(r)) if f >= r => Ok(()),
            _ => Err(PdkError::ToolsVersion {
                found: found.to_string(),
                required: self.min_tools_version.clone(),
            }),
        }
    }
    /// Install our layer definitions into `lib`, returning the keys a
    /// generation run needs.
    pub fn install(&self, lib: &mut Library) -> PdkResult<TechLayers> {
        let mut layers = lib.layers.write()?;
        for layer in &self.layers {
            layers.add(layer.clone());
        }
        let key = |name: &str| -> PdkResult<LayerKey> {
            layers.keyname(name).ok_or_else(|| {
                PdkError::Layout(pic21raw::LayoutError::msg(format!(
                    "Technology \"{}\" lacks required layer \"{}\"",
                    self.name, name
                )))
            })
        };
        Ok(TechLayers {
            waveguide: key("Si")?,
            devrec: key("DevRec")?,
            text: key("Text")?,
            floorplan: key("FloorPlan")?,
        })
    }
    /// Look up waveguide type `name`.
    /// A failed lookup reports every available type name.
    pub fn waveguide(&self, name: &str) -> PdkResult<&WaveguideType> {
        self.waveguides.lookup(name)
    }
    /// All waveguide-type names, in registration order
    pub fn waveguide_names(&self) -> Vec<String> {
        self.waveguides.names()
    }
}
