//!
//! # Generator Configuration
//!
//! A fixed set of named parameters, loadable from TOML, YAML, or JSON by
//! file extension, with defaults matching the shipped arrangement.
//! Distances are integer database units (nanometers); counts are strictly
//! positive. No runtime flag changes geometry.
//!

// Std-Lib
use std::path::Path;

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{GenError, GenResult};
use pic21raw::DbUnits;

/// # Generator Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Technology name
    pub tech: String,
    /// Top cell name
    pub top_cell: String,
    /// Waveguide type used for every routed connection
    pub waveguide_type: String,
    /// Draw routed waveguides (disable for quick placement-only debugging runs)
    pub draw_waveguides: bool,
    /// Name of the externally-submitted design to drop into attachment
    /// slots. `None` caps each slot with a terminator.
    pub blank_design: Option<String>,
    /// Number of laser rows
    pub n_lasers: usize,
    /// Splitter-tree depth; 4 (fan-out 16) is the only supported arrangement
    pub tree_depth: usize,
    /// Die edge length
    pub die_size: DbUnits,
    /// Fiber-array pitch between grating couplers within an array
    pub dy_gcs: DbUnits,
    /// Grating couplers per array
    pub n_gcs_eacharray: usize,
    /// Horizontal pitch between array columns
    pub dx_gc_arrays: DbUnits,
    /// Vertical pitch between array rows
    pub dy_gc_arrays: DbUnits,
    /// Array-grid column count; defaults from `tree_depth` when omitted
    pub n_x_gc_arrays: Option<usize>,
    /// Array-grid row count; defaults from `tree_depth` when omitted
    pub n_y_gc_arrays: Option<usize>,
    /// Component-cell names, resolved in the technology's library
    pub cells: CellNames,
}
impl Default for Config {
    fn default() -> Config {
        Config {
            tech: "EBeam_1310".to_string(),
            top_cell: "SHUTTLE_TREE_1310".to_string(),
            waveguide_type: "Strip TE 1310 nm, w=350 nm (core-clad)".to_string(),
            draw_waveguides: true,
            blank_design: None,
            n_lasers: 3,
            tree_depth: 4,
            die_size: DbUnits(7_800_000),
            dy_gcs: DbUnits(127_000),
            n_gcs_eacharray: 8,
            dx_gc_arrays: DbUnits(495_000),
            dy_gc_arrays: DbUnits(1_010_000),
            n_x_gc_arrays: None,
            n_y_gc_arrays: None,
            cells: CellNames::default(),
        }
    }
}
impl Config {
    /// Load a [Config] from `fname`, choosing the format by file extension
    pub fn open(fname: impl AsRef<Path>) -> GenResult<Config> {
        let fname = fname.as_ref();
        let s = std::fs::read_to_string(fname)?;
        let config: Config = match fname.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&s)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&s)?,
            Some("json") => serde_json::from_str(&s)?,
            other => {
                return Err(GenError::Config(format!(
                    "Unsupported config format: {:?}. Must be one of (toml, yaml, json).",
                    other
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }
    /// Check the count and pitch invariants.
    /// All counts must be strictly positive, all pitches non-degenerate.
    pub fn validate(&self) -> GenResult<()> {
        let positive = [
            ("n_lasers", self.n_lasers),
            ("tree_depth", self.tree_depth),
            ("n_gcs_eacharray", self.n_gcs_eacharray),
            ("n_x_gc_arrays", self.n_x_gc_arrays.unwrap_or(1)),
            ("n_y_gc_arrays", self.n_y_gc_arrays.unwrap_or(1)),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(GenError::Config(format!(
                    "{} must be a positive integer",
                    name
                )));
            }
        }
        let distances = [
            ("die_size", self.die_size),
            ("dy_gcs", self.dy_gcs),
            ("dx_gc_arrays", self.dx_gc_arrays),
            ("dy_gc_arrays", self.dy_gc_arrays),
        ];
        for (name, value) in distances {
            if value.raw() <= 0 {
                return Err(GenError::Config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Component-cell names, per technology library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CellNames {
    pub laser: String,
    pub ybranch: String,
    pub gc: String,
    pub taper: String,
    pub waveguide: String,
    pub terminator: String,
}
impl Default for CellNames {
    fn default() -> CellNames {
        CellNames {
            laser: "laser_1310nm_dfb".to_string(),
            ybranch: "ybranch_te1310".to_string(),
            gc: "gc_te1310".to_string(),
            taper: "taper_350nm_2000nm".to_string(),
            waveguide: "waveguide_straight".to_string(),
            terminator: "terminator_te1310".to_string(),
        }
    }
}
