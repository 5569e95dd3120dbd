//!
//! # Placement Planner
//!
//! Computes the ordered operation sequence of a generation run: placements,
//! pin-connection requests, reuse-cell builds and replications, attachment
//! points, and labels. Replayed against an empty document, the same
//! configuration always reproduces an identical layout.
//!
//! The index-space enumeration ([GcGrid]), the per-element role convention
//! ([RolePolicy]), the laser-row fold ([laser_ys]), and the label formats
//! are each separately testable pieces; [compute_layout] strings them
//! together in the one fixed order the layout depends on.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::config::Config;
use crate::{GenError, GenResult};
use pic21pdk::{PdkError, Turn, Turtle};
use pic21raw::{BoundBox, DbUnits, HAlign, Int, Point, Rotation, Trans};

/// Fixed x-offset between the die edge and the laser column
const LASER_X_OFFSET: Int = 450_000;
/// Gap between the splitter tree's first output and the array grid
const GC_ARRAY_X_GAP: Int = 100_000;
/// Drop from the tree input down to the array-grid base
const GC_ARRAY_Y_DROP: Int = 934_000 / 2;
/// Pull-back of the chained waveguide from its grating coupler
const CHAIN_PULLBACK: Int = 10_000;
/// Test-label text height
const LABEL_SIZE: DbUnits = DbUnits(10_000);

/// # Host-Reported Measurements
///
/// The few quantities the planner cannot derive from configuration alone:
/// cell bounding boxes and pin offsets, queried from the layout document
/// before planning begins.
#[derive(Debug, Clone, PartialEq)]
pub struct Probes {
    /// Laser cell bounding box, cell-local
    pub laser_bbox: BoundBox,
    /// Laser output-pin offset, cell-local
    pub laser_pin: Point,
    /// First splitter-tree output-pin offset, cell-local
    pub tree_first_out: Point,
    /// Bend radius of the routed waveguide type
    pub wg_radius: DbUnits,
}

/// Component kinds the planner places.
/// The executor resolves each to its loaded library cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Component {
    Laser,
    SplitterTree,
    GratingCoupler,
    WaveguideStraight,
    Taper,
    Terminator,
}
impl Component {
    /// Instance-name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Component::Laser => "laser",
            Component::SplitterTree => "tree",
            Component::GratingCoupler => "gc",
            Component::WaveguideStraight => "wg",
            Component::Taper => "taper",
            Component::Terminator => "term",
        }
    }
}

/// Key into the run's ordered instance list.
/// Allocated by the planner, resolved by the executor; both count the same
/// instance-creating operations, in the same order.
pub type InstKey = usize;

/// Reference to a named pin on a planned instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinRef {
    pub inst: InstKey,
    pub pin: String,
}
impl PinRef {
    pub fn new(inst: InstKey, pin: impl Into<String>) -> Self {
        Self {
            inst,
            pin: pin.into(),
        }
    }
}

/// # Layout Operation
///
/// One step of the generation sequence. Order matters: connection requests
/// refer to instances placed by earlier operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Op {
    /// Draw the die floor plan
    Floorplan { p0: Point, p1: Point },
    /// Place a component instance
    Place { comp: Component, trans: Trans },
    /// Place a component so `comp_pin` mates the pin `host` refers to,
    /// then nudge it by `shift`
    ConnectCell {
        host: PinRef,
        comp: Component,
        comp_pin: String,
        shift: Point,
    },
    /// Route a waveguide between two pins into a cell named `name`.
    /// With `instantiate`, the cell is placed in the top cell right away;
    /// otherwise it waits for [Op::PlaceRouted] transform copies.
    ConnectPins {
        name: String,
        from: PinRef,
        to: PinRef,
        waveguide: String,
        turtle_from: Turtle,
        turtle_to: Turtle,
        instantiate: bool,
    },
    /// Replicate the routed cell `name` by a transform copy
    PlaceRouted { name: String, trans: Trans },
    /// Mark an attachment point for an externally-submitted design
    Attach { at: PinRef },
    /// Insert a text label
    Label {
        text: String,
        loc: Point,
        size: DbUnits,
        halign: HAlign,
    },
}

/// Laser-row y-positions: a running fold, spacing `n_lasers` rows evenly
/// across the die height. Order matters; each position builds on the last.
pub fn laser_ys(n_lasers: usize, die_size: DbUnits) -> Vec<DbUnits> {
    let dy = die_size / (n_lasers as Int + 1);
    let mut y = -(die_size / 2);
    let mut ys = Vec::with_capacity(n_lasers);
    for _row in 0..n_lasers {
        y += dy;
        ys.push(y);
    }
    ys
}

/// # Grating-Coupler Array Grid
///
/// The (column, row, element) index space of the test-array grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GcGrid {
    /// Array columns
    pub n_x: usize,
    /// Array rows
    pub n_y: usize,
    /// Grating couplers per array
    pub n_each: usize,
}
/// One populated grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcSite {
    pub k: usize,
    pub j: usize,
    pub i: usize,
}
impl GcGrid {
    /// Column indices, left to right
    pub fn columns(&self) -> std::ops::Range<usize> {
        0..self.n_x
    }
    /// Row indices populated in column `k`.
    /// The final column only populates rows `j <= 1` — a partially-populated
    /// column carved into this one grid, not a general rule.
    pub fn rows(&self, k: usize) -> std::ops::Range<usize> {
        if self.n_x > 0 && k == self.n_x - 1 {
            0..self.n_y.min(2)
        } else {
            0..self.n_y
        }
    }
    /// Every populated (k, j, i) site, in generation order
    pub fn sites(&self) -> Vec<GcSite> {
        let mut sites = Vec::new();
        for k in self.columns() {
            for j in self.rows(k) {
                for i in 0..self.n_each {
                    sites.push(GcSite { k, j, i });
                }
            }
        }
        sites
    }
}

/// Per-element roles within one grating-coupler array
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteRole {
    /// Gets the routed waveguide + taper chain
    pub chain: bool,
    /// Attachment slot for an externally-submitted design
    pub attach: bool,
    /// Automated-test label, carrying the device index `l`
    pub test_label: Option<usize>,
}

/// Pluggable per-element role assignment
pub trait RolePolicy {
    fn role(&self, i: usize) -> SiteRole;
}

/// The shipped test-array convention: elements 1–6 get the waveguide+taper
/// chain; odd ones among them are attachment slots, even ones carry the
/// test label with `l = i/2 - 1`. Encodes this fabrication run's fiber-array
/// arrangement; there is no reason to expect it generalizes to other array
/// sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRoles;
impl RolePolicy for StandardRoles {
    fn role(&self, i: usize) -> SiteRole {
        let chain = (1..=6).contains(&i);
        SiteRole {
            chain,
            attach: chain && i % 2 == 1,
            test_label: if chain && i % 2 == 0 {
                Some(i / 2 - 1)
            } else {
                None
            },
        }
    }
}

/// Per-device automated-test label.
/// Byte-exact contract with downstream test equipment.
pub fn device_label(l: usize, k: usize, j: usize) -> String {
    format!("opt_in_TE_1310_device_{}_{}_{}", l + 1, k + 1, j + 1)
}
/// Per-array automated-test label
pub fn array_label(k: usize, j: usize) -> String {
    format!("opt_in_TE_1310_device_{}_{}", k + 1, j + 1)
}

/// Resolve the array-grid dimensions for `config`.
/// Only the depth-4 (fan-out 16) splitter tree has a supported arrangement;
/// any other depth is a fatal configuration error.
pub fn grid_dims(config: &Config) -> GenResult<GcGrid> {
    let (n_x, n_y) = match config.tree_depth {
        4 => (6, 1),
        d => return Err(GenError::Pdk(PdkError::UnsupportedTreeDepth(d))),
    };
    Ok(GcGrid {
        n_x: config.n_x_gc_arrays.unwrap_or(n_x),
        n_y: config.n_y_gc_arrays.unwrap_or(n_y),
        n_each: config.n_gcs_eacharray,
    })
}

/// Compute the full operation sequence for `config`, under the standard
/// role convention.
pub fn compute_layout(config: &Config, probes: &Probes) -> GenResult<Vec<Op>> {
    compute_layout_with(config, probes, &StandardRoles)
}

/// [compute_layout], with the role convention supplied by the caller
pub fn compute_layout_with(
    config: &Config,
    probes: &Probes,
    roles: &dyn RolePolicy,
) -> GenResult<Vec<Op>> {
    let grid = grid_dims(config)?;
    let die_edge = (config.die_size / 2).raw();
    let (dy_gcs, dx_arr, dy_arr) = (
        config.dy_gcs.raw(),
        config.dx_gc_arrays.raw(),
        config.dy_gc_arrays.raw(),
    );

    let mut ops = Vec::new();
    let mut next_key: InstKey = 0;
    let mut alloc = || {
        let key = next_key;
        next_key += 1;
        key
    };

    // Die floor plan
    ops.push(Op::Floorplan {
        p0: Point::new(-die_edge, -die_edge),
        p1: Point::new(die_edge, die_edge),
    });

    // The first chained element anchors the replicated chain cell
    let chain_anchor = (0..grid.n_each).find(|&i| roles.role(i).chain);

    let laser_x = -die_edge + probes.laser_bbox.top() + LASER_X_OFFSET;
    for (row, laser_y) in laser_ys(config.n_lasers, config.die_size).iter().enumerate() {
        let laser_y = laser_y.raw();

        // Laser, at absolute position
        let laser = alloc();
        ops.push(Op::Place {
            comp: Component::Laser,
            trans: Trans::translate(laser_x, laser_y),
        });

        // Splitter tree, hung off the laser's output pin
        let ytree_x = laser_x + probes.laser_bbox.right();
        let ytree_y = laser_y + probes.laser_pin.y;
        let tree = alloc();
        ops.push(Op::Place {
            comp: Component::SplitterTree,
            trans: Trans::translate(ytree_x, ytree_y),
        });

        // Waveguide, laser to tree
        ops.push(Op::ConnectPins {
            name: format!("wg_laser_tree_{}", row + 1),
            from: PinRef::new(laser, "opt1"),
            to: PinRef::new(tree, "opt1"),
            waveguide: config.waveguide_type.clone(),
            turtle_from: Turtle::empty().forward(10.0).turn(Turn::Left),
            turtle_to: Turtle::empty(),
            instantiate: true,
        });

        // Grating-coupler array grid for this row
        let x_gc_array = ytree_x + probes.tree_first_out.x + GC_ARRAY_X_GAP;
        let y_gc_array = ytree_y - GC_ARRAY_Y_DROP;
        let wg_gc_name = format!("wg_gc_{}", row + 1);
        let loopback_name = format!("wg_loopback_{}", row + 1);

        for k in grid.columns() {
            for j in grid.rows(k) {
                let mut gcs: Vec<InstKey> = Vec::with_capacity(grid.n_each);
                for i in 0..grid.n_each {
                    let x = x_gc_array + k as Int * dx_arr;
                    let y = y_gc_array + i as Int * dy_gcs + j as Int * dy_arr;

                    // Grating coupler
                    let gc = alloc();
                    ops.push(Op::Place {
                        comp: Component::GratingCoupler,
                        trans: Trans::new(Rotation::R180, x, y),
                    });
                    gcs.push(gc);

                    let role = roles.role(i);
                    if role.chain {
                        // Straight waveguide mated to the coupler, pulled
                        // back to leave a routable gap, then the taper
                        let wg = alloc();
                        ops.push(Op::ConnectCell {
                            host: PinRef::new(gc, "opt1"),
                            comp: Component::WaveguideStraight,
                            comp_pin: "opt1".to_string(),
                            shift: Point::new(-CHAIN_PULLBACK, 0),
                        });
                        let taper = alloc();
                        ops.push(Op::ConnectCell {
                            host: PinRef::new(wg, "opt2"),
                            comp: Component::Taper,
                            comp_pin: "opt1".to_string(),
                            shift: Point::new(0, 0),
                        });
                        // The gap bridge is routed once, then replicated
                        if k == 0 && j == 0 && chain_anchor == Some(i) {
                            ops.push(Op::ConnectPins {
                                name: wg_gc_name.clone(),
                                from: PinRef::new(wg, "opt1"),
                                to: PinRef::new(gc, "opt1"),
                                waveguide: config.waveguide_type.clone(),
                                turtle_from: Turtle::empty(),
                                turtle_to: Turtle::empty(),
                                instantiate: false,
                            });
                        }
                        if let Some(i0) = chain_anchor {
                            ops.push(Op::PlaceRouted {
                                name: wg_gc_name.clone(),
                                trans: Trans::translate(
                                    k as Int * dx_arr,
                                    j as Int * dy_arr + (i as Int - i0 as Int) * dy_gcs,
                                ),
                            });
                        }
                        if role.attach {
                            ops.push(Op::Attach {
                                at: PinRef::new(taper, "opt2"),
                            });
                            if config.blank_design.is_none() {
                                let _term = alloc();
                                ops.push(Op::ConnectCell {
                                    host: PinRef::new(taper, "opt2"),
                                    comp: Component::Terminator,
                                    comp_pin: "opt1".to_string(),
                                    shift: Point::new(0, 0),
                                });
                            }
                        }
                    }
                    // Automated test labels for the devices
                    if let Some(l) = role.test_label {
                        ops.push(Op::Label {
                            text: device_label(l, k, j),
                            loc: Point::new(x, y),
                            size: LABEL_SIZE,
                            halign: HAlign::Right,
                        });
                    }
                }

                // Waveguide for loopback: routed once at the grid origin,
                // replicated everywhere else by transform copies
                if k == 0 && j == 0 {
                    let swing = Turtle::empty()
                        .forward(10.0)
                        .forward_db(probes.wg_radius * 2isize)
                        .forward_db(DbUnits::from_um(60.0) + probes.wg_radius);
                    // Same swing, mirrored turn directions at either end
                    let with_turns = |t: Turn| {
                        let mut out = Turtle::empty();
                        for step in swing.steps.iter() {
                            out.steps.push(step.clone());
                            out = out.turn(t);
                        }
                        out
                    };
                    ops.push(Op::ConnectPins {
                        name: loopback_name.clone(),
                        from: PinRef::new(gcs[0], "opt1"),
                        to: PinRef::new(gcs[grid.n_each - 1], "opt1"),
                        waveguide: config.waveguide_type.clone(),
                        turtle_from: with_turns(Turn::Left),
                        turtle_to: with_turns(Turn::Right),
                        instantiate: false,
                    });
                }
                ops.push(Op::PlaceRouted {
                    name: loopback_name.clone(),
                    trans: Trans::translate(k as Int * dx_arr, j as Int * dy_arr),
                });

                // Per-array label, at the last element position
                let last = grid.n_each as Int - 1;
                ops.push(Op::Label {
                    text: array_label(k, j),
                    loc: Point::new(
                        x_gc_array + k as Int * dx_arr,
                        y_gc_array + last * dy_gcs + j as Int * dy_arr,
                    ),
                    size: LABEL_SIZE,
                    halign: HAlign::Right,
                });
            }
        }
    }
    Ok(ops)
}
