//!
//! # Generation Runner
//!
//! Stands up the technology and component set, computes the placement plan,
//! replays it — one linear batch, one writer — into the layout document,
//! and exports the result. Any failure aborts the run before export; no
//! cleanup of partially-inserted geometry is attempted.
//!

// Std-Lib
use std::collections::HashMap;
use std::path::PathBuf;

// Local imports
use crate::config::Config;
use crate::plan::{self, Component, Op, PinRef, Probes};
use crate::{GenError, GenResult};
use pic21pdk::{connect_cell, route_waveguide, ComponentLib, TechLayers, Technology, WaveguideType};
use pic21raw::{
    Cell, Instance, LayoutError, Library, Point, Ptr, Rect, Shape, TextElement, Trans, Units,
};

/// Options outside the geometric configuration: where output goes and what
/// it is called. The output base name is the program identity, independent
/// of configuration.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Output directory
    pub outdir: PathBuf,
    /// Program identity; becomes the output file base name
    pub identity: String,
    /// Also render an SVG preview
    pub preview: bool,
}
impl Default for GenOptions {
    fn default() -> GenOptions {
        GenOptions {
            outdir: PathBuf::from("."),
            identity: identity(),
            preview: false,
        }
    }
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Exported layout file
    pub gds: PathBuf,
    /// Preview image, when requested
    pub svg: Option<PathBuf>,
    /// Operations replayed
    pub n_ops: usize,
    /// Attachment points collected for externally-submitted designs
    pub n_attach: usize,
}

/// The invoking program's own identity: executable stem, package name as a
/// fallback. Output files are named from this, never from configuration.
pub fn identity() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

/// Generate the layout for `config` and export it per `opts`.
pub fn run(config: &Config, opts: &GenOptions) -> GenResult<RunSummary> {
    let (lib, top, ops, n_attach) = build(config)?;

    std::fs::create_dir_all(&opts.outdir)?;
    let gds = opts.outdir.join(format!("{}.gds", opts.identity));
    lib.save_gds(&gds)?;
    log::info!("exported layout to {}", gds.display());

    let svg = if opts.preview {
        let path = opts.outdir.join(format!("{}.svg", opts.identity));
        lib.save_svg(&top, &path)?;
        log::info!("rendered preview to {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(RunSummary {
        gds,
        svg,
        n_ops: ops.len(),
        n_attach,
    })
}

/// Generate the in-memory layout document for `config`, without exporting.
/// Returns the library, its top cell, the replayed operation sequence, and
/// the number of attachment points collected.
pub fn build(config: &Config) -> GenResult<(Library, Ptr<Cell>, Vec<Op>, usize)> {
    config.validate()?;

    // Environment checks, before any geometry work
    let tech = Technology::by_name(&config.tech)?;
    tech.check_tools_version()?;
    log::info!(
        "generating \"{}\" in technology \"{}\"",
        config.top_cell,
        tech.name
    );

    let mut lib = Library::new(config.top_cell.clone(), Units::Nano);
    let layers = tech.install(&mut lib)?;
    let components = ComponentLib::standard(tech.name.clone());
    let wg = tech.waveguide(&config.waveguide_type)?.clone();

    // Load the component set. A missing cell aborts here, with the top cell
    // still empty.
    let cells = config.cells.clone();
    let laser = components.create(&mut lib, &layers, &cells.laser)?;
    let gc = components.create(&mut lib, &layers, &cells.gc)?;
    let taper = components.create(&mut lib, &layers, &cells.taper)?;
    let terminator = components.create(&mut lib, &layers, &cells.terminator)?;
    let straight = components.create_straight(&mut lib, &layers, &cells.waveguide, 40.0, 0.35)?;
    let tree = pic21pdk::tree::y_splitter_tree(
        &mut lib,
        &layers,
        &components,
        &cells.ybranch,
        config.tree_depth,
        &wg,
        config.draw_waveguides,
    )?;

    // Host-reported measurements feeding the planner's arithmetic
    let probes = Probes {
        laser_bbox: laser.read()?.bbox()?,
        laser_pin: pin_loc(&laser, "opt1")?,
        tree_first_out: pin_loc(&tree, "opt_out_1")?,
        wg_radius: wg.radius,
    };

    let ops = plan::compute_layout(config, &probes)?;
    log::info!("replaying {} layout operations", ops.len());

    let top = lib.cells.insert(Cell::new(config.top_cell.clone()));
    let mut executor = Executor {
        lib: &mut lib,
        top: top.clone(),
        comps: CompMap {
            laser,
            tree,
            gc,
            straight,
            taper,
            terminator,
        },
        wg: &wg,
        layers: &layers,
        draw_waveguides: config.draw_waveguides,
        insts: Vec::new(),
        routed: HashMap::new(),
        attach: Vec::new(),
    };
    executor.replay(&ops)?;
    let n_attach = executor.attach.len();
    log::info!("collected {} design attachment points", n_attach);

    Ok((lib, top, ops, n_attach))
}

/// Cell-local location of pin `name` on `cell`
fn pin_loc(cell: &Ptr<Cell>, name: &str) -> GenResult<Point> {
    let guard = cell.read()?;
    let pin = guard.pin(name).ok_or_else(|| {
        GenError::Layout(LayoutError::NoSuchPin {
            cell: guard.name.clone(),
            pin: name.to_string(),
        })
    })?;
    Ok(pin.loc)
}

/// Loaded library cells, by planner [Component] kind
struct CompMap {
    laser: Ptr<Cell>,
    tree: Ptr<Cell>,
    gc: Ptr<Cell>,
    straight: Ptr<Cell>,
    taper: Ptr<Cell>,
    terminator: Ptr<Cell>,
}
impl CompMap {
    fn get(&self, comp: Component) -> &Ptr<Cell> {
        match comp {
            Component::Laser => &self.laser,
            Component::SplitterTree => &self.tree,
            Component::GratingCoupler => &self.gc,
            Component::WaveguideStraight => &self.straight,
            Component::Taper => &self.taper,
            Component::Terminator => &self.terminator,
        }
    }
}

/// # Plan Executor
///
/// Replays [Op]s against the layout document, tracking the ordered instance
/// list the planner's [PinRef]s index into.
struct Executor<'run> {
    lib: &'run mut Library,
    top: Ptr<Cell>,
    comps: CompMap,
    wg: &'run WaveguideType,
    layers: &'run TechLayers,
    draw_waveguides: bool,
    /// Instances in planner key order
    insts: Vec<Instance>,
    /// Routed waveguide cells, by name
    routed: HashMap<String, Ptr<Cell>>,
    /// Collected attachment points
    attach: Vec<PinRef>,
}
impl<'run> Executor<'run> {
    fn replay(&mut self, ops: &[Op]) -> GenResult<()> {
        for op in ops {
            self.apply(op)?;
        }
        Ok(())
    }
    fn apply(&mut self, op: &Op) -> GenResult<()> {
        match op {
            Op::Floorplan { p0, p1 } => {
                self.top
                    .write()?
                    .add_shape(self.layers.floorplan, Shape::Rect(Rect { p0: *p0, p1: *p1 }));
            }
            Op::Place { comp, trans } => {
                let inst = Instance::new(
                    format!("{}_{}", comp.prefix(), self.insts.len()),
                    self.comps.get(*comp),
                    *trans,
                );
                self.push_inst(inst)?;
            }
            Op::ConnectCell {
                host,
                comp,
                comp_pin,
                shift,
            } => {
                let mut inst = {
                    let host_inst = self.inst(host.inst)?;
                    connect_cell(
                        format!("{}_{}", comp.prefix(), self.insts.len()),
                        host_inst,
                        &host.pin,
                        self.comps.get(*comp),
                        comp_pin,
                    )?
                };
                inst.trans.loc = inst.trans.loc.shift(shift);
                self.push_inst(inst)?;
            }
            Op::ConnectPins {
                name,
                from,
                to,
                waveguide,
                turtle_from,
                turtle_to,
                instantiate,
            } => {
                if waveguide != &self.wg.name {
                    return Err(GenError::Config(format!(
                        "connection requested waveguide type \"{}\", run loaded \"{}\"",
                        waveguide, self.wg.name
                    )));
                }
                if !self.draw_waveguides {
                    return Ok(());
                }
                let cell = route_waveguide(
                    name.clone(),
                    self.inst(from.inst)?,
                    &from.pin,
                    self.inst(to.inst)?,
                    &to.pin,
                    self.wg,
                    turtle_from,
                    turtle_to,
                    self.layers,
                )?;
                let ptr = self.lib.cells.insert(cell);
                self.routed.insert(name.clone(), ptr.clone());
                if *instantiate {
                    self.top.write()?.insts.push(Instance::new(
                        format!("{}_i", name),
                        &ptr,
                        Trans::identity(),
                    ));
                }
            }
            Op::PlaceRouted { name, trans } => {
                if !self.draw_waveguides {
                    return Ok(());
                }
                let ptr = self.routed.get(name).ok_or_else(|| {
                    GenError::Config(format!(
                        "routed cell \"{}\" replicated before it was built",
                        name
                    ))
                })?;
                let inst_name = format!("{}_cp{}", name, self.top.read()?.insts.len());
                self.top
                    .write()?
                    .insts
                    .push(Instance::new(inst_name, ptr, *trans));
            }
            Op::Attach { at } => {
                // Recorded for the aggregation step; position checked valid
                let _ = self.inst(at.inst)?.pin_point(&at.pin)?;
                self.attach.push(at.clone());
            }
            Op::Label {
                text,
                loc,
                size,
                halign,
            } => {
                self.top.write()?.annotations.push(TextElement {
                    string: text.clone(),
                    loc: *loc,
                    size: size.raw(),
                    halign: *halign,
                    layer: self.layers.text,
                });
            }
        }
        Ok(())
    }
    /// The instance behind planner key `key`
    fn inst(&self, key: usize) -> GenResult<&Instance> {
        self.insts
            .get(key)
            .ok_or_else(|| GenError::Config(format!("unknown instance key {}", key)))
    }
    /// Track `inst` under the next planner key and place it in the top cell
    fn push_inst(&mut self, inst: Instance) -> GenResult<()> {
        self.top.write()?.insts.push(inst.clone());
        self.insts.push(inst);
        Ok(())
    }
}
