//!
//! # Splitter-Tree Sub-Layout
//!
//! Builds the recursive 1×2-splitter tree distributing one laser input to
//! `2^depth` outputs: a column of y-branches per stage, each output routed
//! to the next stage's input. The tree's input pin sits at the cell origin;
//! output pins are re-exported as `opt_out_1 .. opt_out_2^depth`, numbered
//! bottom to top.
//!

// Local imports
use crate::components::{ComponentLib, YBRANCH_LENGTH, YBRANCH_PORT_DY};
use crate::error::{PdkError, PdkResult};
use crate::route::{route_waveguide, Turtle};
use crate::tech::TechLayers;
use crate::waveguides::WaveguideType;
use pic21raw::{Cell, Instance, Int, Library, Pin, Point, Ptr, Rotation, Trans};

/// Horizontal pitch between splitter stages
const STAGE_PITCH: Int = 40_000;
/// Vertical pitch between the final stage's y-branches
const LEAF_PITCH: Int = 60_000;

/// Build a `depth`-stage splitter tree from y-branch cells named
/// `ybranch_name`, inserting it (and the y-branch) into `lib`.
/// With `draw_waveguides`, the inter-stage connections are routed and
/// drawn; otherwise only the branches are placed.
pub fn y_splitter_tree(
    lib: &mut Library,
    layers: &TechLayers,
    components: &ComponentLib,
    ybranch_name: &str,
    depth: usize,
    wg: &WaveguideType,
    draw_waveguides: bool,
) -> PdkResult<Ptr<Cell>> {
    if depth == 0 {
        return Err(PdkError::UnsupportedTreeDepth(0));
    }
    let ybranch = components.create(lib, layers, ybranch_name)?;

    // Y-branch center-line positions, stage by stage. Offsets halve each
    // stage, so every stage comes out sorted bottom-to-top.
    let mut stage_ys: Vec<Vec<Int>> = vec![vec![0]];
    for s in 0..depth.saturating_sub(1) {
        let offset = LEAF_PITCH << (depth - 2 - s);
        let next = stage_ys[s]
            .iter()
            .flat_map(|y| [y - offset, y + offset])
            .collect();
        stage_ys.push(next);
    }

    let mut tree = Cell::new(format!("splitter_tree_{}", depth))
        .with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R180));

    // Place the branches
    let mut insts: Vec<Vec<Instance>> = Vec::with_capacity(depth);
    for (s, ys) in stage_ys.iter().enumerate() {
        let mut stage = Vec::with_capacity(ys.len());
        for (t, y) in ys.iter().enumerate() {
            stage.push(Instance::new(
                format!("yb_{}_{}", s, t),
                &ybranch,
                Trans::translate(s as Int * STAGE_PITCH, *y),
            ));
        }
        insts.push(stage);
    }

    // Route each output to the next stage's input
    if draw_waveguides {
        for s in 0..depth.saturating_sub(1) {
            for (t, parent) in insts[s].iter().enumerate() {
                for (pin, child) in [("opt3", &insts[s + 1][2 * t]), ("opt2", &insts[s + 1][2 * t + 1])]
                {
                    let bridge = route_waveguide(
                        format!("tree_wg_{}_{}_{}", s, t, pin),
                        parent,
                        pin,
                        child,
                        "opt1",
                        wg,
                        &Turtle::empty(),
                        &Turtle::empty(),
                        layers,
                    )?;
                    // Drawn directly into the tree cell, not as sub-cells
                    tree.elems.extend(bridge.elems);
                }
            }
        }
    }

    // Re-export the final stage's outputs, numbered bottom to top
    let out_x = (depth as Int - 1) * STAGE_PITCH + YBRANCH_LENGTH;
    for (t, y) in stage_ys[depth - 1].iter().enumerate() {
        tree.pins.push(Pin::new(
            format!("opt_out_{}", 2 * t + 1),
            Point::new(out_x, y - YBRANCH_PORT_DY),
            Rotation::R0,
        ));
        tree.pins.push(Pin::new(
            format!("opt_out_{}", 2 * t + 2),
            Point::new(out_x, y + YBRANCH_PORT_DY),
            Rotation::R0,
        ));
    }

    for stage in insts {
        tree.insts.extend(stage);
    }
    Ok(lib.cells.insert(tree))
}
