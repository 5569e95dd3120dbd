//!
//! # Unit Tests
//!
//! Covers the planner's contract: determinism, the laser-row fold, the
//! grid exception, the byte-exact label formats, fatal configuration
//! errors, and configuration-independent export naming.
//!

// Local imports
use super::config::Config;
use super::generate::{self, GenOptions};
use super::plan::{
    array_label, compute_layout, device_label, laser_ys, GcGrid, Op, Probes, RolePolicy,
    StandardRoles,
};
use super::{GenError, GenResult};
use pic21pdk::PdkError;
use pic21raw::{BoundBox, DbUnits, Point};

/// Host-reported measurements, as the standard component set produces them
fn probes() -> Probes {
    Probes {
        laser_bbox: BoundBox::from_points(Point::new(0, -150_000), Point::new(400_000, 150_000)),
        laser_pin: Point::new(400_000, 0),
        tree_first_out: Point::new(134_800, -422_750),
        wg_radius: DbUnits(5_000),
    }
}

#[test]
fn laser_rows_spread_evenly() {
    // Three lasers across a 7.8 mm die: quarter-points of the die height
    let die = DbUnits(7_800_000);
    let ys = laser_ys(3, die);
    assert_eq!(ys, vec![DbUnits(-1_950_000), DbUnits(0), DbUnits(1_950_000)]);
    // Relative to the bottom die edge: 1/4, 2/4, 3/4 of the height
    let bottom = -(die / 2);
    for (row, y) in ys.iter().enumerate() {
        assert_eq!(*y - bottom, die / 4 * (row as isize + 1));
    }
}

#[test]
fn grid_has_no_skips_in_a_single_row() {
    let grid = GcGrid {
        n_x: 6,
        n_y: 1,
        n_each: 8,
    };
    for k in grid.columns() {
        assert_eq!(grid.rows(k), 0..1);
    }
    assert_eq!(grid.sites().len(), 6 * 8);
}

#[test]
fn final_column_only_populates_two_rows() {
    let grid = GcGrid {
        n_x: 6,
        n_y: 4,
        n_each: 8,
    };
    for k in 0..5 {
        assert_eq!(grid.rows(k), 0..4);
    }
    assert_eq!(grid.rows(5), 0..2);
    // 5 full columns of 4 arrays, plus the partial column's 2
    assert_eq!(grid.sites().len(), (5 * 4 + 2) * 8);
}

#[test]
fn standard_roles_match_the_shipped_convention() {
    let roles = StandardRoles;
    for i in 0..8 {
        let role = roles.role(i);
        assert_eq!(role.chain, (1..=6).contains(&i), "chain at i={}", i);
        assert_eq!(role.attach, [1, 3, 5].contains(&i), "attach at i={}", i);
    }
    assert_eq!(roles.role(2).test_label, Some(0));
    assert_eq!(roles.role(4).test_label, Some(1));
    assert_eq!(roles.role(6).test_label, Some(2));
    assert_eq!(roles.role(0).test_label, None);
    assert_eq!(roles.role(7).test_label, None);
}

#[test]
fn device_labels_are_byte_exact() {
    // i=4, k=2, j=0: l = 4/2 - 1 = 1, so the label reads 2_3_1
    assert_eq!(device_label(1, 2, 0), "opt_in_TE_1310_device_2_3_1");
    assert_eq!(device_label(0, 0, 0), "opt_in_TE_1310_device_1_1_1");
    assert_eq!(array_label(0, 0), "opt_in_TE_1310_device_1_1");
    assert_eq!(array_label(5, 0), "opt_in_TE_1310_device_6_1");
}

#[test]
fn planned_labels_carry_the_contract_strings() -> GenResult<()> {
    let config = Config::default();
    let ops = compute_layout(&config, &probes())?;
    let labels: Vec<&str> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    // Per row: three device labels and one array label per array
    assert_eq!(labels.len(), config.n_lasers * 6 * 4);
    assert!(labels.contains(&"opt_in_TE_1310_device_2_3_1"));
    assert!(labels.contains(&"opt_in_TE_1310_device_6_1"));
    Ok(())
}

#[test]
fn compute_layout_is_deterministic() -> GenResult<()> {
    let config = Config::default();
    let first = compute_layout(&config, &probes())?;
    let second = compute_layout(&config, &probes())?;
    assert_eq!(first, second);
    assert!(!first.is_empty());
    Ok(())
}

#[test]
fn laser_placements_fold_upward() -> GenResult<()> {
    let config = Config::default();
    let ops = compute_layout(&config, &probes())?;
    let laser_ys: Vec<isize> = ops
        .iter()
        .filter_map(|op| match op {
            Op::Place {
                comp: super::plan::Component::Laser,
                trans,
            } => Some(trans.loc.y),
            _ => None,
        })
        .collect();
    assert_eq!(laser_ys, vec![-1_950_000, 0, 1_950_000]);
    Ok(())
}

#[test]
fn unsupported_tree_depth_is_fatal() {
    let config = Config {
        tree_depth: 3,
        ..Default::default()
    };
    match compute_layout(&config, &probes()) {
        Err(GenError::Pdk(PdkError::UnsupportedTreeDepth(3))) => (),
        other => panic!("expected UnsupportedTreeDepth, got {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn missing_cell_aborts_before_any_placement() {
    let config = Config::default();
    let mut config = config;
    config.cells.laser = "laser_1550nm_dfb".to_string();
    match generate::build(&config) {
        Err(GenError::Pdk(PdkError::MissingCell { name, .. })) => {
            assert_eq!(name, "laser_1550nm_dfb")
        }
        Err(other) => panic!("expected MissingCell, got {:?}", other),
        Ok(_) => panic!("expected the run to abort"),
    }
}

#[test]
fn unknown_waveguide_type_is_fatal_with_listing() {
    let config = Config {
        waveguide_type: "Strip TM 1550 nm".to_string(),
        ..Default::default()
    };
    match generate::build(&config) {
        Err(GenError::Pdk(PdkError::UnknownWaveguideType { available, .. })) => {
            assert!(!available.is_empty())
        }
        Err(other) => panic!("expected UnknownWaveguideType, got {:?}", other),
        Ok(_) => panic!("expected the run to abort"),
    }
}

#[test]
fn zero_counts_are_rejected() {
    let config = Config {
        n_lasers: 0,
        ..Default::default()
    };
    assert!(matches!(
        generate::build(&config),
        Err(GenError::Config(_))
    ));
}

#[test]
fn full_generation_counts() -> GenResult<()> {
    let config = Config::default();
    let (lib, top, ops, n_attach) = generate::build(&config)?;

    // Three rows of six arrays, three attachment slots each
    assert_eq!(n_attach, 3 * 6 * 3);
    assert!(!ops.is_empty());

    let top_cell = top.read()?;
    // Per array: 8 couplers, 6 straights, 6 tapers, 3 terminators,
    // 6 chain-bridge copies, 1 loopback copy. Per row: 6 arrays plus the
    // laser, the tree, and the laser-tree waveguide.
    assert_eq!(top_cell.insts.len(), 3 * (6 * 30 + 3));
    // Four labels per array
    assert_eq!(top_cell.annotations.len(), 3 * 6 * 4);
    // One floor-plan rectangle
    assert_eq!(top_cell.elems.len(), 1);

    // Library cells: 7 component/tree cells, 3 routed cells per row, the top
    assert_eq!(lib.cells.len(), 7 + 3 * 3 + 1);
    let gds = lib.to_gds()?;
    assert_eq!(gds.structs.len(), lib.cells.len());
    // The top cell is emitted last, after everything it references
    assert_eq!(gds.structs.last().unwrap().name, config.top_cell);
    Ok(())
}

#[test]
fn generation_is_deterministic_end_to_end() -> GenResult<()> {
    let config = Config::default();
    let (_, top_a, ops_a, _) = generate::build(&config)?;
    let (_, top_b, ops_b, _) = generate::build(&config)?;
    assert_eq!(ops_a, ops_b);

    let (a, b) = (top_a.read()?, top_b.read()?);
    assert_eq!(a.annotations, b.annotations);
    assert_eq!(a.insts.len(), b.insts.len());
    for (ia, ib) in a.insts.iter().zip(b.insts.iter()) {
        assert_eq!(ia.trans, ib.trans);
        assert_eq!(ia.inst_name, ib.inst_name);
    }
    Ok(())
}

#[test]
fn export_name_is_the_program_identity() -> GenResult<()> {
    let outdir = std::env::temp_dir().join(format!("pic21gen_test_{}", std::process::id()));
    let opts = GenOptions {
        outdir: outdir.clone(),
        identity: "pic21gen".to_string(),
        preview: true,
    };

    // Two different configurations, one output name
    let summary = generate::run(&Config::default(), &opts)?;
    assert_eq!(summary.gds.file_name().unwrap(), "pic21gen.gds");
    assert!(summary.gds.exists());
    assert_eq!(summary.svg.as_ref().unwrap().file_name().unwrap(), "pic21gen.svg");

    let config = Config {
        n_lasers: 1,
        top_cell: "SOMETHING_ELSE".to_string(),
        ..Default::default()
    };
    let summary = generate::run(&config, &opts)?;
    assert_eq!(summary.gds.file_name().unwrap(), "pic21gen.gds");

    std::fs::remove_dir_all(&outdir)?;
    Ok(())
}

#[test]
fn config_files_round_trip() -> GenResult<()> {
    let dir = std::env::temp_dir().join(format!("pic21gen_cfg_{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;

    let path = dir.join("shuttle.toml");
    std::fs::write(
        &path,
        "n_lasers = 2\ndie_size = 5000000\ntop_cell = \"SMALL_DIE\"\n",
    )?;
    let config = Config::open(&path)?;
    assert_eq!(config.n_lasers, 2);
    assert_eq!(config.die_size, DbUnits(5_000_000));
    assert_eq!(config.top_cell, "SMALL_DIE");
    // Unset fields keep their defaults
    assert_eq!(config.tree_depth, 4);

    // Malformed counts are rejected at load time
    let bad = dir.join("bad.toml");
    std::fs::write(&bad, "n_lasers = 0\n")?;
    assert!(matches!(Config::open(&bad), Err(GenError::Config(_))));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
