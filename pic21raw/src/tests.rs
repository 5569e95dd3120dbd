//!
//! # Unit Tests
//!

// Local imports
use super::data::{Cell, DepOrder, Instance, Layer, Pin, Units};
use super::geom::{Point, Rotation, Shape, Trans};
use super::{LayoutResult, Library, Ptr};

/// Build a library with one layer and one little two-pin cell
fn sample_lib() -> (Library, Ptr<Cell>) {
    let mut lib = Library::new("sample", Units::Nano);
    let wg_layer = lib.layers.write().unwrap().add(Layer::new("Si", 1, 0));
    let mut cell = Cell::new("coupler")
        .with_pin(Pin::new("opt1", Point::new(0, 0), Rotation::R0))
        .with_pin(Pin::new("opt2", Point::new(40_000, 0), Rotation::R0));
    cell.add_shape(wg_layer, Shape::rect(0, -175, 40_000, 175));
    let cell = lib.cells.insert(cell);
    (lib, cell)
}

#[test]
fn pin_points_follow_instance_transforms() -> LayoutResult<()> {
    let (_lib, cell) = sample_lib();

    let inst = Instance::new("i0", &cell, Trans::translate(1000, 2000));
    assert_eq!(inst.pin_point("opt1")?, Point::new(1000, 2000));
    assert_eq!(inst.pin_point("opt2")?, Point::new(41_000, 2000));
    assert_eq!(inst.pin_heading("opt2")?, Rotation::R0);

    // Rotated a half-turn, the far pin lands on the near side
    let inst = Instance::new("i1", &cell, Trans::new(Rotation::R180, 1000, 2000));
    assert_eq!(inst.pin_point("opt2")?, Point::new(-39_000, 2000));
    assert_eq!(inst.pin_heading("opt2")?, Rotation::R180);
    Ok(())
}

#[test]
fn missing_pin_is_an_error() {
    let (_lib, cell) = sample_lib();
    let inst = Instance::new("i0", &cell, Trans::identity());
    assert!(inst.pin_point("nope").is_err());
}

#[test]
fn instance_boundbox_under_rotation() -> LayoutResult<()> {
    let (_lib, cell) = sample_lib();
    let inst = Instance::new("i0", &cell, Trans::new(Rotation::R180, 100_000, 0));
    let bbox = inst.boundbox()?;
    assert_eq!(bbox.left(), 60_000);
    assert_eq!(bbox.right(), 100_000);
    assert_eq!(bbox.bottom(), -175);
    assert_eq!(bbox.top(), 175);
    Ok(())
}

#[test]
fn dep_order_puts_children_first() -> LayoutResult<()> {
    let mut lib = Library::new("dep", Units::Nano);
    let child = lib.cells.insert(Cell::new("child"));
    let mut top = Cell::new("top");
    top.insts
        .push(Instance::new("c0", &child, Trans::identity()));
    let top = lib.cells.insert(top);

    let order = DepOrder::order(&lib);
    assert_eq!(order.len(), 2);
    assert_eq!(order[0], child);
    assert_eq!(order[1], top);
    Ok(())
}

#[test]
fn gds_export() -> LayoutResult<()> {
    let (mut lib, cell) = sample_lib();
    let mut top = Cell::new("top");
    top.insts.push(Instance::new(
        "c0",
        &cell,
        Trans::new(Rotation::R180, 5000, 0),
    ));
    lib.cells.insert(top);

    let gds = lib.to_gds()?;
    assert_eq!(gds.structs.len(), 2);
    // Dependency order: the referenced cell first
    assert_eq!(gds.structs[0].name, "coupler");
    assert_eq!(gds.structs[1].name, "top");
    // The instance carries its rotation in an strans record
    let sref = match &gds.structs[1].elems[0] {
        gds21::GdsElement::GdsStructRef(s) => s,
        other => panic!("expected an sref, got {:?}", other),
    };
    assert_eq!(sref.name, "coupler");
    assert_eq!(sref.strans.as_ref().unwrap().angle, Some(180.0));
    Ok(())
}

#[test]
fn svg_preview_includes_annotations() -> LayoutResult<()> {
    let (mut lib, cell) = sample_lib();
    let text_layer = lib.layers.write().unwrap().add(Layer::new("Text", 10, 0));
    let mut top = Cell::new("top");
    top.insts
        .push(Instance::new("c0", &cell, Trans::identity()));
    top.annotations.push(crate::data::TextElement {
        string: "opt_in_TE_1310_device_1_1".into(),
        loc: Point::new(0, 0),
        size: 10_000,
        halign: crate::data::HAlign::Right,
        layer: text_layer,
    });
    let top = lib.cells.insert(top);

    let svg = crate::svg::SvgExporter::export(&lib, &top)?;
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("opt_in_TE_1310_device_1_1"));
    assert!(svg.contains("text-anchor=\"end\""));
    Ok(())
}
