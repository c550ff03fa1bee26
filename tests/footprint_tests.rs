use easyeda_kiconv::{
    converter::footprint::{FootprintAccumulator, FootprintEnv, build_record, fold_records},
    error::SkipReason,
    kicad_models::{Drill, FpPad, FpPrimitive, FpShape, FpTextKind, Layer, PadKind},
    model3d::LibraryModelResolver,
    transform::TransformContext,
};
use glam::DVec3;

fn fold_at(origin: (f64, f64), lines: &[&str]) -> FootprintAccumulator {
    let env = FootprintEnv {
        ctx: TransformContext::footprint(origin.0, origin.1),
        resolver: None,
    };
    fold_records(lines, &env)
}

fn only_pad(acc: &FootprintAccumulator) -> FpPad {
    match acc.primitives() {
        [FpPrimitive::Pad(pad)] => pad.clone(),
        other => panic!("expected a single pad, got {:?}", other),
    }
}

fn close(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
}

#[test]
fn test_track_emits_one_line_per_segment() {
    let acc = fold_at((0.0, 0.0), &["TRACK~1~3~~0 0 10 0 10 10 20 10~gge1~0"]);
    assert_eq!(acc.primitives().len(), 3);
    for primitive in acc.primitives() {
        match primitive {
            FpPrimitive::Line { width, layer, .. } => {
                assert_eq!(*width, 0.25);
                assert_eq!(*layer, Layer::FSilkS);
            }
            other => panic!("expected a line, got {:?}", other),
        }
    }
}

#[test]
fn test_track_without_layer_code_uses_silkscreen() {
    let acc = fold_at((0.0, 0.0), &["TRACK~3~100 100 200 100~"]);
    match acc.primitives() {
        [FpPrimitive::Line { start, end, layer, .. }] => {
            assert_eq!(*start, (25.4, 25.4));
            assert_eq!(*end, (50.8, 25.4));
            assert_eq!(*layer, Layer::FSilkS);
        }
        other => panic!("expected one line, got {:?}", other),
    }
}

#[test]
fn test_through_hole_pad_has_drill() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~ELLIPSE~4000~3000~6~6~11~~1~1.8~4000 3000~0~gge5~0~~Y~0"],
    );
    let pad = only_pad(&acc);
    assert_eq!(pad.kind, PadKind::ThroughHole);
    assert_eq!(pad.shape, FpShape::Circle);
    assert_eq!(pad.drill, Some(Drill::Round(0.91)));
    assert_eq!(pad.layers, vec![Layer::AllCu, Layer::AllMask]);
    assert_eq!(pad.pos, (0.0, 0.0));
    assert_eq!(pad.size, (1.52, 1.52));
}

#[test]
fn test_slot_hole_becomes_oval_drill() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~OVAL~4000~3000~6~10~11~~2~1.8~4000 3000~90~gge7~4~~Y"],
    );
    let pad = only_pad(&acc);
    assert_eq!(pad.drill, Some(Drill::Oval(1.02, 0.91)));
    assert_eq!(pad.rotation, 90.0);
    assert_eq!(pad.number, "2");
}

#[test]
fn test_smd_pad_has_no_drill() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~RECT~4010~3000~4~6~1~~3~0~4008 2997 4012 2997~0~gge6~0"],
    );
    let pad = only_pad(&acc);
    assert_eq!(pad.kind, PadKind::Smd);
    assert_eq!(pad.drill, None);
    assert_eq!(pad.layers, vec![Layer::FCu, Layer::FPaste, Layer::FMask]);
    assert_eq!(pad.pos, (2.54, 0.0));
}

#[test]
fn test_bottom_smd_pad_uses_bottom_layers() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~RECT~4010~3000~4~6~2~~3~0~4008 2997 4012 2997~0~gge6~0"],
    );
    let pad = only_pad(&acc);
    assert_eq!(pad.layers, vec![Layer::BCu, Layer::BPaste, Layer::BMask]);
}

#[test]
fn test_polygon_pad_outline_is_pad_relative() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~POLYGON~4010~3000~4~4~1~~4~0~4008 2998 4012 2998 4012 3002 4008 3002~0~gge8~0"],
    );
    let pad = only_pad(&acc);
    assert_eq!(pad.shape, FpShape::Custom);
    assert_eq!(pad.polygon.len(), 4);
    assert_eq!(pad.polygon[0], (-0.51, -0.51));
    assert_eq!(pad.polygon[1], (0.51, -0.51));
}

#[test]
fn test_unknown_pad_shape_falls_back_to_oval() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~STAR~4000~3000~4~4~1~~1~0~4000 3000~0~gge9~0"],
    );
    assert_eq!(only_pad(&acc).shape, FpShape::Oval);
}

#[test]
fn test_circle_with_unknown_layer_falls_back() {
    let acc = fold_at((4000.0, 3000.0), &["CIRCLE~4000~3000~5~1~77~gge9~0"]);
    match acc.primitives() {
        [FpPrimitive::Circle { radius, layer, .. }] => {
            assert_eq!(*radius, 1.27);
            assert_eq!(*layer, Layer::FSilkS);
        }
        other => panic!("expected a circle, got {:?}", other),
    }
}

#[test]
fn test_circle_on_pad_meta_layer_is_suppressed() {
    let env = FootprintEnv {
        ctx: TransformContext::footprint(4000.0, 3000.0),
        resolver: None,
    };
    let result = build_record("CIRCLE~4000~3000~5~1~100~gge9~0", &env);
    assert!(matches!(result, Err(SkipReason::Suppressed(_))));
}

#[test]
fn test_arc_path_is_found_in_either_field() {
    let lines = [
        "ARC~1~3~~M 4000 3000 A 10 10 0 0 1 4020 3000~~gge9~0",
        "ARC~1~3~net~M 4000 3000 A 10 10 0 0 1 4020 3000~gge9~0",
    ];
    for line in lines {
        let acc = fold_at((4000.0, 3000.0), &[line]);
        match acc.primitives() {
            [FpPrimitive::Arc { center, start, end, layer, .. }] => {
                assert!(close(*center, (2.54, 0.0)), "center {:?}", center);
                // Emitted from the path's end back to its start.
                assert!(close(*start, (5.08, 0.0)));
                assert!(close(*end, (0.0, 0.0)));
                assert_eq!(*layer, Layer::FSilkS);
            }
            other => panic!("expected one arc from {:?}, got {:?}", line, other),
        }
    }
}

#[test]
fn test_arc_without_arc_segment_is_skipped() {
    let acc = fold_at((4000.0, 3000.0), &["ARC~1~3~~M 4000 3000 L 4020 3000~gge9~0"]);
    assert!(acc.primitives().is_empty());
}

#[test]
fn test_inert_and_unknown_records_are_skipped() {
    let acc = fold_at(
        (0.0, 0.0),
        &[
            "SOLIDREGION~3~~M 0 0 L 10 0 L 10 10 Z~solid~gge1~~~~0",
            "VIA~4000~3000~2.4~~0.6~gge2~0",
            "HOLE~4000~3000~2~gge3~0",
            "",
            "CIRCLE~abc~3000~5~1~3~gge9~0",
        ],
    );
    assert!(acc.primitives().is_empty());
    assert!(acc.bbox().is_empty());
}

#[test]
fn test_bbox_covers_pads_and_tracks_only() {
    let acc = fold_at(
        (0.0, 0.0),
        &[
            "PAD~RECT~10~20~4~6~1~~1~0~8 17 12 17~0~gge6~0",
            "TRACK~1~3~~-30 5 40 60~gge1~0",
            "RECT~-500~-500~1000~1000~3~gge3~0",
            "CIRCLE~900~900~5~1~3~gge9~0",
        ],
    );
    let bbox = acc.bbox();
    for point in [(2.54, 5.08), (-7.62, 1.27), (10.16, 15.24)] {
        assert!(bbox.contains(point), "{:?} outside {:?}", point, bbox);
    }
    assert_eq!(bbox.min_x, -7.62);
    assert_eq!(bbox.max_x, 10.16);
    assert_eq!(bbox.min_y, 1.27);
    assert_eq!(bbox.max_y, 15.24);
}

#[test]
fn test_pad_outline_widens_bbox() {
    let acc = fold_at((0.0, 0.0), &["PAD~OVAL~100~100~20~10~1~~1~0~100 100~0~gge1~0"]);
    let pad = only_pad(&acc);
    let bbox = acc.bbox();
    assert_eq!(pad.pos, (25.4, 25.4));
    assert_eq!(pad.size, (5.08, 2.54));
    assert_eq!(bbox.min_x, 22.86);
    assert_eq!(bbox.max_x, 27.94);
    assert_eq!(bbox.min_y, 24.13);
    assert_eq!(bbox.max_y, 26.67);
    assert!(bbox.contains((22.86, 24.77)));
}

#[test]
fn test_rotated_pad_widens_bbox_along_its_turned_axes() {
    let acc = fold_at((0.0, 0.0), &["PAD~RECT~100~100~20~10~1~~1~0~100 100~90~gge1~0"]);
    let bbox = acc.bbox();
    assert_eq!((bbox.min_x, bbox.max_x), (24.13, 26.67));
    assert_eq!((bbox.min_y, bbox.max_y), (22.86, 27.94));
}

#[test]
fn test_polygon_pad_widens_bbox_by_its_vertices() {
    let acc = fold_at(
        (4000.0, 3000.0),
        &["PAD~POLYGON~4010~3000~4~4~1~~4~0~4008 2998 4012 2998 4012 3002 4008 3002~0~gge8~0"],
    );
    let bbox = acc.bbox();
    assert_eq!((bbox.min_x, bbox.max_x), (2.03, 3.05));
    assert_eq!((bbox.min_y, bbox.max_y), (-0.51, 0.51));
}

#[test]
fn test_end_to_end_footprint_is_bbox_centered() {
    let acc = fold_at(
        (0.0, 0.0),
        &[
            "PAD~OVAL~100~100~20~10~1~~1~0~100 100~0~gge1~0",
            "TRACK~3~3~~100 100 200 100~gge2~0",
            "RECT~90~90~20~20~3~",
        ],
    );
    // The pad's left edge and the track's far end set x; the pad alone sets y.
    let bbox = *acc.bbox();
    assert_eq!((bbox.min_x, bbox.max_x), (22.86, 50.8));
    assert_eq!((bbox.min_y, bbox.max_y), (24.13, 26.67));

    let footprint = acc.finish("TEST");
    assert_eq!(footprint.primitives.len(), 3);
    assert_eq!(footprint.texts.len(), 3);
    assert_eq!(footprint.description, "TEST footprint");

    match &footprint.primitives[0] {
        FpPrimitive::Pad(pad) => assert!(close(pad.pos, (-11.43, 0.0)), "pad at {:?}", pad.pos),
        other => panic!("expected the pad first, got {:?}", other),
    }
    match &footprint.primitives[1] {
        FpPrimitive::Line { start, end, .. } => {
            assert!(close(*start, (-11.43, 0.0)));
            assert!(close(*end, (13.97, 0.0)));
        }
        other => panic!("expected the track second, got {:?}", other),
    }

    let text = |kind| {
        footprint
            .texts
            .iter()
            .find(|t| t.kind == kind)
            .expect("text present")
    };
    assert!(close(text(FpTextKind::Reference).pos, (0.0, -3.27)));
    assert!(close(text(FpTextKind::Value).pos, (0.0, 3.27)));
    assert!(close(text(FpTextKind::User).pos, (0.0, 5.27)));
    assert_eq!(text(FpTextKind::Value).text, "TEST");
    assert_eq!(text(FpTextKind::Reference).layer, Layer::FSilkS);
    assert_eq!(text(FpTextKind::User).layer, Layer::FFab);
}

const SVGNODE: &str = r#"SVGNODE~{"gId":"g1","nodeName":"g","nodeType":1,"layerid":"19","attrs":{"c_width":"10","c_height":"10","c_origin":"4000,3000","z":"0","c_rotation":"0,0,90","uuid":"abc123","title":"SOT-23"},"childNodes":[]}"#;

#[test]
fn test_svgnode_asks_the_resolver() {
    let resolver = LibraryModelResolver::new("${KIPRJMOD}/lcsc.3dshapes", None);
    let env = FootprintEnv {
        ctx: TransformContext::footprint(4000.0, 3000.0),
        resolver: Some(&resolver),
    };
    let acc = fold_records(&[SVGNODE], &env);
    assert!(acc.primitives().is_empty());
    let model = acc.model().expect("model resolved");
    assert_eq!(model.path, "${KIPRJMOD}/lcsc.3dshapes/abc123.wrl");
    assert_eq!(model.rotation.z, -90.0);
    assert_eq!(model.offset, DVec3::ZERO);
}

#[test]
fn test_model_offset_follows_node_origin_and_recentering() {
    let node = r#"SVGNODE~{"gId":"g1","nodeName":"g","nodeType":1,"layerid":"19","attrs":{"c_origin":"4010,2980","z":"5","c_rotation":"0,0,0","uuid":"abc123"},"childNodes":[]}"#;
    let resolver = LibraryModelResolver::new("${KIPRJMOD}/lcsc.3dshapes", None);
    let env = FootprintEnv {
        ctx: TransformContext::footprint(4000.0, 3000.0),
        resolver: Some(&resolver),
    };
    let acc = fold_records(
        &[node, "PAD~RECT~4020~3000~4~4~1~~1~0~4020 3000~0~gge6~0"],
        &env,
    );
    let model = acc.model().expect("model resolved");
    assert_eq!(model.offset, DVec3::new(2.54, 5.08, 1.27));

    let footprint = acc.finish("TEST");
    let model = footprint.model_3d.expect("model kept");
    assert_eq!(model.offset, DVec3::new(-2.54, 5.08, 1.27));
}

#[test]
fn test_svgnode_without_resolver_has_no_model() {
    let acc = fold_at((4000.0, 3000.0), &[SVGNODE]);
    assert!(acc.model().is_none());
}
