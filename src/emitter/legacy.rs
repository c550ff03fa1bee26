// src/emitter/legacy.rs

//! The flat schema: `DEF`/`ENDDEF` library entries in mils and
//! `PCBNEW-LibModule-V1` module files in millimetres.

use super::{angle_deg, fmt_num};
use crate::kicad_models::*;
use crate::transform::MilPoint;
use std::fmt::Write;

/// Pin number and name text size, mils.
const PIN_TEXT_SIZE: i64 = 40;
/// Property text size, mils.
const FIELD_TEXT_SIZE: i64 = 50;
const FP_TEXT_SIZE_MM: f64 = 1.0;
const FP_TEXT_THICKNESS_MM: f64 = 0.15;
/// `$SHAPE3D` offsets are in inches.
const MM_PER_INCH: f64 = 25.4;

pub const SYMBOL_LIB_HEADER: &str = "EESchema-LIBRARY Version 2.4\n#encoding utf-8\n";
pub const SYMBOL_LIB_FOOTER: &str = "#\n#End Library\n";

/// Quotes are the field delimiter and have no escape.
fn field_text(value: &str) -> String {
    value.replace('"', "'")
}

/// Free text is unquoted, so blanks become `~`.
fn bare_text(value: &str) -> String {
    let text = value.replace(' ', "~");
    if text.is_empty() { "~".to_string() } else { text }
}

fn pin_type_code(pin_type: KiPinType) -> &'static str {
    match pin_type {
        KiPinType::Unspecified => "U",
        KiPinType::Input => "I",
        KiPinType::Output => "O",
        KiPinType::Bidirectional => "B",
        KiPinType::PowerIn => "W",
    }
}

fn orientation_code(orientation: PinOrientation) -> &'static str {
    match orientation {
        PinOrientation::Right => "R",
        PinOrientation::Up => "U",
        PinOrientation::Left => "L",
        PinOrientation::Down => "D",
    }
}

fn points_text(points: &[MilPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{} {}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn tenths(degrees: f64) -> i64 {
    (degrees * 10.0).round() as i64
}

/// Legacy arcs always run counter-clockwise from their first to their
/// second end point; swaps the ends when `mid` lies on the other side.
fn ccw_ends(center: MilPoint, start: MilPoint, mid: MilPoint, end: MilPoint) -> (MilPoint, MilPoint) {
    let angle = |p: MilPoint| angle_deg(center.x as f64, center.y as f64, p.x as f64, p.y as f64);
    let from = angle(start);
    let offset = |a: f64| (a - from).rem_euclid(360.0);
    if offset(angle(mid)) <= offset(angle(end)) {
        (start, end)
    } else {
        (end, start)
    }
}

/// One `DEF` ... `ENDDEF` block, preceded by the customary comment banner.
pub fn symbol_entry(symbol: &KiSymbol) -> String {
    let mut out = String::new();
    let part = symbol.part;

    writeln!(&mut out, "#\n# {}\n#", symbol.name).unwrap();
    writeln!(
        &mut out,
        "DEF {} {} 0 40 Y Y {} F N",
        symbol.name, symbol.prefix, part
    )
    .unwrap();

    for field in &symbol.fields {
        write!(
            &mut out,
            "F{} \"{}\" {} {} {} H {} {} CNN",
            field.key.id(),
            field_text(&field.value),
            field.at.x,
            field.at.y,
            FIELD_TEXT_SIZE,
            if field.visible { "V" } else { "I" },
            if field.justify_left { "L" } else { "C" },
        )
        .unwrap();
        if let Some(name) = field.key.legacy_name() {
            write!(&mut out, " \"{}\"", name).unwrap();
        }
        out.push('\n');
    }

    writeln!(&mut out, "DRAW").unwrap();
    for graphic in &symbol.graphics {
        match graphic {
            SymbolGraphic::Rectangle { start, end } => {
                writeln!(
                    &mut out,
                    "S {} {} {} {} {} 0 0 f",
                    start.x, start.y, end.x, end.y, part
                )
                .unwrap();
            }
            SymbolGraphic::Circle { center, radius } => {
                writeln!(&mut out, "C {} {} {} {} 0 0 N", center.x, center.y, radius, part).unwrap();
            }
            SymbolGraphic::Polyline { points, filled } => {
                writeln!(
                    &mut out,
                    "P {} {} 0 0 {} {}",
                    points.len(),
                    part,
                    points_text(points),
                    if *filled { "f" } else { "N" }
                )
                .unwrap();
            }
            SymbolGraphic::Arc {
                center,
                radius,
                start,
                mid,
                end,
            } => {
                let (from, to) = ccw_ends(*center, *start, *mid, *end);
                let a1 = angle_deg(center.x as f64, center.y as f64, from.x as f64, from.y as f64);
                let a2 = angle_deg(center.x as f64, center.y as f64, to.x as f64, to.y as f64);
                writeln!(
                    &mut out,
                    "A {} {} {} {} {} {} 0 0 N {} {} {} {}",
                    center.x,
                    center.y,
                    radius,
                    tenths(a1),
                    tenths(a2),
                    part,
                    from.x,
                    from.y,
                    to.x,
                    to.y
                )
                .unwrap();
            }
            SymbolGraphic::Bezier { points } => {
                writeln!(&mut out, "B 4 {} 0 0 {} N", part, points_text(points)).unwrap();
            }
            SymbolGraphic::Text {
                text,
                at,
                angle,
                size,
                hidden,
            } => {
                writeln!(
                    &mut out,
                    "T {} {} {} {} {} {} 0 {} Normal 0 C C",
                    angle,
                    at.x,
                    at.y,
                    size,
                    u8::from(*hidden),
                    part,
                    bare_text(text)
                )
                .unwrap();
            }
            SymbolGraphic::Pin(pin) => {
                writeln!(
                    &mut out,
                    "X {} {} {} {} {} {} {} {} {} 0 {}",
                    bare_text(&pin.name),
                    bare_text(&pin.number),
                    pin.at.x,
                    pin.at.y,
                    pin.length,
                    orientation_code(pin.orientation),
                    PIN_TEXT_SIZE,
                    PIN_TEXT_SIZE,
                    part,
                    pin_type_code(pin.pin_type)
                )
                .unwrap();
            }
        }
    }
    writeln!(&mut out, "ENDDRAW").unwrap();
    writeln!(&mut out, "ENDDEF").unwrap();
    out
}

fn pad_shape_code(shape: FpShape) -> &'static str {
    match shape {
        FpShape::Circle => "C",
        FpShape::Rect => "R",
        FpShape::Oval => "O",
        // No polygon pads in this format; the outline is approximated by
        // the pad's own rectangle.
        FpShape::Custom => "R",
    }
}

fn text_prefix(kind: FpTextKind) -> &'static str {
    match kind {
        FpTextKind::Reference => "T0",
        FpTextKind::Value => "T1",
        FpTextKind::User => "T2",
    }
}

fn write_pad(out: &mut String, pad: &FpPad) {
    writeln!(out, "$PAD").unwrap();
    writeln!(
        out,
        "Sh \"{}\" {} {} {} 0 0 {}",
        field_text(&pad.number),
        pad_shape_code(pad.shape),
        fmt_num(pad.size.0),
        fmt_num(pad.size.1),
        tenths(pad.rotation)
    )
    .unwrap();
    match pad.drill {
        Some(Drill::Round(d)) => writeln!(out, "Dr {} 0 0", fmt_num(d)).unwrap(),
        Some(Drill::Oval(w, h)) => {
            writeln!(out, "Dr {} 0 0 O {} {}", fmt_num(w), fmt_num(w), fmt_num(h)).unwrap()
        }
        None => writeln!(out, "Dr 0 0 0").unwrap(),
    }
    let mask = pad.layers.iter().fold(0u32, |m, l| m | l.legacy_mask());
    let kind = match pad.kind {
        PadKind::Smd => "SMD",
        PadKind::ThroughHole => "STD",
    };
    writeln!(out, "At {} N {:08X}", kind, mask).unwrap();
    writeln!(out, "Ne 0 \"\"").unwrap();
    writeln!(out, "Po {} {}", fmt_num(pad.pos.0), fmt_num(pad.pos.1)).unwrap();
    writeln!(out, "$EndPAD").unwrap();
}

fn write_segment(out: &mut String, start: (f64, f64), end: (f64, f64), width: f64, layer: Layer) {
    writeln!(
        out,
        "DS {} {} {} {} {} {}",
        fmt_num(start.0),
        fmt_num(start.1),
        fmt_num(end.0),
        fmt_num(end.1),
        fmt_num(width),
        layer.legacy_id()
    )
    .unwrap();
}

/// A complete single-module library file.
pub fn footprint_file(footprint: &KiFootprint) -> String {
    let mut out = String::new();
    let name = &footprint.name;

    writeln!(&mut out, "PCBNEW-LibModule-V1").unwrap();
    writeln!(&mut out, "# encoding utf-8").unwrap();
    writeln!(&mut out, "Units mm").unwrap();
    writeln!(&mut out, "$INDEX\n{}\n$EndINDEX", name).unwrap();
    writeln!(&mut out, "$MODULE {}", name).unwrap();
    writeln!(&mut out, "Po 0 0 0 15 00000000 00000000 ~~").unwrap();
    writeln!(&mut out, "Li {}", name).unwrap();
    writeln!(&mut out, "Cd {}", footprint.description).unwrap();
    writeln!(&mut out, "Sc 0").unwrap();
    writeln!(&mut out, "Op 0 0 0").unwrap();
    match footprint.assembly() {
        Some(PadKind::Smd) => writeln!(&mut out, "At SMD").unwrap(),
        Some(PadKind::ThroughHole) => writeln!(&mut out, "At STD").unwrap(),
        None => {}
    }

    for text in &footprint.texts {
        writeln!(
            &mut out,
            "{} {} {} {} {} 0 {} N V {} N \"{}\"",
            text_prefix(text.kind),
            fmt_num(text.pos.0),
            fmt_num(text.pos.1),
            fmt_num(FP_TEXT_SIZE_MM),
            fmt_num(FP_TEXT_SIZE_MM),
            fmt_num(FP_TEXT_THICKNESS_MM),
            text.layer.legacy_id(),
            field_text(&text.text)
        )
        .unwrap();
    }

    for primitive in &footprint.primitives {
        match primitive {
            FpPrimitive::Line {
                start,
                end,
                width,
                layer,
            } => write_segment(&mut out, *start, *end, *width, *layer),
            FpPrimitive::Rect {
                start,
                end,
                width,
                layer,
            } => {
                let corners = [
                    *start,
                    (end.0, start.1),
                    *end,
                    (start.0, end.1),
                    *start,
                ];
                for pair in corners.windows(2) {
                    write_segment(&mut out, pair[0], pair[1], *width, *layer);
                }
            }
            FpPrimitive::Circle {
                center,
                radius,
                width,
                layer,
            } => {
                writeln!(
                    &mut out,
                    "DC {} {} {} {} {} {}",
                    fmt_num(center.0),
                    fmt_num(center.1),
                    fmt_num(center.0 + radius),
                    fmt_num(center.1),
                    fmt_num(*width),
                    layer.legacy_id()
                )
                .unwrap();
            }
            FpPrimitive::Arc {
                center,
                start,
                angle,
                width,
                layer,
                ..
            } => {
                writeln!(
                    &mut out,
                    "DA {} {} {} {} {} {} {}",
                    fmt_num(center.0),
                    fmt_num(center.1),
                    fmt_num(start.0),
                    fmt_num(start.1),
                    tenths(*angle),
                    fmt_num(*width),
                    layer.legacy_id()
                )
                .unwrap();
            }
            FpPrimitive::Pad(pad) => write_pad(&mut out, pad),
        }
    }

    if let Some(model) = &footprint.model_3d {
        writeln!(&mut out, "$SHAPE3D").unwrap();
        writeln!(&mut out, "Na \"{}\"", field_text(&model.path)).unwrap();
        writeln!(&mut out, "Sc 1 1 1").unwrap();
        writeln!(
            &mut out,
            "Of {} {} {}",
            fmt_num(model.offset.x / MM_PER_INCH),
            fmt_num(model.offset.y / MM_PER_INCH),
            fmt_num(model.offset.z / MM_PER_INCH)
        )
        .unwrap();
        writeln!(
            &mut out,
            "Ro {} {} {}",
            fmt_num(model.rotation.x),
            fmt_num(model.rotation.y),
            fmt_num(model.rotation.z)
        )
        .unwrap();
        writeln!(&mut out, "$EndSHAPE3D").unwrap();
    }

    writeln!(&mut out, "$EndMODULE {}", name).unwrap();
    writeln!(&mut out, "$EndLIBRARY").unwrap();
    out
}
