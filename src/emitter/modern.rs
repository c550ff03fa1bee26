// src/emitter/modern.rs

//! The nested-expression schema. Symbol geometry is converted from mils to
//! millimetres here; footprint geometry is already metric.

use super::fmt_num;
use crate::kicad_models::*;
use crate::transform::{MIL_TO_MM, MilPoint, mils_to_mm};
use std::fmt::Write;

pub const FORMAT_VERSION: u32 = 20211014;
pub const GENERATOR: &str = "easyeda_kiconv";

const FONT_SIZE: &str = "(font (size 1.27 1.27))";
const GRAPHIC_STROKE: &str = "(stroke (width 0.254) (type default) (color 0 0 0 0))";

pub fn symbol_lib_header() -> String {
    format!(
        "(kicad_symbol_lib (version {}) (generator {})\n",
        FORMAT_VERSION, GENERATOR
    )
}

pub const SYMBOL_LIB_FOOTER: &str = ")\n";

/// Double-quoted string with the two characters that need it escaped.
pub fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn xy(p: MilPoint) -> String {
    let (x, y) = p.to_mm();
    format!("{} {}", fmt_num(x), fmt_num(y))
}

fn mm(mils: i64) -> String {
    fmt_num(mils_to_mm(mils))
}

fn pts(points: &[MilPoint]) -> String {
    points
        .iter()
        .map(|p| format!("(xy {})", xy(*p)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn pin_type_name(pin_type: KiPinType) -> &'static str {
    match pin_type {
        KiPinType::Input => "input",
        KiPinType::Output => "output",
        KiPinType::Bidirectional => "bidirectional",
        KiPinType::PowerIn => "power_in",
        KiPinType::Unspecified => "unspecified",
    }
}

fn pin_angle(orientation: PinOrientation) -> u32 {
    match orientation {
        PinOrientation::Right => 0,
        PinOrientation::Up => 90,
        PinOrientation::Left => 180,
        PinOrientation::Down => 270,
    }
}

/// A leading `~` marks an overbar in vendor pin names.
fn pin_name(name: &str) -> String {
    match name.strip_prefix('~') {
        Some(rest) if !rest.is_empty() => quoted(&format!("~{{{}}}", rest)),
        _ => quoted(name),
    }
}

/// One top-level `(symbol ...)` block, ready to sit inside a
/// `kicad_symbol_lib`.
pub fn symbol_entry(symbol: &KiSymbol) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "(symbol {} (in_bom yes) (on_board yes)",
        quoted(&symbol.name)
    )
    .unwrap();

    // --- Properties ---
    for field in &symbol.fields {
        let mut effects = FONT_SIZE.to_string();
        if field.justify_left {
            effects.push_str(" (justify left)");
        }
        if !field.visible {
            effects.push_str(" hide");
        }
        writeln!(
            &mut out,
            "  (property {} {} (id {}) (at {} 0) (effects {}))",
            quoted(field.key.property_name()),
            quoted(&field.value),
            field.key.id(),
            xy(field.at),
            effects
        )
        .unwrap();
    }

    // --- Symbol Graphics ---
    writeln!(&mut out, "  (symbol {}", quoted(&format!("{}_{}_1", symbol.name, symbol.part))).unwrap();
    for graphic in &symbol.graphics {
        match graphic {
            SymbolGraphic::Rectangle { start, end } => {
                writeln!(
                    &mut out,
                    "    (rectangle (start {}) (end {}) {} (fill (type background)))",
                    xy(*start),
                    xy(*end),
                    GRAPHIC_STROKE
                )
                .unwrap();
            }
            SymbolGraphic::Circle { center, radius } => {
                writeln!(
                    &mut out,
                    "    (circle (center {}) (radius {}) {} (fill (type none)))",
                    xy(*center),
                    mm(*radius),
                    GRAPHIC_STROKE
                )
                .unwrap();
            }
            SymbolGraphic::Polyline { points, filled } => {
                writeln!(
                    &mut out,
                    "    (polyline (pts {}) {} (fill (type {})))",
                    pts(points),
                    GRAPHIC_STROKE,
                    if *filled { "outline" } else { "none" }
                )
                .unwrap();
            }
            SymbolGraphic::Arc { start, mid, end, .. } => {
                writeln!(
                    &mut out,
                    "    (arc (start {}) (mid {}) (end {}) {} (fill (type none)))",
                    xy(*start),
                    xy(*mid),
                    xy(*end),
                    GRAPHIC_STROKE
                )
                .unwrap();
            }
            SymbolGraphic::Bezier { points } => {
                writeln!(
                    &mut out,
                    "    (bezier (pts {}) {} (fill (type none)))",
                    pts(points),
                    GRAPHIC_STROKE
                )
                .unwrap();
            }
            SymbolGraphic::Text {
                text,
                at,
                angle,
                size,
                hidden,
            } => {
                let size = fmt_num(*size as f64 * MIL_TO_MM);
                writeln!(
                    &mut out,
                    "    (text {} (at {} {}) (effects (font (size {} {})){}))",
                    quoted(text),
                    xy(*at),
                    fmt_num(*angle as f64 / 10.0),
                    size,
                    size,
                    if *hidden { " hide" } else { "" }
                )
                .unwrap();
            }
            SymbolGraphic::Pin(pin) => {
                writeln!(
                    &mut out,
                    r#"    (pin {} line (at {} {}) (length {})
      (name {} (effects {}))
      (number {} (effects {}))
    )"#,
                    pin_type_name(pin.pin_type),
                    xy(pin.at),
                    pin_angle(pin.orientation),
                    mm(pin.length),
                    pin_name(&pin.name),
                    FONT_SIZE,
                    quoted(&pin.number),
                    FONT_SIZE
                )
                .unwrap();
            }
        }
    }

    writeln!(&mut out, "  )\n)").unwrap(); // Close the unit block and the symbol
    out
}

fn pt(p: (f64, f64)) -> String {
    format!("{} {}", fmt_num(p.0), fmt_num(p.1))
}

fn stroke(width: f64) -> String {
    format!("(stroke (width {}) (type solid))", fmt_num(width))
}

fn layer_list(layers: &[Layer]) -> String {
    layers
        .iter()
        .map(|l| quoted(l.name()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn pad_shape_name(shape: FpShape) -> &'static str {
    match shape {
        FpShape::Circle => "circle",
        FpShape::Rect => "rect",
        FpShape::Oval => "oval",
        FpShape::Custom => "custom",
    }
}

fn write_pad(out: &mut String, pad: &FpPad) {
    let kind = match pad.kind {
        PadKind::Smd => "smd",
        PadKind::ThroughHole => "thru_hole",
    };
    write!(
        out,
        "  (pad {} {} {} (at {} {}) (size {} {})",
        quoted(&pad.number),
        kind,
        pad_shape_name(pad.shape),
        pt(pad.pos),
        fmt_num(pad.rotation),
        fmt_num(pad.size.0),
        fmt_num(pad.size.1)
    )
    .unwrap();
    match pad.drill {
        Some(Drill::Round(d)) => write!(out, " (drill {})", fmt_num(d)).unwrap(),
        Some(Drill::Oval(w, h)) => {
            write!(out, " (drill oval {} {})", fmt_num(w), fmt_num(h)).unwrap()
        }
        None => {}
    }
    write!(out, " (layers {})", layer_list(&pad.layers)).unwrap();

    if pad.shape == FpShape::Custom && !pad.polygon.is_empty() {
        let points = pad
            .polygon
            .iter()
            .map(|p| format!("(xy {})", pt(*p)))
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            out,
            "\n    (options (clearance outline) (anchor circle))\n    (primitives\n      (gr_poly (pts {}) (width 0.1) (fill yes))\n    )\n  ",
            points
        )
        .unwrap();
    }
    writeln!(out, ")").unwrap();
}

fn text_kind_name(kind: FpTextKind) -> &'static str {
    match kind {
        FpTextKind::Reference => "reference",
        FpTextKind::Value => "value",
        FpTextKind::User => "user",
    }
}

/// Generates the full S-expression string for a .kicad_mod file.
pub fn footprint_file(footprint: &KiFootprint) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "(footprint {} (version {}) (generator {}) (layer \"F.Cu\")",
        quoted(&footprint.name),
        FORMAT_VERSION,
        GENERATOR
    )
    .unwrap();
    writeln!(&mut out, "  (descr {})", quoted(&footprint.description)).unwrap();
    match footprint.assembly() {
        Some(PadKind::Smd) => writeln!(&mut out, "  (attr smd)").unwrap(),
        Some(PadKind::ThroughHole) => writeln!(&mut out, "  (attr through_hole)").unwrap(),
        None => {}
    }

    for text in &footprint.texts {
        writeln!(
            &mut out,
            "  (fp_text {} {} (at {}) (layer {}) (effects (font (size 1 1) (thickness 0.15))))",
            text_kind_name(text.kind),
            quoted(&text.text),
            pt(text.pos),
            quoted(text.layer.name())
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
            } => {
                writeln!(
                    &mut out,
                    "  (fp_line (start {}) (end {}) {} (layer {}))",
                    pt(*start),
                    pt(*end),
                    stroke(*width),
                    quoted(layer.name())
                )
                .unwrap();
            }
            FpPrimitive::Arc {
                start,
                mid,
                end,
                width,
                layer,
                ..
            } => {
                writeln!(
                    &mut out,
                    "  (fp_arc (start {}) (mid {}) (end {}) {} (layer {}))",
                    pt(*start),
                    pt(*mid),
                    pt(*end),
                    stroke(*width),
                    quoted(layer.name())
                )
                .unwrap();
            }
            FpPrimitive::Circle {
                center,
                radius,
                width,
                layer,
            } => {
                writeln!(
                    &mut out,
                    "  (fp_circle (center {}) (end {}) {} (fill none) (layer {}))",
                    pt(*center),
                    pt((center.0 + radius, center.1)),
                    stroke(*width),
                    quoted(layer.name())
                )
                .unwrap();
            }
            FpPrimitive::Rect {
                start,
                end,
                width,
                layer,
            } => {
                writeln!(
                    &mut out,
                    "  (fp_rect (start {}) (end {}) {} (fill none) (layer {}))",
                    pt(*start),
                    pt(*end),
                    stroke(*width),
                    quoted(layer.name())
                )
                .unwrap();
            }
            FpPrimitive::Pad(pad) => write_pad(&mut out, pad),
        }
    }

    if let Some(model) = &footprint.model_3d {
        writeln!(
            &mut out,
            r#"  (model {}
    (offset (xyz {} {} {}))
    (scale (xyz 1 1 1))
    (rotate (xyz {} {} {}))
  )"#,
            quoted(&model.path),
            fmt_num(model.offset.x),
            fmt_num(model.offset.y),
            fmt_num(model.offset.z),
            fmt_num(model.rotation.x),
            fmt_num(model.rotation.y),
            fmt_num(model.rotation.z)
        )
        .unwrap();
    }

    writeln!(&mut out, ")").unwrap();
    out
}
