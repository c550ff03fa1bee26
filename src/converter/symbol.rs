// src/converter/symbol.rs

//! Symbol record handlers, the pin/graphics accumulator and the property
//! layout computed once the fold is done.

use super::log_skip;
use crate::easyeda_models::{ComponentInfo, DeclaredBox};
use crate::error::SkipReason;
use crate::kicad_models::*;
use crate::path::{ArcSegment, PathElement, decompose, total_length};
use crate::tokenizer::{Fields, tokenize};
use crate::transform::{MilPoint, TransformContext};
use kurbo::Point;
use log::{debug, warn};
use std::str::FromStr;

/// Pin stub lengths are measured in canvas units and always scaled by ten.
pub const PIN_LENGTH_SCALE: f64 = 10.0;
/// Font size for texts set in the named "comment" style, mils.
pub const COMMENT_TEXT_SIZE: i64 = 80;
/// How far a label moves inward when pins leave the body on its side, mils.
pub const LABEL_NUDGE: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Rect,
    Ellipse,
    Pin,
    Text,
    Polyline,
    Polygon,
    Path,
    Arc,
}

impl FromStr for SymbolKind {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(match tag {
            "R" => SymbolKind::Rect,
            "E" => SymbolKind::Ellipse,
            "P" => SymbolKind::Pin,
            "T" => SymbolKind::Text,
            "PL" => SymbolKind::Polyline,
            "PG" => SymbolKind::Polygon,
            "PT" => SymbolKind::Path,
            "A" => SymbolKind::Arc,
            _ => return Err(()),
        })
    }
}

type Handler = fn(&Fields, &TransformContext) -> Result<SymbolPlacement, SkipReason>;

impl SymbolKind {
    pub fn tag(self) -> &'static str {
        match self {
            SymbolKind::Rect => "R",
            SymbolKind::Ellipse => "E",
            SymbolKind::Pin => "P",
            SymbolKind::Text => "T",
            SymbolKind::Polyline => "PL",
            SymbolKind::Polygon => "PG",
            SymbolKind::Path => "PT",
            SymbolKind::Arc => "A",
        }
    }

    fn handler(self) -> Handler {
        match self {
            SymbolKind::Rect => h_rect,
            SymbolKind::Ellipse => h_ellipse,
            SymbolKind::Pin => h_pin,
            SymbolKind::Text => h_text,
            SymbolKind::Polyline => h_polyline,
            SymbolKind::Polygon => h_polygon,
            SymbolKind::Path => h_path,
            SymbolKind::Arc => h_arc,
        }
    }
}

/// What one record contributes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolPlacement {
    pub graphics: Vec<SymbolGraphic>,
    pub wire: Option<WireSide>,
}

impl SymbolPlacement {
    fn one(graphic: SymbolGraphic) -> Self {
        SymbolPlacement {
            graphics: vec![graphic],
            wire: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchematicAccumulator {
    graphics: Vec<SymbolGraphic>,
    part: u32,
    ctx: TransformContext,
    wires: WireSides,
}

impl SchematicAccumulator {
    pub fn new(ctx: TransformContext) -> Self {
        SchematicAccumulator {
            graphics: Vec::new(),
            part: 1,
            ctx,
            wires: WireSides::default(),
        }
    }

    pub fn place(&mut self, placement: SymbolPlacement) {
        if let Some(side) = placement.wire {
            self.wires.set(side);
        }
        self.graphics.extend(placement.graphics);
    }

    pub fn graphics(&self) -> &[SymbolGraphic] {
        &self.graphics
    }

    pub fn wires(&self) -> WireSides {
        self.wires
    }

    pub fn part(&self) -> u32 {
        self.part
    }

    pub fn scale(&self) -> f64 {
        self.ctx.scale
    }

    /// Property anchors, derived from half the declared size and pushed
    /// inward on every side that has pins.
    pub fn layout(&self, size: DeclaredBox) -> SymbolLayout {
        let scale = self.ctx.scale;
        let half_w = (size.width / 2.0 * scale) as i64;
        let half_h = (size.height / 2.0 * scale) as i64;
        let nudge = |set: bool| if set { LABEL_NUDGE } else { 0 };
        let w = self.wires;

        SymbolLayout {
            reference: MilPoint::new(-half_w + 60 + nudge(w.left), half_h + 60 - nudge(w.top)),
            value: MilPoint::new(half_w + 40 - nudge(w.right), -half_h - 50 + nudge(w.bottom)),
            footprint: MilPoint::new(half_w + 200 - nudge(w.right), half_h + 180 - nudge(w.top)),
        }
    }

    pub fn finish(self, info: &ComponentInfo, size: DeclaredBox, footprint_ref: &str) -> KiSymbol {
        let layout = self.layout(size);
        let below = |steps: i64| MilPoint::new(layout.footprint.x, layout.footprint.y + 100 * steps);

        let fields = FieldKey::ALL
            .iter()
            .map(|&key| {
                let (value, at, visible, justify_left) = match key {
                    FieldKey::Reference => (info.prefix.clone(), layout.reference, true, false),
                    FieldKey::Value => (info.name.clone(), layout.value, true, true),
                    FieldKey::Footprint => (footprint_ref.to_string(), below(0), false, true),
                    FieldKey::Datasheet => (info.datasheet.clone(), below(1), false, true),
                    FieldKey::LcscId => (info.lcsc_id.clone(), below(2), false, true),
                    FieldKey::Description => (info.description.clone(), below(3), false, true),
                    FieldKey::Category => (info.category.clone(), below(4), false, true),
                    FieldKey::Manufacturer => (info.manufacturer.clone(), below(5), false, true),
                };
                SymbolField {
                    key,
                    value,
                    at,
                    visible,
                    justify_left,
                }
            })
            .collect();

        KiSymbol {
            name: info.name.clone(),
            prefix: info.prefix.clone(),
            part: self.part,
            fields,
            graphics: self.graphics,
        }
    }
}

/// Anchors for the reference, value and the stacked hidden fields, mils.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolLayout {
    pub reference: MilPoint,
    pub value: MilPoint,
    pub footprint: MilPoint,
}

/// Tokenizes and dispatches one record line.
pub fn build_record(line: &str, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    let record = tokenize(line).ok_or_else(|| SkipReason::UnknownKind(String::new()))?;
    debug!("Schematic: [{}] args->{:?}", record.tag, record.fields);
    let kind: SymbolKind = record.kind()?;
    let fields = Fields::new(kind.tag(), &record.fields);
    (kind.handler())(&fields, ctx)
}

pub fn fold_records<S: AsRef<str>>(lines: &[S], ctx: TransformContext) -> SchematicAccumulator {
    let mut acc = SchematicAccumulator::new(ctx);
    for line in lines {
        match build_record(line.as_ref(), &acc.ctx) {
            Ok(placement) => acc.place(placement),
            Err(reason) => log_skip("Schematic", &reason),
        }
    }
    acc
}

fn path_error(kind: &'static str) -> impl Fn(crate::path::PathError) -> SkipReason {
    move |e| SkipReason::Path {
        kind,
        message: e.to_string(),
    }
}

fn mils_of(ctx: &TransformContext, p: Point) -> MilPoint {
    ctx.mils(p.x, p.y)
}

fn h_rect(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    // The long encoding carries corner radii before the size.
    let (w_index, h_index) = if f.len() == 12 { (4, 5) } else { (2, 3) };
    let x = f.num(0)?;
    let y = f.num(1)?;
    let w = f.num(w_index)?;
    let h = f.num(h_index)?;

    Ok(SymbolPlacement::one(SymbolGraphic::Rectangle {
        start: ctx.mils(x, y),
        end: ctx.mils(x + w, y + h),
    }))
}

fn h_ellipse(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    Ok(SymbolPlacement::one(SymbolGraphic::Circle {
        center: ctx.mils(f.num(0)?, f.num(1)?),
        radius: ctx.mil_length(f.num(2)?),
    }))
}

fn h_pin(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    let pin_type = KiPinType::from_code(f.str(1)?);
    let number = f.str(2)?.to_string();
    let at = ctx.mils(f.num(3)?, f.num(4)?);
    let rotation = f.str(5)?;

    // "x^^y^^M x y h -10": the stub path is the last `^^` section.
    let stub = f.str(8)?.rsplit("^^").next().unwrap_or_default();
    let elements = decompose(stub).map_err(path_error("P"))?;
    let length = (total_length(&elements) * PIN_LENGTH_SCALE) as i64;

    let name = f.str(13)?.replace(' ', "_");

    let (orientation, wire) = match PinOrientation::from_angle(rotation) {
        Some((orientation, side)) => (orientation, Some(side)),
        None => {
            warn!(
                "Schematic: pin {} number {} failed to find orientation. Using Default orientation 'Left'",
                name, number
            );
            (PinOrientation::Left, None)
        }
    };

    Ok(SymbolPlacement {
        graphics: vec![SymbolGraphic::Pin(KiSymbolPin {
            name,
            number,
            pin_type,
            at,
            length,
            orientation,
        })],
        wire,
    })
}

fn h_text(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    let angle = f.num(3)? as i64 * 10;
    let at = ctx.mils(f.num(1)?, f.num(2)?);
    let size_field = f.str(5)?;
    let size = if f.get(10) == Some("comment") || size_field == "comment" {
        COMMENT_TEXT_SIZE
    } else {
        let points = size_field.trim_end_matches("pt");
        let points: f64 = points.trim().parse().map_err(|_| SkipReason::BadNumber {
            kind: "T",
            index: 5,
            value: size_field.to_string(),
        })?;
        (points * 10.0) as i64
    };
    let text = f.str(6)?.to_string();
    // Display flag: "1" shows the text; a missing flag counts as shown.
    let hidden = matches!(f.get(7), Some("0") | Some("none"));

    Ok(SymbolPlacement::one(SymbolGraphic::Text {
        text,
        at,
        angle,
        size,
        hidden,
    }))
}

fn vertices(f: &Fields, ctx: &TransformContext) -> Result<Vec<MilPoint>, SkipReason> {
    let points: Vec<MilPoint> = f
        .points(0)?
        .into_iter()
        .map(|(x, y)| ctx.mils(x, y))
        .collect();
    if points.is_empty() {
        return Err(SkipReason::PathShape {
            kind: f.kind_name(),
            message: "no vertices".to_string(),
        });
    }
    Ok(points)
}

fn h_polyline(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    Ok(SymbolPlacement::one(SymbolGraphic::Polyline {
        points: vertices(f, ctx)?,
        filled: false,
    }))
}

fn h_polygon(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    let mut points = vertices(f, ctx)?;
    points.push(points[0]);
    Ok(SymbolPlacement::one(SymbolGraphic::Polyline {
        points,
        filled: true,
    }))
}

fn arc_graphic(ctx: &TransformContext, arc: &ArcSegment) -> SymbolGraphic {
    SymbolGraphic::Arc {
        center: mils_of(ctx, arc.center),
        radius: ctx.mil_length(arc.radius()),
        start: mils_of(ctx, arc.start),
        mid: mils_of(ctx, arc.mid()),
        end: mils_of(ctx, arc.end),
    }
}

fn h_path(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    let elements = decompose(f.str(0)?).map_err(path_error("PT"))?;

    let drawn = elements
        .iter()
        .filter(|e| !matches!(e, PathElement::Move(_)))
        .count();
    if drawn == 0 {
        return Err(SkipReason::PathShape {
            kind: "PT",
            message: "path draws nothing".to_string(),
        });
    }
    let curves = elements.iter().filter(|e| e.is_curve()).count();

    let graphics = if curves > drawn - curves {
        curve_graphics(ctx, &elements)
    } else {
        polyline_graphics(ctx, &elements)
    };
    Ok(SymbolPlacement {
        graphics,
        wire: None,
    })
}

/// Mostly straight paths: one polyline per subpath, curves reduced to their
/// end points.
fn polyline_graphics(ctx: &TransformContext, elements: &[PathElement]) -> Vec<SymbolGraphic> {
    let mut graphics = Vec::new();
    let mut points: Vec<MilPoint> = Vec::new();
    let mut flush = |points: &mut Vec<MilPoint>| {
        if points.len() >= 2 {
            graphics.push(SymbolGraphic::Polyline {
                points: std::mem::take(points),
                filled: false,
            });
        } else {
            points.clear();
        }
    };

    for element in elements {
        match element {
            PathElement::Move(_) => flush(&mut points),
            other => {
                if other.is_curve() {
                    warn!("Schematic: curve in a straight path, keeping its end point only");
                }
                if points.is_empty() {
                    points.push(mils_of(ctx, other.start()));
                }
                points.push(mils_of(ctx, other.end()));
            }
        }
    }
    flush(&mut points);
    graphics
}

/// Mostly curved paths: one primitive per segment.
fn curve_graphics(ctx: &TransformContext, elements: &[PathElement]) -> Vec<SymbolGraphic> {
    elements
        .iter()
        .filter_map(|element| match element {
            PathElement::Move(_) => None,
            PathElement::Line { start, end } | PathElement::Close { start, end } => {
                Some(SymbolGraphic::Polyline {
                    points: vec![mils_of(ctx, *start), mils_of(ctx, *end)],
                    filled: false,
                })
            }
            PathElement::Cubic(c) => Some(SymbolGraphic::Bezier {
                points: [
                    mils_of(ctx, c.p0),
                    mils_of(ctx, c.p1),
                    mils_of(ctx, c.p2),
                    mils_of(ctx, c.p3),
                ],
            }),
            PathElement::Quadratic(q) => {
                // Degree elevation to a cubic.
                let c1 = q.p0 + (q.p1 - q.p0) * (2.0 / 3.0);
                let c2 = q.p2 + (q.p1 - q.p2) * (2.0 / 3.0);
                Some(SymbolGraphic::Bezier {
                    points: [
                        mils_of(ctx, q.p0),
                        mils_of(ctx, c1),
                        mils_of(ctx, c2),
                        mils_of(ctx, q.p2),
                    ],
                })
            }
            PathElement::Arc(arc) => Some(arc_graphic(ctx, arc)),
        })
        .collect()
}

fn h_arc(f: &Fields, ctx: &TransformContext) -> Result<SymbolPlacement, SkipReason> {
    let elements = decompose(f.str(0)?).map_err(path_error("A"))?;
    let arc = elements
        .iter()
        .find_map(|e| match e {
            PathElement::Arc(arc) => Some(arc),
            _ => None,
        })
        .ok_or_else(|| SkipReason::PathShape {
            kind: "A",
            message: "path has no arc segment".to_string(),
        })?;
    Ok(SymbolPlacement::one(arc_graphic(ctx, arc)))
}
