// src/converter/footprint.rs

//! Footprint record handlers and the fold that accumulates their output.

use super::log_skip;
use crate::error::SkipReason;
use crate::kicad_models::*;
use crate::model3d::{ModelResolver, SvgNode};
use crate::path::{PathElement, decompose};
use crate::tokenizer::{Fields, tokenize};
use crate::transform::{FOOTPRINT_PRECISION, TransformContext, round_to};
use log::{debug, error, info, warn};
use std::str::FromStr;

/// Outline width for RECT records, which carry none of their own.
pub const RECT_STROKE_MM: f64 = 0.12;

/// Reference text sits this far above the box, value and user text below.
const REFERENCE_GAP_MM: f64 = 2.0;
const VALUE_GAP_MM: f64 = 2.0;
const USER_GAP_MM: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintKind {
    Track,
    Pad,
    Arc,
    Circle,
    Rect,
    SolidRegion,
    SvgNode,
    Via,
}

impl FromStr for FootprintKind {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(match tag {
            "TRACK" => FootprintKind::Track,
            "PAD" => FootprintKind::Pad,
            "ARC" => FootprintKind::Arc,
            "CIRCLE" => FootprintKind::Circle,
            "RECT" => FootprintKind::Rect,
            "SOLIDREGION" => FootprintKind::SolidRegion,
            "SVGNODE" => FootprintKind::SvgNode,
            "VIA" => FootprintKind::Via,
            _ => return Err(()),
        })
    }
}

type Handler = fn(&Fields, &FootprintEnv) -> Result<Placement, SkipReason>;

impl FootprintKind {
    pub fn tag(self) -> &'static str {
        match self {
            FootprintKind::Track => "TRACK",
            FootprintKind::Pad => "PAD",
            FootprintKind::Arc => "ARC",
            FootprintKind::Circle => "CIRCLE",
            FootprintKind::Rect => "RECT",
            FootprintKind::SolidRegion => "SOLIDREGION",
            FootprintKind::SvgNode => "SVGNODE",
            FootprintKind::Via => "VIA",
        }
    }

    fn handler(self) -> Handler {
        match self {
            FootprintKind::Track => h_track,
            FootprintKind::Pad => h_pad,
            FootprintKind::Arc => h_arc,
            FootprintKind::Circle => h_circle,
            FootprintKind::Rect => h_rect,
            FootprintKind::SolidRegion => h_solid_region,
            FootprintKind::SvgNode => h_svg_node,
            FootprintKind::Via => h_via,
        }
    }
}

/// Read-only inputs shared by every handler in one fold.
pub struct FootprintEnv<'a> {
    pub ctx: TransformContext,
    pub resolver: Option<&'a dyn ModelResolver>,
}

/// What one record contributes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Placement {
    pub primitives: Vec<FpPrimitive>,
    /// Points that widen the bounding box. Only pads (their outline) and
    /// tracks (their vertices) report any.
    pub extents: Vec<(f64, f64)>,
    pub model: Option<ModelRef>,
}

/// Running extent, starting inverted so the first point sets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub const SENTINEL: f64 = 10000.0;

    pub fn empty() -> Self {
        BoundingBox {
            min_x: Self::SENTINEL,
            max_x: -Self::SENTINEL,
            min_y: Self::SENTINEL,
            max_y: -Self::SENTINEL,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn widen(&mut self, (x, y): (f64, f64)) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    /// Center of the box, or the origin when nothing widened it.
    pub fn center(&self) -> (f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0);
        }
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintAccumulator {
    primitives: Vec<FpPrimitive>,
    bbox: BoundingBox,
    model: Option<ModelRef>,
}

impl FootprintAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, placement: Placement) {
        for point in placement.extents {
            self.bbox.widen(point);
        }
        self.primitives.extend(placement.primitives);
        if placement.model.is_some() {
            self.model = placement.model;
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn primitives(&self) -> &[FpPrimitive] {
        &self.primitives
    }

    pub fn model(&self) -> Option<&ModelRef> {
        self.model.as_ref()
    }

    /// Adds the reference, value and user texts around the box, then moves
    /// everything so the box center lands on the origin.
    pub fn finish(self, name: &str) -> KiFootprint {
        let (cx, cy) = self.bbox.center();
        let (min_y, max_y) = if self.bbox.is_empty() {
            (0.0, 0.0)
        } else {
            (self.bbox.min_y, self.bbox.max_y)
        };

        let mut texts = vec![
            FpText {
                kind: FpTextKind::Reference,
                text: "REF**".to_string(),
                pos: (cx, min_y - REFERENCE_GAP_MM),
                layer: Layer::FSilkS,
            },
            FpText {
                kind: FpTextKind::User,
                text: "REF**".to_string(),
                pos: (cx, max_y + USER_GAP_MM),
                layer: Layer::FFab,
            },
            FpText {
                kind: FpTextKind::Value,
                text: name.to_string(),
                pos: (cx, max_y + VALUE_GAP_MM),
                layer: Layer::FFab,
            },
        ];

        let mut primitives = self.primitives;
        for primitive in &mut primitives {
            primitive.translate(-cx, -cy);
        }
        for text in &mut texts {
            text.pos = (text.pos.0 - cx, text.pos.1 - cy);
        }
        let mut model_3d = self.model;
        if let Some(model) = model_3d.as_mut() {
            // Model y points up.
            model.offset.x = round_to(model.offset.x - cx, FOOTPRINT_PRECISION);
            model.offset.y = round_to(model.offset.y + cy, FOOTPRINT_PRECISION);
        }

        KiFootprint {
            name: name.to_string(),
            description: format!("{} footprint", name),
            primitives,
            texts,
            model_3d,
        }
    }
}

/// Tokenizes and dispatches one record line.
pub fn build_record(line: &str, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    let record = tokenize(line).ok_or_else(|| SkipReason::UnknownKind(String::new()))?;
    debug!("Footprint: args->{:?}", record);
    let kind: FootprintKind = record.kind()?;
    let fields = Fields::new(kind.tag(), &record.fields);
    (kind.handler())(&fields, env)
}

/// Folds every record into a fresh accumulator. Records that fail are
/// logged and skipped.
pub fn fold_records<S: AsRef<str>>(lines: &[S], env: &FootprintEnv) -> FootprintAccumulator {
    let mut acc = FootprintAccumulator::new();
    for line in lines {
        match build_record(line.as_ref(), env) {
            Ok(placement) => acc.place(placement),
            Err(reason) => log_skip("Footprint", &reason),
        }
    }
    acc
}

fn layer_at(f: &Fields, index: usize) -> Layer {
    let code = f.get(index).unwrap_or("");
    Layer::from_code(code).unwrap_or_else(|| {
        warn!(
            "Footprint({}): layer correspondence not found for '{}', using {}",
            f.kind_name(),
            code,
            DEFAULT_LAYER.name()
        );
        DEFAULT_LAYER
    })
}

/// Optional numeric field: absent is `None`, present but broken is an error.
fn opt_num(f: &Fields, index: usize) -> Result<Option<f64>, SkipReason> {
    match f.get(index) {
        Some(_) => f.num(index).map(Some),
        None => Ok(None),
    }
}

fn h_track(f: &Fields, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    let width = env.ctx.length(f.num(0)?);
    // Short form `TRACK~width~points` leaves out the layer code.
    let (layer, points_at) = match f.get(1) {
        Some(v) if v.trim().contains(char::is_whitespace) => {
            warn!(
                "Footprint(TRACK): no layer code, using {}",
                DEFAULT_LAYER.name()
            );
            (DEFAULT_LAYER, 1)
        }
        _ => (layer_at(f, 1), 2),
    };
    let nodes: Vec<(f64, f64)> = f
        .points(points_at)?
        .into_iter()
        .map(|(x, y)| env.ctx.point(x, y))
        .collect();

    let primitives = nodes
        .windows(2)
        .map(|pair| FpPrimitive::Line {
            start: pair[0],
            end: pair[1],
            width,
            layer,
        })
        .collect();

    Ok(Placement {
        primitives,
        extents: nodes,
        model: None,
    })
}

fn h_pad(f: &Fields, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    let shape_code = f.str(0)?;
    let pos = env.ctx.point(f.num(1)?, f.num(2)?);
    let size = (env.ctx.length(f.num(3)?), env.ctx.length(f.num(4)?));
    let layer_code = f.get(5).unwrap_or("1");
    let number = f.str(6)?.to_string();
    let hole = f.num(7)?;

    let shape = match shape_code {
        "OVAL" => FpShape::Oval,
        "RECT" => FpShape::Rect,
        "ELLIPSE" => FpShape::Circle,
        "POLYGON" => FpShape::Custom,
        other => {
            error!(
                "Footprint(PAD): no shape correspondence for '{}', using default oval",
                other
            );
            FpShape::Oval
        }
    };

    let (kind, layers, drill) = if hole > 0.0 {
        let diameter = env.ctx.length(hole * 2.0);
        let height = opt_num(f, 11)?.map(|h| env.ctx.length(h)).unwrap_or(0.0);
        let drill = if height > 0.0 && height != diameter {
            Drill::Oval(height, diameter)
        } else {
            Drill::Round(diameter)
        };
        (
            PadKind::ThroughHole,
            vec![Layer::AllCu, Layer::AllMask],
            Some(drill),
        )
    } else {
        let layers = if layer_code == "2" {
            vec![Layer::BCu, Layer::BPaste, Layer::BMask]
        } else {
            vec![Layer::FCu, Layer::FPaste, Layer::FMask]
        };
        (PadKind::Smd, layers, None)
    };

    let (rotation, polygon) = match shape {
        FpShape::Oval | FpShape::Rect => (opt_num(f, 9)?.unwrap_or(0.0), Vec::new()),
        FpShape::Custom => {
            let polygon = f
                .points(8)?
                .into_iter()
                .map(|(x, y)| {
                    let (px, py) = env.ctx.point(x, y);
                    (
                        round_to(px - pos.0, FOOTPRINT_PRECISION),
                        round_to(py - pos.1, FOOTPRINT_PRECISION),
                    )
                })
                .collect();
            (0.0, polygon)
        }
        FpShape::Circle => (0.0, Vec::new()),
    };

    let extents = pad_extents(pos, size, rotation, &polygon);
    Ok(Placement {
        primitives: vec![FpPrimitive::Pad(FpPad {
            number,
            kind,
            shape,
            pos,
            size,
            rotation,
            layers,
            drill,
            polygon,
        })],
        extents,
        model: None,
    })
}

/// Outline corners of a pad: its polygon vertices for custom pads, otherwise
/// the axis-aligned box around the rotated `size` rectangle.
fn pad_extents(
    pos: (f64, f64),
    size: (f64, f64),
    rotation: f64,
    polygon: &[(f64, f64)],
) -> Vec<(f64, f64)> {
    let snap = |x: f64, y: f64| (round_to(x, FOOTPRINT_PRECISION), round_to(y, FOOTPRINT_PRECISION));
    if !polygon.is_empty() {
        return polygon
            .iter()
            .map(|(x, y)| snap(pos.0 + x, pos.1 + y))
            .collect();
    }
    let (sin, cos) = rotation.to_radians().sin_cos();
    let (w, h) = (size.0 / 2.0, size.1 / 2.0);
    let half_x = (w * cos).abs() + (h * sin).abs();
    let half_y = (w * sin).abs() + (h * cos).abs();
    vec![
        snap(pos.0 - half_x, pos.1 - half_y),
        snap(pos.0 + half_x, pos.1 + half_y),
    ]
}

fn h_arc(f: &Fields, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    let width = env.ctx.length(f.num(0)?);
    // The path lives in field 2 on most documents and field 3 on some.
    let data = [2, 3]
        .into_iter()
        .filter_map(|i| f.get(i))
        .find(|s| s.trim_start().starts_with('M'))
        .ok_or_else(|| SkipReason::PathShape {
            kind: "ARC",
            message: "no path in field 2 or 3".to_string(),
        })?;

    let elements = decompose(data).map_err(|e| SkipReason::Path {
        kind: "ARC",
        message: e.to_string(),
    })?;

    let arc = match elements.get(1) {
        Some(PathElement::Arc(arc)) => *arc,
        other => {
            return Err(SkipReason::PathShape {
                kind: "ARC",
                message: format!("second element is not an arc: {:?}", other),
            });
        }
    };

    let layer = layer_at(f, 1);
    let ctx = &env.ctx;
    // Drawn from the path's end back to its start.
    let primitive = FpPrimitive::Arc {
        center: ctx.point(arc.center.x, arc.center.y),
        start: ctx.point(arc.end.x, arc.end.y),
        mid: {
            let mid = arc.mid();
            ctx.point(mid.x, mid.y)
        },
        end: ctx.point(arc.start.x, arc.start.y),
        angle: round_to(-arc.sweep_angle.to_degrees(), FOOTPRINT_PRECISION),
        width,
        layer,
    };

    Ok(Placement {
        primitives: vec![primitive],
        ..Default::default()
    })
}

/// Layer code that EasyEDA draws pad outlines on.
const PAD_META_LAYER: &str = "100";

fn h_circle(f: &Fields, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    if f.get(4) == Some(PAD_META_LAYER) {
        return Err(SkipReason::Suppressed("CIRCLE on the pad meta-layer"));
    }

    let center = env.ctx.point(f.num(0)?, f.num(1)?);
    let radius = env.ctx.length(f.num(2)?);
    let width = env.ctx.length(f.num(3)?);
    let layer = layer_at(f, 4);

    Ok(Placement {
        primitives: vec![FpPrimitive::Circle {
            center,
            radius,
            width,
            layer,
        }],
        ..Default::default()
    })
}

fn h_rect(f: &Fields, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    let start = env.ctx.point(f.num(0)?, f.num(1)?);
    let width = env.ctx.length(f.num(2)?);
    let height = env.ctx.length(f.num(3)?);
    let layer = layer_at(f, 4);
    let end = (
        round_to(start.0 + width, FOOTPRINT_PRECISION),
        round_to(start.1 + height, FOOTPRINT_PRECISION),
    );

    Ok(Placement {
        primitives: vec![FpPrimitive::Rect {
            start,
            end,
            width: RECT_STROKE_MM,
            layer,
        }],
        ..Default::default()
    })
}

fn h_solid_region(_f: &Fields, _env: &FootprintEnv) -> Result<Placement, SkipReason> {
    Err(SkipReason::Inert("SOLIDREGION"))
}

fn h_svg_node(f: &Fields, env: &FootprintEnv) -> Result<Placement, SkipReason> {
    let node: SvgNode = serde_json::from_str(f.str(0)?).map_err(|e| SkipReason::Json {
        kind: "SVGNODE",
        message: e.to_string(),
    })?;

    let Some(resolver) = env.resolver else {
        debug!("Footprint(SVGNODE): no model resolver, skipping 3D reference");
        return Ok(Placement::default());
    };

    let placement = node.attrs.placement(&env.ctx);
    let model = resolver.resolve(&node.attrs.uuid, &placement);
    match &model {
        Some(m) => info!("Footprint: 3D model -> {}", m.path),
        None => debug!("Footprint(SVGNODE): resolver has no model for {}", node.attrs.uuid),
    }

    Ok(Placement {
        model,
        ..Default::default()
    })
}

fn h_via(_f: &Fields, _env: &FootprintEnv) -> Result<Placement, SkipReason> {
    info!("      Via are often added for better heat dissipation.");
    info!("      Be careful and read datasheet if needed.");
    Err(SkipReason::Unsupported("VIA"))
}
