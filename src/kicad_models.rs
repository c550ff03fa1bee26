// src/kicad_models.rs

use crate::transform::MilPoint;
use glam::DVec3;

// --- Layers ---

/// KiCad board layers the footprint builder can place geometry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    FCu,
    BCu,
    FSilkS,
    BSilkS,
    FPaste,
    BPaste,
    FMask,
    BMask,
    DwgsUser,
    EdgeCuts,
    FFab,
    FCourtyard,
    /// `*.Cu`, through-hole pads only.
    AllCu,
    /// `*.Mask`, through-hole pads only.
    AllMask,
}

/// Where graphics go when the vendor layer code is unknown.
pub const DEFAULT_LAYER: Layer = Layer::FSilkS;

impl Layer {
    /// Maps an EasyEDA layer code.
    pub fn from_code(code: &str) -> Option<Layer> {
        let layer = match code.trim() {
            "1" => Layer::FCu,
            "2" => Layer::BCu,
            "3" => Layer::FSilkS,
            "4" => Layer::BSilkS,
            "5" => Layer::FPaste,
            "6" => Layer::BPaste,
            "7" => Layer::FMask,
            "8" => Layer::BMask,
            // 9 is ratlines and 11 the multi-layer pseudo layer; neither has a
            // drawable KiCad twin.
            "9" | "11" => Layer::DwgsUser,
            "10" => Layer::EdgeCuts,
            "12" => Layer::FFab,
            "100" => Layer::FSilkS,
            "101" => Layer::FCourtyard,
            _ => return None,
        };
        Some(layer)
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::FCu => "F.Cu",
            Layer::BCu => "B.Cu",
            Layer::FSilkS => "F.SilkS",
            Layer::BSilkS => "B.SilkS",
            Layer::FPaste => "F.Paste",
            Layer::BPaste => "B.Paste",
            Layer::FMask => "F.Mask",
            Layer::BMask => "B.Mask",
            Layer::DwgsUser => "Dwgs.User",
            Layer::EdgeCuts => "Edge.Cuts",
            Layer::FFab => "F.Fab",
            Layer::FCourtyard => "F.CrtYd",
            Layer::AllCu => "*.Cu",
            Layer::AllMask => "*.Mask",
        }
    }

    /// Bit mask in the numeric layer space of the legacy module format.
    /// Fab and courtyard did not exist there and ride on the Eco layers.
    pub fn legacy_mask(self) -> u32 {
        match self {
            Layer::AllCu => 0x0000_FFFF,
            Layer::AllMask => (1 << 22) | (1 << 23),
            other => 1 << other.legacy_id(),
        }
    }

    pub fn legacy_id(self) -> u32 {
        match self {
            Layer::BCu => 0,
            Layer::FCu | Layer::AllCu => 15,
            Layer::BPaste => 18,
            Layer::FPaste => 19,
            Layer::BSilkS => 20,
            Layer::FSilkS => 21,
            Layer::BMask => 22,
            Layer::FMask | Layer::AllMask => 23,
            Layer::DwgsUser => 24,
            Layer::FCourtyard => 26,
            Layer::FFab => 27,
            Layer::EdgeCuts => 28,
        }
    }
}

// --- 3D model reference ---

/// A resolved 3D model, as the footprint should reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRef {
    pub path: String,
    pub offset: DVec3,
    pub rotation: DVec3,
}

// --- Footprint Structs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpShape {
    Circle,
    Rect,
    Oval,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadKind {
    Smd,
    ThroughHole,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drill {
    Round(f64),
    /// (width, height) of a slot.
    Oval(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpPad {
    pub number: String,
    pub kind: PadKind,
    pub shape: FpShape,
    pub pos: (f64, f64),
    pub size: (f64, f64),
    pub rotation: f64,
    pub layers: Vec<Layer>,
    pub drill: Option<Drill>,
    /// Custom pad outline, relative to `pos`.
    pub polygon: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FpPrimitive {
    Line {
        start: (f64, f64),
        end: (f64, f64),
        width: f64,
        layer: Layer,
    },
    Arc {
        center: (f64, f64),
        start: (f64, f64),
        mid: (f64, f64),
        end: (f64, f64),
        /// Signed sweep from `start` to `end`, degrees.
        angle: f64,
        width: f64,
        layer: Layer,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        width: f64,
        layer: Layer,
    },
    Rect {
        start: (f64, f64),
        end: (f64, f64),
        width: f64,
        layer: Layer,
    },
    Pad(FpPad),
}

fn shift(p: &mut (f64, f64), dx: f64, dy: f64) {
    p.0 += dx;
    p.1 += dy;
}

impl FpPrimitive {
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            FpPrimitive::Line { start, end, .. } | FpPrimitive::Rect { start, end, .. } => {
                shift(start, dx, dy);
                shift(end, dx, dy);
            }
            FpPrimitive::Arc {
                center,
                start,
                mid,
                end,
                ..
            } => {
                shift(center, dx, dy);
                shift(start, dx, dy);
                shift(mid, dx, dy);
                shift(end, dx, dy);
            }
            FpPrimitive::Circle { center, .. } => shift(center, dx, dy),
            // Custom outlines are pad-relative and move with the pad.
            FpPrimitive::Pad(pad) => shift(&mut pad.pos, dx, dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpTextKind {
    Reference,
    Value,
    User,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpText {
    pub kind: FpTextKind,
    pub text: String,
    pub pos: (f64, f64),
    pub layer: Layer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprint {
    pub name: String,
    pub description: String,
    pub primitives: Vec<FpPrimitive>,
    pub texts: Vec<FpText>,
    pub model_3d: Option<ModelRef>,
}

impl KiFootprint {
    pub fn pads(&self) -> impl Iterator<Item = &FpPad> {
        self.primitives.iter().filter_map(|p| match p {
            FpPrimitive::Pad(pad) => Some(pad),
            _ => None,
        })
    }

    /// `ThroughHole` if any pad is drilled, `Smd` if there are pads and none
    /// are, `None` for a pad-less footprint.
    pub fn assembly(&self) -> Option<PadKind> {
        let mut any = false;
        for pad in self.pads() {
            if pad.kind == PadKind::ThroughHole {
                return Some(PadKind::ThroughHole);
            }
            any = true;
        }
        any.then_some(PadKind::Smd)
    }
}

// --- Symbol Structs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinType {
    Unspecified,
    Input,
    Output,
    Bidirectional,
    PowerIn,
}

impl KiPinType {
    /// EasyEDA's electrical code; anything unrecognised is unspecified.
    pub fn from_code(code: &str) -> KiPinType {
        match code.trim() {
            "1" => KiPinType::Input,
            "2" => KiPinType::Output,
            "3" => KiPinType::Bidirectional,
            "4" => KiPinType::PowerIn,
            _ => KiPinType::Unspecified,
        }
    }
}

/// Which way the pin stub points from its connection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOrientation {
    Right,
    Up,
    Left,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl PinOrientation {
    /// Maps the vendor rotation code, together with the body side the pin
    /// wires out of.
    pub fn from_angle(code: &str) -> Option<(PinOrientation, WireSide)> {
        match code.trim() {
            "0" => Some((PinOrientation::Left, WireSide::Right)),
            "180" => Some((PinOrientation::Right, WireSide::Left)),
            "90" => Some((PinOrientation::Down, WireSide::Top)),
            "270" => Some((PinOrientation::Up, WireSide::Bottom)),
            _ => None,
        }
    }
}

/// Sides of the body that have at least one pin wired out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireSides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl WireSides {
    pub fn set(&mut self, side: WireSide) {
        match side {
            WireSide::Left => self.left = true,
            WireSide::Right => self.right = true,
            WireSide::Top => self.top = true,
            WireSide::Bottom => self.bottom = true,
        }
    }

    pub fn count(&self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .filter(|b| **b)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiSymbolPin {
    pub name: String,
    pub number: String,
    pub pin_type: KiPinType,
    pub at: MilPoint,
    pub length: i64,
    pub orientation: PinOrientation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolGraphic {
    Rectangle {
        start: MilPoint,
        end: MilPoint,
    },
    Circle {
        center: MilPoint,
        radius: i64,
    },
    Polyline {
        points: Vec<MilPoint>,
        filled: bool,
    },
    Arc {
        center: MilPoint,
        radius: i64,
        start: MilPoint,
        mid: MilPoint,
        end: MilPoint,
    },
    Bezier {
        points: [MilPoint; 4],
    },
    Text {
        text: String,
        at: MilPoint,
        /// Tenths of a degree.
        angle: i64,
        /// Mils.
        size: i64,
        hidden: bool,
    },
    Pin(KiSymbolPin),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    Reference,
    Value,
    Footprint,
    Datasheet,
    LcscId,
    Description,
    Category,
    Manufacturer,
}

impl FieldKey {
    pub const ALL: [FieldKey; 8] = [
        FieldKey::Reference,
        FieldKey::Value,
        FieldKey::Footprint,
        FieldKey::Datasheet,
        FieldKey::LcscId,
        FieldKey::Description,
        FieldKey::Category,
        FieldKey::Manufacturer,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn property_name(self) -> &'static str {
        match self {
            FieldKey::Reference => "Reference",
            FieldKey::Value => "Value",
            FieldKey::Footprint => "Footprint",
            FieldKey::Datasheet => "Datasheet",
            FieldKey::LcscId => "LC#",
            FieldKey::Description => "Description",
            FieldKey::Category => "Category",
            FieldKey::Manufacturer => "Manufacturer",
        }
    }

    /// User field name in the legacy schema; the four standard fields have none.
    pub fn legacy_name(self) -> Option<&'static str> {
        match self {
            FieldKey::LcscId => Some("LC#"),
            FieldKey::Description => Some("Description"),
            FieldKey::Category => Some("Category"),
            FieldKey::Manufacturer => Some("manufacturer"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolField {
    pub key: FieldKey,
    pub value: String,
    pub at: MilPoint,
    pub visible: bool,
    /// Left-justified rather than centered.
    pub justify_left: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiSymbol {
    pub name: String,
    pub prefix: String,
    pub part: u32,
    pub fields: Vec<SymbolField>,
    pub graphics: Vec<SymbolGraphic>,
}

impl KiSymbol {
    pub fn field(&self, key: FieldKey) -> Option<&SymbolField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn pins(&self) -> impl Iterator<Item = &KiSymbolPin> {
        self.graphics.iter().filter_map(|g| match g {
            SymbolGraphic::Pin(pin) => Some(pin),
            _ => None,
        })
    }
}
