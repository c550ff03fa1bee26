// src/transform.rs

//! Canvas-to-output coordinate arithmetic shared by both builders.
//!
//! Footprints come out in millimetres (2 decimals, y pointing down like the
//! canvas). Symbols come out in mils with the y axis flipped; the modern
//! symbol schema converts those mils to millimetres (4 decimals) at emit time.

/// One canvas unit is ten mils.
pub const CANVAS_TO_MM: f64 = 10.0 * 0.0254;
pub const MIL_TO_MM: f64 = 0.0254;

pub const FOOTPRINT_PRECISION: u32 = 2;
pub const SCHEMATIC_MM_PRECISION: u32 = 4;

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor).round() / factor;
    // Normalise -0.0 so it never prints as "-0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// A symbol-space point in mils, y already pointing up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MilPoint {
    pub x: i64,
    pub y: i64,
}

impl MilPoint {
    pub fn new(x: i64, y: i64) -> Self {
        MilPoint { x, y }
    }

    pub fn to_mm(self) -> (f64, f64) {
        (mils_to_mm(self.x), mils_to_mm(self.y))
    }
}

pub fn mils_to_mm(mils: i64) -> f64 {
    round_to(mils as f64 * MIL_TO_MM, SCHEMATIC_MM_PRECISION)
}

/// Origin plus scale. For footprints `scale` is canvas units to millimetres;
/// for symbols it is the symbol scale factor (canvas units to mils).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformContext {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale: f64,
}

impl TransformContext {
    pub fn footprint(origin_x: f64, origin_y: f64) -> Self {
        TransformContext {
            origin_x,
            origin_y,
            scale: CANVAS_TO_MM,
        }
    }

    pub fn schematic(origin_x: f64, origin_y: f64, symbol_scale: f64) -> Self {
        TransformContext {
            origin_x,
            origin_y,
            scale: symbol_scale,
        }
    }

    /// Footprint point in millimetres.
    pub fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            round_to((x - self.origin_x) * self.scale, FOOTPRINT_PRECISION),
            round_to((y - self.origin_y) * self.scale, FOOTPRINT_PRECISION),
        )
    }

    /// Footprint scalar (width, radius, size) in millimetres.
    pub fn length(&self, value: f64) -> f64 {
        round_to(value * self.scale, FOOTPRINT_PRECISION)
    }

    /// Symbol point in mils. Truncates toward zero, then flips y.
    pub fn mils(&self, x: f64, y: f64) -> MilPoint {
        MilPoint {
            x: ((x - self.origin_x) * self.scale) as i64,
            y: -(((y - self.origin_y) * self.scale) as i64),
        }
    }

    pub fn mil_length(&self, value: f64) -> i64 {
        (value * self.scale) as i64
    }
}
