// src/emitter/mod.rs

//! Text renderers for finished symbols and footprints.
//!
//! The legacy and modern schemas are written by two independent renderers;
//! both read the same `KiSymbol` / `KiFootprint` values and neither derives
//! its output from the other.

pub mod legacy;
pub mod modern;

use crate::kicad_models::{KiFootprint, KiSymbol};
use crate::transform::round_to;
use serde::{Deserialize, Serialize};

/// Target text schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Flat `DEF`/`ENDDEF` symbols and `$MODULE` footprints.
    Legacy,
    /// Parenthesized `kicad_symbol_lib` / `footprint` expressions.
    #[default]
    Modern,
}

impl Schema {
    pub fn symbol_extension(self) -> &'static str {
        match self {
            Schema::Legacy => "lib",
            Schema::Modern => "kicad_sym",
        }
    }

    pub fn footprint_extension(self) -> &'static str {
        match self {
            Schema::Legacy => "mod",
            Schema::Modern => "kicad_mod",
        }
    }
}

/// Renders one symbol as a library entry (without the library wrapper).
pub fn render_symbol(symbol: &KiSymbol, schema: Schema) -> String {
    match schema {
        Schema::Legacy => legacy::symbol_entry(symbol),
        Schema::Modern => modern::symbol_entry(symbol),
    }
}

/// Renders one footprint as the full contents of its file.
pub fn render_footprint(footprint: &KiFootprint, schema: Schema) -> String {
    match schema {
        Schema::Legacy => legacy::footprint_file(footprint),
        Schema::Modern => modern::footprint_file(footprint),
    }
}

/// Shortest decimal form, at most four places, never "-0".
pub fn fmt_num(value: f64) -> String {
    round_to(value, 4).to_string()
}

/// Angle of `(x, y)` seen from `(cx, cy)`, degrees.
pub(crate) fn angle_deg(cx: f64, cy: f64, x: f64, y: f64) -> f64 {
    (y - cy).atan2(x - cx).to_degrees()
}
