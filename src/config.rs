// src/config.rs

use crate::emitter::Schema;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYMBOL_SCALE: f64 = 10.0;
pub const DEFAULT_LIBRARY_NAME: &str = "lcsc";

/// Knobs for one generation run. Every field has a default, so a partial
/// JSON document (or `{}`) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub schema: Schema,
    pub symbol_scale: f64,
    pub library_name: String,
    /// Prefix written in front of 3D model file names.
    pub model_dir: String,
    pub overwrite: bool,
    pub symbol: bool,
    pub footprint: bool,
    pub model_3d: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            schema: Schema::default(),
            symbol_scale: DEFAULT_SYMBOL_SCALE,
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            model_dir: format!("${{KIPRJMOD}}/{}.3dshapes", DEFAULT_LIBRARY_NAME),
            overwrite: false,
            symbol: true,
            footprint: true,
            model_3d: true,
        }
    }
}

impl GenerateOptions {
    pub fn from_json(text: &str) -> Result<Self> {
        let options: GenerateOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.symbol_scale.is_finite() && self.symbol_scale > 0.0) {
            return Err(Error::InvalidOption(format!(
                "symbol_scale must be a positive number, got {}",
                self.symbol_scale
            )));
        }
        if self.library_name.trim().is_empty() {
            return Err(Error::InvalidOption("library_name is empty".to_string()));
        }
        Ok(())
    }

    /// Footprint reference as the symbol's footprint property expects it.
    pub fn footprint_ref(&self, footprint_name: &str) -> String {
        format!("{}:{}", self.library_name, footprint_name)
    }
}
