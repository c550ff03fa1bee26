// src/converter/mod.rs

pub mod footprint;
pub mod symbol;

use crate::config::GenerateOptions;
use crate::easyeda_models::ComponentSource;
use crate::error::{Error, Result, SkipReason};
use crate::kicad_models::{KiFootprint, KiSymbol};
use crate::model3d::ModelResolver;
use crate::transform::TransformContext;
use log::info;

pub(crate) fn log_skip(scope: &str, reason: &SkipReason) {
    log::log!(reason.level(), "{}: skipping record: {}", scope, reason);
}

/// Folds the symbol records of `source` and lays out its properties.
pub fn convert_symbol(source: &ComponentSource, options: &GenerateOptions) -> Result<KiSymbol> {
    options.validate()?;
    let symbol = source
        .symbol
        .as_ref()
        .ok_or_else(|| Error::MissingData("component has no symbol data".to_string()))?;
    let info = &source.info;
    if info.name.trim().is_empty() {
        return Err(Error::MissingData("symbol name".to_string()));
    }

    info!("Schematic: creating schematic...");
    let ctx = TransformContext::schematic(symbol.center.0, symbol.center.1, options.symbol_scale);
    let acc = symbol::fold_records(&symbol.shapes, ctx);
    let ki_symbol = acc.finish(
        info,
        symbol.size,
        &options.footprint_ref(&info.footprint_name),
    );
    info!("Schematic: Schematic Generated.");
    Ok(ki_symbol)
}

/// Folds the footprint records of `source`, re-centered on their bounding box.
pub fn convert_footprint(
    source: &ComponentSource,
    resolver: Option<&dyn ModelResolver>,
) -> Result<KiFootprint> {
    let footprint = source
        .footprint
        .as_ref()
        .ok_or_else(|| Error::MissingData("component has no footprint data".to_string()))?;
    let name = &source.info.footprint_name;
    if name.trim().is_empty() {
        return Err(Error::MissingData("footprint name".to_string()));
    }

    info!("Footprint: creating footprint ...");
    let env = footprint::FootprintEnv {
        ctx: TransformContext::footprint(footprint.origin.0, footprint.origin.1),
        resolver,
    };
    let acc = footprint::fold_records(&footprint.shapes, &env);
    let ki_footprint = acc.finish(name);
    info!("Footprint: Footprint Generated.");
    Ok(ki_footprint)
}
