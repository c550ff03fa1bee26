// src/importer.rs

//! Offline half of component loading: turns the `result` object returned by
//! the vendor API into a `ComponentSource`.

use crate::easyeda_models::*;
use crate::error::{Error, Result};
use log::{debug, warn};
use serde_json::Value;

/// Document type carrying both a symbol and its package.
const DOC_TYPE_SYMBOL: i64 = 2;
/// Document type of a bare footprint, as served for a package uuid.
const DOC_TYPE_FOOTPRINT: i64 = 4;

/// Canvas descriptor positions of the document origin.
const SYMBOL_CANVAS_ORIGIN: (usize, usize) = (13, 14);
const FOOTPRINT_CANVAS_ORIGIN: (usize, usize) = (16, 17);

/// Reads a number the API sometimes sends as a string.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Names end up in file names and library keys.
pub fn sanitize_name(name: &str) -> String {
    name.trim().replace([' ', '/'], "_")
}

fn canvas_origin(data_str: &Value, (ix, iy): (usize, usize)) -> Option<(f64, f64)> {
    let canvas: Vec<&str> = data_str["canvas"].as_str()?.split('~').collect();
    let x = canvas.get(ix)?.trim().parse().ok()?;
    let y = canvas.get(iy)?.trim().parse().ok()?;
    Some((x, y))
}

fn shape_lines(data_str: &Value, what: &str) -> Result<Vec<String>> {
    let shapes = data_str["shape"]
        .as_array()
        .ok_or_else(|| Error::MissingData(format!("{} shape data is missing", what)))?;
    Ok(shapes
        .iter()
        .filter_map(|s| s.as_str().map(String::from))
        .collect())
}

fn import_symbol(data_str: &Value) -> Result<SymbolSource> {
    let shapes = shape_lines(data_str, "Symbol")?;
    let bbox = &data_str["BBox"];

    let size = DeclaredBox {
        width: as_number(&bbox["width"]).unwrap_or(0.0),
        height: as_number(&bbox["height"]).unwrap_or(0.0),
    };
    let center = match (as_number(&bbox["x"]), as_number(&bbox["y"])) {
        (Some(x), Some(y)) => (x + size.width / 2.0, y + size.height / 2.0),
        _ => {
            warn!("Importer: symbol BBox missing, centering on the canvas origin");
            canvas_origin(data_str, SYMBOL_CANVAS_ORIGIN).unwrap_or_default()
        }
    };

    Ok(SymbolSource {
        shapes,
        center,
        size,
    })
}

fn import_footprint(package: &Value) -> Result<FootprintSource> {
    let data_str = &package["dataStr"];
    let shapes = shape_lines(data_str, "Footprint")?;
    let origin = canvas_origin(data_str, FOOTPRINT_CANVAS_ORIGIN).ok_or_else(|| {
        Error::MissingData("Footprint canvas origin is missing".to_string())
    })?;
    Ok(FootprintSource { shapes, origin })
}

/// Parses the API `result` object for `reference` into a `ComponentSource`.
pub fn import_component(result: &Value, reference: &ComponentRef) -> Result<ComponentSource> {
    let doc_type = result["docType"].as_i64().unwrap_or(DOC_TYPE_SYMBOL);
    debug!("Importer: {} has docType {}", reference.id(), doc_type);

    let (symbol_doc, package) = match doc_type {
        DOC_TYPE_FOOTPRINT => (None, result),
        _ => (Some(&result["dataStr"]), &result["packageDetail"]),
    };

    let mut info = ComponentInfo::default();

    let symbol = match symbol_doc {
        Some(data_str) => {
            let c_para = &data_str["head"]["c_para"];
            info.name = non_empty_str(&c_para["name"])
                .map(sanitize_name)
                .ok_or_else(|| Error::MissingData("Symbol name is missing".to_string()))?;
            info.prefix = non_empty_str(&c_para["pre"])
                .map(|p| p.trim_end_matches('?').to_string())
                .ok_or_else(|| Error::MissingData("Symbol prefix is missing".to_string()))?;
            info.manufacturer = non_empty_str(&c_para["Manufacturer"])
                .unwrap_or_default()
                .to_string();
            Some(import_symbol(data_str)?)
        }
        None => None,
    };

    let footprint = if package.is_object() {
        info.footprint_name = non_empty_str(&package["title"])
            .map(sanitize_name)
            .unwrap_or_default();
        let fp_para = &package["dataStr"]["head"]["c_para"];
        info.model_3d_name = non_empty_str(&fp_para["3DModel"]).map(sanitize_name);
        if info.datasheet.is_empty() {
            info.datasheet = non_empty_str(&fp_para["link"]).unwrap_or_default().to_string();
        }
        Some(import_footprint(package)?)
    } else {
        warn!("Importer: {} has no package data", reference.id());
        None
    };

    if symbol.is_none() && footprint.is_none() {
        return Err(Error::MissingData(format!(
            "{} carries neither a symbol nor a footprint",
            reference.id()
        )));
    }

    if info.name.is_empty() {
        info.name = info.footprint_name.clone();
    }
    if info.datasheet.is_empty() {
        info.datasheet = non_empty_str(&result["lcsc"]["url"])
            .unwrap_or_default()
            .to_string();
    }
    info.lcsc_id = match (non_empty_str(&result["lcsc"]["number"]), reference) {
        (Some(number), _) => number.to_string(),
        (None, ComponentRef::ByCatalogId(id)) => id.clone(),
        (None, ComponentRef::ByUuid { .. }) => String::new(),
    };
    info.description = non_empty_str(&result["description"])
        .unwrap_or_default()
        .to_string();
    info.smt = result["SMT"].as_bool().unwrap_or(false);

    Ok(ComponentSource {
        info,
        symbol,
        footprint,
    })
}
