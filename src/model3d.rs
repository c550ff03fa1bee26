// src/model3d.rs

use crate::kicad_models::ModelRef;
use crate::transform::TransformContext;
use glam::DVec3;
use serde::Deserialize;

/// Placement attributes carried by a footprint's SVGNODE.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelPlacement {
    /// Model origin in footprint millimetres, y pointing down.
    pub origin: (f64, f64),
    /// Millimetres above the board.
    pub z: f64,
    /// Degrees about x, y, z as the vendor states them.
    pub rotation: DVec3,
}

/// Looks up the 3D model a footprint should reference. The footprint builder
/// consults it only while handling SVGNODE records.
pub trait ModelResolver {
    fn resolve(&self, uuid: &str, placement: &ModelPlacement) -> Option<ModelRef>;
}

/// Points every model at `{dir}/{name}.wrl`, where `name` is the configured
/// model name or, failing that, the vendor uuid. The offset is the placement
/// origin with y flipped to the 3D viewer's upward axis.
#[derive(Debug, Clone)]
pub struct LibraryModelResolver {
    pub dir: String,
    pub model_name: Option<String>,
}

impl LibraryModelResolver {
    pub fn new(dir: impl Into<String>, model_name: Option<String>) -> Self {
        LibraryModelResolver {
            dir: dir.into(),
            model_name: model_name.filter(|n| !n.trim().is_empty()),
        }
    }
}

impl ModelResolver for LibraryModelResolver {
    fn resolve(&self, uuid: &str, placement: &ModelPlacement) -> Option<ModelRef> {
        let name = self.model_name.as_deref().unwrap_or(uuid);
        if name.is_empty() {
            return None;
        }
        Some(ModelRef {
            path: format!("{}/{}.wrl", self.dir.trim_end_matches('/'), name),
            offset: DVec3::new(placement.origin.0, -placement.origin.1, placement.z),
            // KiCad turns the other way round on every axis.
            rotation: -placement.rotation,
        })
    }
}

// Helper structs for deserializing the JSON payload of an SVGNODE record.
#[derive(Deserialize, Debug)]
pub(crate) struct SvgNode {
    pub attrs: SvgNodeAttrs,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SvgNodeAttrs {
    pub uuid: String,
    #[serde(default)]
    pub c_origin: Option<String>,
    #[serde(default)]
    pub z: Option<serde_json::Value>,
    #[serde(default)]
    pub c_rotation: Option<String>,
}

impl SvgNodeAttrs {
    /// Placement in the footprint frame of `ctx`. A missing origin sits on
    /// the footprint origin.
    pub fn placement(&self, ctx: &TransformContext) -> ModelPlacement {
        let origin = self
            .c_origin
            .as_deref()
            .map(parse_triple)
            .map(|v| ctx.point(v.x, v.y))
            .unwrap_or_default();
        let z = match &self.z {
            Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        };
        let z = ctx.length(z);
        let rotation = self
            .c_rotation
            .as_deref()
            .map(parse_triple)
            .unwrap_or(DVec3::ZERO);
        ModelPlacement {
            origin,
            z,
            rotation,
        }
    }
}

/// "a,b,c" with missing or broken components read as zero.
fn parse_triple(raw: &str) -> DVec3 {
    let mut values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>().unwrap_or(0.0));
    DVec3::new(
        values.next().unwrap_or(0.0),
        values.next().unwrap_or(0.0),
        values.next().unwrap_or(0.0),
    )
}
