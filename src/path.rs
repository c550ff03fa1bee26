// src/path.rs

//! Decomposes the SVG-style path strings embedded in ARC, PT, A and pin
//! records into absolute, ordered elements.

use kurbo::{Arc, CubicBez, ParamCurveArclen, Point, QuadBez, SvgArc, Vec2};
use svgtypes::{PathParser, PathSegment};
use thiserror::Error;

const ARCLEN_ACCURACY: f64 = 1e-6;
const ELLIPSE_STEPS: usize = 512;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("{0}")]
    Syntax(String),
    #[error("empty path")]
    Empty,
}

/// A circular or elliptical arc resolved to center form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub start: Point,
    pub end: Point,
    pub center: Point,
    pub radii: Vec2,
    /// Radians.
    pub x_rotation: f64,
    pub start_angle: f64,
    pub sweep_angle: f64,
}

impl ArcSegment {
    fn from_kurbo(start: Point, end: Point, arc: &Arc) -> Self {
        ArcSegment {
            start,
            end,
            center: arc.center,
            radii: arc.radii,
            x_rotation: arc.x_rotation,
            start_angle: arc.start_angle,
            sweep_angle: arc.sweep_angle,
        }
    }

    pub fn point_at(&self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        let local = Vec2::new(self.radii.x * cos, self.radii.y * sin);
        let (rs, rc) = self.x_rotation.sin_cos();
        self.center + Vec2::new(local.x * rc - local.y * rs, local.x * rs + local.y * rc)
    }

    pub fn mid(&self) -> Point {
        self.point_at(self.start_angle + self.sweep_angle / 2.0)
    }

    /// Mean radius; EasyEDA arcs are circular in practice.
    pub fn radius(&self) -> f64 {
        (self.radii.x + self.radii.y) / 2.0
    }

    pub fn length(&self) -> f64 {
        if (self.radii.x - self.radii.y).abs() < 1e-9 {
            return self.radii.x * self.sweep_angle.abs();
        }
        let step = self.sweep_angle / ELLIPSE_STEPS as f64;
        (0..ELLIPSE_STEPS)
            .map(|i| {
                let a = self.start_angle + step * i as f64;
                self.point_at(a).distance(self.point_at(a + step))
            })
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    Move(Point),
    Line { start: Point, end: Point },
    Close { start: Point, end: Point },
    Cubic(CubicBez),
    Quadratic(QuadBez),
    Arc(ArcSegment),
}

impl PathElement {
    pub fn start(&self) -> Point {
        match self {
            PathElement::Move(p) => *p,
            PathElement::Line { start, .. } | PathElement::Close { start, .. } => *start,
            PathElement::Cubic(c) => c.p0,
            PathElement::Quadratic(q) => q.p0,
            PathElement::Arc(a) => a.start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            PathElement::Move(p) => *p,
            PathElement::Line { end, .. } | PathElement::Close { end, .. } => *end,
            PathElement::Cubic(c) => c.p3,
            PathElement::Quadratic(q) => q.p2,
            PathElement::Arc(a) => a.end,
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(
            self,
            PathElement::Cubic(_) | PathElement::Quadratic(_) | PathElement::Arc(_)
        )
    }

    pub fn length(&self) -> f64 {
        match self {
            PathElement::Move(_) => 0.0,
            PathElement::Line { start, end } | PathElement::Close { start, end } => {
                start.distance(*end)
            }
            PathElement::Cubic(c) => c.arclen(ARCLEN_ACCURACY),
            PathElement::Quadratic(q) => q.arclen(ARCLEN_ACCURACY),
            PathElement::Arc(a) => a.length(),
        }
    }
}

/// Total drawn length of a decomposed path.
pub fn total_length(elements: &[PathElement]) -> f64 {
    elements.iter().map(PathElement::length).sum()
}

/// Parses `data` into absolute elements. Relative commands, H/V shorthands
/// and smooth curves are resolved; arcs with zero radius become lines.
pub fn decompose(data: &str) -> Result<Vec<PathElement>, PathError> {
    let mut elements = Vec::new();
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;
    let mut last_cubic_ctrl: Option<Point> = None;
    let mut last_quad_ctrl: Option<Point> = None;

    for segment in PathParser::from(data) {
        let segment = segment.map_err(|e| PathError::Syntax(e.to_string()))?;
        let resolve = move |abs: bool, x: f64, y: f64| {
            if abs {
                Point::new(x, y)
            } else {
                Point::new(current.x + x, current.y + y)
            }
        };

        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                current = resolve(abs, x, y);
                subpath_start = current;
                elements.push(PathElement::Move(current));
            }
            PathSegment::LineTo { abs, x, y } => {
                let end = resolve(abs, x, y);
                elements.push(PathElement::Line { start: current, end });
                current = end;
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                let end = if abs {
                    Point::new(x, current.y)
                } else {
                    Point::new(current.x + x, current.y)
                };
                elements.push(PathElement::Line { start: current, end });
                current = end;
            }
            PathSegment::VerticalLineTo { abs, y } => {
                let end = if abs {
                    Point::new(current.x, y)
                } else {
                    Point::new(current.x, current.y + y)
                };
                elements.push(PathElement::Line { start: current, end });
                current = end;
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                let c1 = resolve(abs, x1, y1);
                let c2 = resolve(abs, x2, y2);
                let end = resolve(abs, x, y);
                elements.push(PathElement::Cubic(CubicBez::new(current, c1, c2, end)));
                cubic_ctrl = Some(c2);
                current = end;
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                let c1 = reflect(last_cubic_ctrl, current);
                let c2 = resolve(abs, x2, y2);
                let end = resolve(abs, x, y);
                elements.push(PathElement::Cubic(CubicBez::new(current, c1, c2, end)));
                cubic_ctrl = Some(c2);
                current = end;
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                let c = resolve(abs, x1, y1);
                let end = resolve(abs, x, y);
                elements.push(PathElement::Quadratic(QuadBez::new(current, c, end)));
                quad_ctrl = Some(c);
                current = end;
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                let c = reflect(last_quad_ctrl, current);
                let end = resolve(abs, x, y);
                elements.push(PathElement::Quadratic(QuadBez::new(current, c, end)));
                quad_ctrl = Some(c);
                current = end;
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let end = resolve(abs, x, y);
                let svg_arc = SvgArc {
                    from: current,
                    to: end,
                    radii: Vec2::new(rx.abs(), ry.abs()),
                    x_rotation: x_axis_rotation.to_radians(),
                    large_arc,
                    sweep,
                };
                match Arc::from_svg_arc(&svg_arc) {
                    Some(arc) => {
                        elements.push(PathElement::Arc(ArcSegment::from_kurbo(current, end, &arc)))
                    }
                    None if current != end => {
                        elements.push(PathElement::Line { start: current, end })
                    }
                    None => {}
                }
                current = end;
            }
            PathSegment::ClosePath { .. } => {
                elements.push(PathElement::Close {
                    start: current,
                    end: subpath_start,
                });
                current = subpath_start;
            }
        }

        last_cubic_ctrl = cubic_ctrl;
        last_quad_ctrl = quad_ctrl;
    }

    if elements.is_empty() {
        return Err(PathError::Empty);
    }
    Ok(elements)
}

fn reflect(ctrl: Option<Point>, about: Point) -> Point {
    match ctrl {
        Some(c) => Point::new(2.0 * about.x - c.x, 2.0 * about.y - c.y),
        None => about,
    }
}
