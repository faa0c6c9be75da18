//! Agent-tool pattern queries such as `pattern:star, x:300, y:200, size:50`.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::error::{PathError, Result};
use crate::geometry::{Path, Point};
use crate::random::RandomSource;
use crate::shapes::{PathGenerator, ShapeDescriptor, ShapeKind};

const DEFAULT_CENTER: Point = Point::new(400, 300);
const DEFAULT_SIZE: f64 = 50.0;
// size 50 gives the classic 20px dot pitch
const DOT_SPACING_DIVISOR: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Shape(ShapeKind),
    /// Grid of single clicks instead of a drag.
    Dots,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Shape(kind) => fmt::Display::fmt(kind, f),
            PatternKind::Dots => f.write_str("dots"),
        }
    }
}

impl FromStr for PatternKind {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("dots") {
            return Ok(PatternKind::Dots);
        }
        s.parse()
            .map(PatternKind::Shape)
            .map_err(|_| PathError::InvalidShape(format!("unknown pattern '{}'", s.trim())))
    }
}

/// A shape named by a uniform center + size, the way an agent asks for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternRequest {
    pub kind: PatternKind,
    pub center: Point,
    pub size: f64,
}

impl Default for PatternRequest {
    fn default() -> Self {
        PatternRequest {
            kind: PatternKind::Shape(ShapeKind::Circle),
            center: DEFAULT_CENTER,
            size: DEFAULT_SIZE,
        }
    }
}

impl FromStr for PatternRequest {
    type Err = PathError;

    fn from_str(query: &str) -> Result<Self> {
        let mut request = PatternRequest::default();

        for part in query.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = part.split_once(':') else {
                // A bare word is the pattern name
                request.kind = part.parse()?;
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "pattern" | "shape" => request.kind = value.parse()?,
                "x" => request.center.x = parse_number("x", value)?,
                "y" => request.center.y = parse_number("y", value)?,
                "size" => request.size = parse_number("size", value)?,
                other => warn!("Ignoring unknown pattern key '{}'", other),
            }
        }

        Ok(request)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| PathError::invalid(format!("{} must be a number, got '{}'", key, value)))
}

/// What a pattern turns into on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stroke {
    Drag(Path),
    Clicks(Vec<Point>),
}

impl Stroke {
    pub fn points(&self) -> &[Point] {
        match self {
            Stroke::Drag(path) => path.points(),
            Stroke::Clicks(points) => points,
        }
    }
}

impl PatternRequest {
    /// Maps center + size onto the shape's own parameters; `None` for dots.
    pub fn descriptor(&self) -> Result<Option<ShapeDescriptor>> {
        let PatternKind::Shape(kind) = self.kind else {
            return Ok(None);
        };
        let center = self.center;
        let size = self.size;
        let left = center.offset(-size, 0.0)?;

        let shape = match kind {
            ShapeKind::Circle => ShapeDescriptor::Circle { center, radius: size },
            ShapeKind::Square => ShapeDescriptor::Square { center, size },
            ShapeKind::Triangle => ShapeDescriptor::Triangle { center, size },
            ShapeKind::Star => ShapeDescriptor::Star {
                center,
                outer_radius: size,
                inner_radius: None,
            },
            ShapeKind::Heart => ShapeDescriptor::Heart { center, size },
            ShapeKind::Spiral => ShapeDescriptor::Spiral {
                center,
                max_radius: size,
                turns: None,
            },
            ShapeKind::Zigzag => ShapeDescriptor::Zigzag {
                start: left,
                width: 2.0 * size,
                height: size / 2.0,
                peaks: None,
            },
            ShapeKind::Wave => ShapeDescriptor::Wave {
                start: left,
                width: 2.0 * size,
                amplitude: size / 2.0,
            },
            ShapeKind::Scribble => ShapeDescriptor::Scribble {
                start: center,
                steps: None,
            },
            ShapeKind::Line => ShapeDescriptor::Line {
                from: left,
                to: center.offset(size, 0.0)?,
            },
        };
        Ok(Some(shape))
    }

    pub fn render(&self, generator: &PathGenerator, rng: &mut dyn RandomSource) -> Result<Stroke> {
        // Line ignores its size, so check it here like every other shape
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(PathError::invalid(format!(
                "size must be positive, got {}",
                self.size
            )));
        }
        match self.descriptor()? {
            Some(shape) => generator.generate(&shape, rng).map(Stroke::Drag),
            None => {
                let config = generator.config();
                generator
                    .dot_grid(
                        self.center,
                        config.dot_columns,
                        config.dot_rows,
                        self.size / DOT_SPACING_DIVISOR,
                    )
                    .map(Stroke::Clicks)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Lcg;

    #[test]
    fn test_parse_full_query() {
        let request: PatternRequest = "pattern:star, x:300, y:200, size:60".parse().unwrap();
        assert_eq!(request.kind, PatternKind::Shape(ShapeKind::Star));
        assert_eq!(request.center, Point::new(300, 200));
        assert_eq!(request.size, 60.0);
    }

    #[test]
    fn test_parse_defaults() {
        let request: PatternRequest = "pattern:heart".parse().unwrap();
        assert_eq!(request.center, Point::new(400, 300));
        assert_eq!(request.size, 50.0);

        let request: PatternRequest = "".parse().unwrap();
        assert_eq!(request, PatternRequest::default());
    }

    #[test]
    fn test_parse_bare_name_and_dots() {
        let request: PatternRequest = " Spiral ".parse().unwrap();
        assert_eq!(request.kind, PatternKind::Shape(ShapeKind::Spiral));

        let request: PatternRequest = "pattern:dots, x:400, y:350".parse().unwrap();
        assert_eq!(request.kind, PatternKind::Dots);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "pattern:blob".parse::<PatternRequest>(),
            Err(PathError::InvalidShape(_))
        ));
        assert!(matches!(
            "pattern:circle, x:left".parse::<PatternRequest>(),
            Err(PathError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let request: PatternRequest = "pattern:square, color:red, size:20".parse().unwrap();
        assert_eq!(request.kind, PatternKind::Shape(ShapeKind::Square));
        assert_eq!(request.size, 20.0);
    }

    #[test]
    fn test_line_spans_twice_the_size() {
        let request: PatternRequest = "pattern:line, x:400, y:300, size:50".parse().unwrap();
        assert_eq!(
            request.descriptor().unwrap(),
            Some(ShapeDescriptor::Line {
                from: Point::new(350, 300),
                to: Point::new(450, 300),
            })
        );
    }

    #[test]
    fn test_size_beyond_coordinate_range_is_rejected() {
        let generator = PathGenerator::default();
        let mut rng = Lcg::new(0);
        let request: PatternRequest = "pattern:line, x:0, y:0, size:3000000000".parse().unwrap();
        assert!(matches!(
            request.render(&generator, &mut rng),
            Err(PathError::InvalidParameter(_))
        ));
        let request: PatternRequest = "pattern:dots, size:1e12".parse().unwrap();
        assert!(request.render(&generator, &mut rng).is_err());
    }

    #[test]
    fn test_render_drag_and_clicks() {
        let generator = PathGenerator::default();
        let mut rng = Lcg::new(3);

        let request: PatternRequest = "pattern:square, x:0, y:0, size:100".parse().unwrap();
        match request.render(&generator, &mut rng).unwrap() {
            Stroke::Drag(path) => assert_eq!(path.len(), 5),
            other => panic!("expected a drag, got {:?}", other),
        }

        let request: PatternRequest = "pattern:dots, x:400, y:350, size:50".parse().unwrap();
        let stroke = request.render(&generator, &mut rng).unwrap();
        assert!(matches!(stroke, Stroke::Clicks(_)));
        assert_eq!(stroke.points().len(), 35);
        assert_eq!(stroke.points()[0], Point::new(340, 310));
    }

    #[test]
    fn test_render_rejects_zero_size() {
        let generator = PathGenerator::default();
        let mut rng = Lcg::new(0);
        for query in ["pattern:circle, size:0", "pattern:line, size:0", "pattern:dots, size:0"] {
            let request: PatternRequest = query.parse().unwrap();
            assert!(request.render(&generator, &mut rng).is_err(), "{} accepted", query);
        }
    }
}
