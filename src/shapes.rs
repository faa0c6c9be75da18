//! Closed-form point generators for every drawable shape.
//!
//! Each generator validates its sizes and counts up front and fails with
//! [`PathError::InvalidParameter`] rather than returning a degenerate path.
//! Closed shapes repeat their first point as the last one, so a renderer
//! that joins consecutive points with straight segments draws a closed
//! figure.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::error::{PathError, Result};
use crate::geometry::{Path, Point};
use crate::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Star,
    Heart,
    Spiral,
    Zigzag,
    Wave,
    Scribble,
    Line,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 10] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Star,
        ShapeKind::Heart,
        ShapeKind::Spiral,
        ShapeKind::Zigzag,
        ShapeKind::Wave,
        ShapeKind::Scribble,
        ShapeKind::Line,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
            ShapeKind::Spiral => "spiral",
            ShapeKind::Zigzag => "zigzag",
            ShapeKind::Wave => "wave",
            ShapeKind::Scribble => "scribble",
            ShapeKind::Line => "line",
        }
    }

    /// Whether paths of this kind end on their first point.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            ShapeKind::Circle
                | ShapeKind::Square
                | ShapeKind::Triangle
                | ShapeKind::Star
                | ShapeKind::Heart
        )
    }

    pub fn is_deterministic(self) -> bool {
        self != ShapeKind::Scribble
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| PathError::InvalidShape(format!("unknown shape '{}'", s.trim())))
    }
}

/// Which shape to draw, with the parameters of that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeDescriptor {
    Circle {
        center: Point,
        radius: f64,
    },
    Square {
        center: Point,
        size: f64,
    },
    Triangle {
        center: Point,
        size: f64,
    },
    Star {
        center: Point,
        outer_radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inner_radius: Option<f64>,
    },
    Heart {
        center: Point,
        size: f64,
    },
    Spiral {
        center: Point,
        max_radius: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turns: Option<u32>,
    },
    Zigzag {
        start: Point,
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peaks: Option<u32>,
    },
    Wave {
        start: Point,
        width: f64,
        amplitude: f64,
    },
    Scribble {
        start: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        steps: Option<u32>,
    },
    Line {
        from: Point,
        to: Point,
    },
}

impl ShapeDescriptor {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeDescriptor::Circle { .. } => ShapeKind::Circle,
            ShapeDescriptor::Square { .. } => ShapeKind::Square,
            ShapeDescriptor::Triangle { .. } => ShapeKind::Triangle,
            ShapeDescriptor::Star { .. } => ShapeKind::Star,
            ShapeDescriptor::Heart { .. } => ShapeKind::Heart,
            ShapeDescriptor::Spiral { .. } => ShapeKind::Spiral,
            ShapeDescriptor::Zigzag { .. } => ShapeKind::Zigzag,
            ShapeDescriptor::Wave { .. } => ShapeKind::Wave,
            ShapeDescriptor::Scribble { .. } => ShapeKind::Scribble,
            ShapeDescriptor::Line { .. } => ShapeKind::Line,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PathError::invalid(format!("{} must be positive, got {}", name, value)))
    }
}

fn count(name: &str, value: u32) -> Result<u32> {
    if value == 0 {
        return Err(PathError::invalid(format!("{} must be at least 1", name)));
    }
    Ok(value)
}

/// Number of samples covering one full turn at `step_degrees`.
fn samples_per_turn(step_degrees: f64) -> f64 {
    (360.0 / step_degrees).round().max(3.0)
}

/// Stateless path generator parameterised by a [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct PathGenerator {
    config: GeneratorConfig,
}

impl PathGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(PathGenerator { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Checks a path's point count against `max_points` before anything is allocated.
    fn point_budget(&self, shape: &str, points: f64) -> Result<usize> {
        let max = self.config.max_points;
        if points.is_finite() && points <= max as f64 {
            Ok(points as usize)
        } else {
            Err(PathError::invalid(format!(
                "{} would need {} points, the limit is {}",
                shape, points, max
            )))
        }
    }

    /// Dispatches on the descriptor tag. Optional parameters fall back to the config.
    pub fn generate(&self, shape: &ShapeDescriptor, rng: &mut dyn RandomSource) -> Result<Path> {
        let path = match *shape {
            ShapeDescriptor::Circle { center, radius } => self.circle(center, radius),
            ShapeDescriptor::Square { center, size } => self.square(center, size),
            ShapeDescriptor::Triangle { center, size } => self.triangle(center, size),
            ShapeDescriptor::Star {
                center,
                outer_radius,
                inner_radius,
            } => {
                let inner =
                    inner_radius.unwrap_or(outer_radius * self.config.star_inner_ratio);
                self.star(center, outer_radius, inner)
            }
            ShapeDescriptor::Heart { center, size } => self.heart(center, size),
            ShapeDescriptor::Spiral {
                center,
                max_radius,
                turns,
            } => self.spiral(center, max_radius, turns.unwrap_or(self.config.spiral_turns)),
            ShapeDescriptor::Zigzag {
                start,
                width,
                height,
                peaks,
            } => {
                let peaks = peaks.unwrap_or(self.config.zigzag_peaks);
                self.zigzag(start, width, height, peaks)
            }
            ShapeDescriptor::Wave {
                start,
                width,
                amplitude,
            } => self.wave(start, width, amplitude),
            ShapeDescriptor::Scribble { start, steps } => {
                self.scribble(start, steps.unwrap_or(self.config.scribble_steps), rng)
            }
            ShapeDescriptor::Line { from, to } => Ok(self.line(from, to)),
        }?;
        debug!("Generated {} path with {} points", shape.kind(), path.len());
        Ok(path)
    }

    pub fn circle(&self, center: Point, radius: f64) -> Result<Path> {
        let radius = positive("radius", radius)?;
        let samples = samples_per_turn(self.config.angular_step_degrees);
        let n = self.point_budget("circle", samples + 1.0)? - 1;
        let points = (0..n)
            .map(|i| center.polar(radius, TAU * i as f64 / n as f64))
            .collect::<Result<Vec<_>>>()?;
        Path::closed(points)
    }

    /// Axis-aligned square, top-left corner first, clockwise on screen.
    pub fn square(&self, center: Point, size: f64) -> Result<Path> {
        let half = positive("size", size)? / 2.0;
        Path::closed(vec![
            center.offset(-half, -half)?,
            center.offset(half, -half)?,
            center.offset(half, half)?,
            center.offset(-half, half)?,
        ])
    }

    /// Equilateral triangle with its apex up.
    pub fn triangle(&self, center: Point, size: f64) -> Result<Path> {
        let size = positive("size", size)?;
        let height = size * 3f64.sqrt() / 2.0;
        Path::closed(vec![
            center.offset(0.0, -height / 2.0)?,
            center.offset(-size / 2.0, height / 2.0)?,
            center.offset(size / 2.0, height / 2.0)?,
        ])
    }

    /// Five-pointed star, first tip straight up.
    pub fn star(&self, center: Point, outer_radius: f64, inner_radius: f64) -> Result<Path> {
        let outer = positive("outer_radius", outer_radius)?;
        let inner = positive("inner_radius", inner_radius)?;
        let points = (0..10)
            .map(|i| {
                let radius = if i % 2 == 0 { outer } else { inner };
                center.polar(radius, i as f64 * PI / 5.0 - PI / 2.0)
            })
            .collect::<Result<Vec<_>>>()?;
        Path::closed(points)
    }

    /// Classic parametric heart; `size` is its half-width.
    pub fn heart(&self, center: Point, size: f64) -> Result<Path> {
        let scale = positive("size", size)? / 16.0;
        let samples = samples_per_turn(self.config.angular_step_degrees);
        let n = self.point_budget("heart", samples + 1.0)? - 1;
        let points = (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                let x = 16.0 * t.sin().powi(3);
                let y = -(13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos());
                center.offset(scale * x, scale * y)
            })
            .collect::<Result<Vec<_>>>()?;
        Path::closed(points)
    }

    /// Archimedean spiral from the center out to `max_radius`.
    pub fn spiral(&self, center: Point, max_radius: f64, turns: u32) -> Result<Path> {
        let max_radius = positive("max_radius", max_radius)?;
        let turns = count("turns", turns)?;
        let segments = (turns as f64 * 360.0 / self.config.spiral_step_degrees)
            .round()
            .max(1.0);
        let segments = self.point_budget("spiral", segments + 1.0)? - 1;
        let total_angle = TAU * turns as f64;
        let points = (0..=segments)
            .map(|i| {
                let fraction = i as f64 / segments as f64;
                center.polar(max_radius * fraction, total_angle * fraction)
            })
            .collect::<Result<Vec<_>>>()?;
        Path::new(points)
    }

    pub fn zigzag(&self, start: Point, width: f64, height: f64, peaks: u32) -> Result<Path> {
        let width = positive("width", width)?;
        let height = positive("height", height)?;
        let peaks = count("peaks", peaks)?;
        self.point_budget("zigzag", peaks as f64 + 1.0)?;
        let points = (0..=peaks)
            .map(|i| {
                let dy = if i % 2 == 1 { height } else { 0.0 };
                start.offset(width * i as f64 / peaks as f64, dy)
            })
            .collect::<Result<Vec<_>>>()?;
        Path::new(points)
    }

    /// Sine wave from `start` to `start.x + width`, both ends included.
    pub fn wave(&self, start: Point, width: f64, amplitude: f64) -> Result<Path> {
        let width = positive("width", width)?;
        let amplitude = positive("amplitude", amplitude)?;
        let step = self.config.wave_step;
        let frequency = self.config.wave_frequency;
        let samples = (width / step).ceil().max(1.0);
        let samples = self.point_budget("wave", samples + 1.0)? - 1;
        let points = (0..=samples)
            .map(|i| {
                let dx = (i as f64 * step).min(width);
                start.offset(dx, amplitude * (frequency * dx).sin())
            })
            .collect::<Result<Vec<_>>>()?;
        Path::new(points)
    }

    /// Random walk of `steps` moves, each bounded by `scribble_max_delta` per axis.
    pub fn scribble(&self, start: Point, steps: u32, rng: &mut dyn RandomSource) -> Result<Path> {
        let steps = count("steps", steps)?;
        let len = self.point_budget("scribble", steps as f64 + 1.0)?;
        let max_delta = self.config.scribble_max_delta;
        let mut current = start;
        let mut points = Vec::with_capacity(len);
        points.push(current);
        for _ in 0..steps {
            let dx = rng.range_i32(-max_delta, max_delta);
            let dy = rng.range_i32(-max_delta, max_delta);
            current = match (current.x.checked_add(dx), current.y.checked_add(dy)) {
                (Some(x), Some(y)) => Point::new(x, y),
                _ => {
                    return Err(PathError::invalid(format!(
                        "scribble from {:?} walked outside the drawable range",
                        start
                    )))
                }
            };
            points.push(current);
        }
        Path::new(points)
    }

    pub fn line(&self, from: Point, to: Point) -> Path {
        Path::segment(from, to)
    }

    /// Click positions of a `columns` x `rows` grid centred on `center`, column by column.
    pub fn dot_grid(
        &self,
        center: Point,
        columns: u32,
        rows: u32,
        spacing: f64,
    ) -> Result<Vec<Point>> {
        let columns = count("columns", columns)?;
        let rows = count("rows", rows)?;
        let spacing = positive("spacing", spacing)?;
        let total = columns.checked_mul(rows).ok_or_else(|| {
            PathError::invalid(format!("{} x {} dot grid is too large", columns, rows))
        })?;
        let len = self.point_budget("dot grid", total as f64)?;
        let left = -((columns - 1) as f64) * spacing / 2.0;
        let top = -((rows - 1) as f64) * spacing / 2.0;

        let mut dots = Vec::with_capacity(len);
        for column in 0..columns {
            for row in 0..rows {
                let dx = left + column as f64 * spacing;
                dots.push(center.offset(dx, top + row as f64 * spacing)?);
            }
        }
        Ok(dots)
    }
}
