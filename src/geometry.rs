use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};

/// Integer screen/canvas coordinate, the unit pointer injection works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Rounds a real-valued coordinate pair (half away from zero).
    ///
    /// Fails instead of clamping when a coordinate does not fit in `i32`.
    pub fn from_f64(x: f64, y: f64) -> Result<Self> {
        Ok(Point {
            x: to_coordinate(x)?,
            y: to_coordinate(y)?,
        })
    }

    /// Point at `radius` from `self` in direction `angle` (radians, screen axes).
    pub fn polar(self, radius: f64, angle: f64) -> Result<Self> {
        Point::from_f64(
            self.x as f64 + radius * angle.cos(),
            self.y as f64 + radius * angle.sin(),
        )
    }

    pub fn offset(self, dx: f64, dy: f64) -> Result<Self> {
        Point::from_f64(self.x as f64 + dx, self.y as f64 + dy)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

fn to_coordinate(value: f64) -> Result<i32> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= i32::MIN as f64 && rounded <= i32::MAX as f64 {
        Ok(rounded as i32)
    } else {
        Err(PathError::invalid(format!(
            "coordinate {} is outside the drawable range",
            value
        )))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point { x, y }
    }
}

/// Ordered polyline for a pointer drag. Always holds at least two points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<Point>,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            return Err(PathError::invalid(format!(
                "a path needs at least 2 points, got {}",
                points.len()
            )));
        }
        Ok(Path { points })
    }

    /// Two-point path; valid for any pair of points.
    pub fn segment(from: Point, to: Point) -> Self {
        Path {
            points: vec![from, to],
        }
    }

    /// Builds a closed path by repeating the first point at the end.
    pub(crate) fn closed(mut points: Vec<Point>) -> Result<Self> {
        if let Some(&first) = points.first() {
            points.push(first);
        }
        Path::new(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    // A path is never empty; kept for the len/is_empty pairing.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn is_closed(&self) -> bool {
        self.first() == self.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
